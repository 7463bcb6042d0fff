pub mod config;

pub use config::{load_dotenv, AgentConfig, Config, EvalConfig, LlmConfig};

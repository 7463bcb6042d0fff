pub mod client;
pub mod providers;

pub use client::OpenAiClient;
pub use providers::openai::OpenAiProvider;
pub use providers::openai_images::OpenAiImageGenerator;
pub use providers::{create_image_generator, create_provider};

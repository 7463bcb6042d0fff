//! Built-in tool implementations.

pub mod generate_image;

pub use generate_image::{GenerateImageTool, ImageGenerator};

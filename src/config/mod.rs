pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig, GenerationConfig};
pub use loader::load_config;

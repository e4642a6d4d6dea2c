pub mod env;
mod loader;

pub use env::{AppConfig, ClassifierConfig, MonitorConfig};
pub use loader::load_config;

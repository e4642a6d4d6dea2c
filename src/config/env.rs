use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub monitor: MonitorConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Skip triggers for a URL whose classification is still in flight.
    pub dedup_in_flight: bool,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

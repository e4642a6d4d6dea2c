use std::{env, str::FromStr, time::Duration};

use url::Url;

use super::env::{
    AppConfig, ClassifierConfig, ConfigError, DirectoryConfig, LoggingConfig, MonitorConfig,
};

pub const DEFAULT_CLASSIFIER_URL: &str = "http://localhost:8000/predict";
const DEFAULT_CLASSIFIER_TIMEOUT_MS: u64 = 10_000;

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = parse_endpoint(
            var("CLASSIFIER_URL").unwrap_or_else(|| DEFAULT_CLASSIFIER_URL.to_string()),
        )?;
        let timeout_ms = parse_or(
            "CLASSIFIER_TIMEOUT_MS",
            var("CLASSIFIER_TIMEOUT_MS"),
            DEFAULT_CLASSIFIER_TIMEOUT_MS,
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "CLASSIFIER_TIMEOUT_MS",
                value: timeout_ms.to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        let classifier = ClassifierConfig {
            endpoint,
            timeout: Duration::from_millis(timeout_ms),
        };

        let monitor = MonitorConfig {
            dedup_in_flight: parse_flag(
                "CLASSIFIER_DEDUP_IN_FLIGHT",
                var("CLASSIFIER_DEDUP_IN_FLIGHT"),
            )?,
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            classifier,
            monitor,
            directories,
            logging,
        })
    }
}

fn parse_endpoint(raw: String) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "CLASSIFIER_URL",
        value: raw.clone(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(url)
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }),
    }
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: v.clone(),
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}

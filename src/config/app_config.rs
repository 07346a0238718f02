use serde::Deserialize;

use crate::domain::client::DEFAULT_CHUNK_SIZE;
use crate::domain::error::PulpError;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Bytes read from an upload source at a time
    pub chunk_size: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, PulpError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("PULPLIB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PulpError::configuration(e.to_string()))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| PulpError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PulpError> {
        if self.upload.chunk_size == 0 {
            return Err(PulpError::configuration("upload.chunk_size must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.upload.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = AppConfig::default();
        config.upload.chunk_size = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, PulpError::Configuration { .. }));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "logging": {"level": "debug", "format": "json"}
        }))
        .unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.upload.chunk_size, DEFAULT_CHUNK_SIZE);
    }
}

use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_API_KEY: &str = "my-secret-api-key-2025";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// 请求体缓冲上限
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl ConfigValidator for ServerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_bind_address(&self.bind_address, "server.bind_address")?;

        if self.max_body_bytes == 0 {
            return Err(crate::ConfigError::Validation(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    /// 通过 `X-API-Key` 或 `?api-key=` 传入的共享密钥
    pub api_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: DEFAULT_API_KEY.to_string(),
        }
    }
}

impl ConfigValidator for AuthConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if self.enabled {
            ValidationUtils::validate_not_empty(&self.api_key, "auth.api_key")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(crate::ConfigError::Validation(format!(
                "Invalid log format: {other}. Valid formats: [\"pretty\", \"json\"]"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ConfigValidator for ObservabilityConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.log_level, "observability.log_level")?;
        ValidationUtils::validate_one_of(
            &self.log_level,
            &["trace", "debug", "info", "warn", "error"],
            "observability.log_level",
        )?;
        Ok(())
    }
}

use std::collections::HashMap;
use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::{
    api_observability::{AuthConfig, ObservabilityConfig, ServerConfig},
    store::StoreConfig,
};
use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

/// 未指定路径时依次查找的配置文件
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config/taskboard.toml", "taskboard.toml"];

/// 环境变量前缀，例如 `TASKBOARD__AUTH__API_KEY`
const ENV_PREFIX: &str = "TASKBOARD";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 依次加载默认值、TOML 文件与 `TASKBOARD__*` 环境变量
    pub fn load(config_path: Option<&str>) -> ConfigResult<Self> {
        Self::load_with_environment(config_path, None)
    }

    /// 同 [`AppConfig::load`]，提供 `env_source` 时用它代替进程环境
    pub fn load_with_environment(
        config_path: Option<&str>,
        env_source: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(ConfigError::File(format!("配置文件不存在: {path}")));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env_source),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.auth.validate()?;
        self.store.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

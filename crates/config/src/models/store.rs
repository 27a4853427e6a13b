use serde::{Deserialize, Serialize};

use crate::validation::ConfigValidator;

/// 内存存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 启动时写入文档页展示的两个示例任务
    pub seed_sample_tasks: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_sample_tasks: true,
        }
    }
}

impl ConfigValidator for StoreConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        Ok(())
    }
}

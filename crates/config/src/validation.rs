use std::net::SocketAddr;

use crate::ConfigResult;

/// 配置验证trait
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// 通用验证工具
pub struct ValidationUtils;

impl ValidationUtils {
    /// 验证字符串非空
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// 验证监听地址为 `host:port` 且端口非零
    pub fn validate_bind_address(value: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(value, field_name)?;

        let addr: SocketAddr = value.parse().map_err(|_| {
            crate::ConfigError::Validation(format!(
                "{field_name} must be a socket address like 0.0.0.0:3000, got '{value}'"
            ))
        })?;

        if addr.port() == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} port cannot be 0"
            )));
        }
        Ok(())
    }

    /// 验证取值属于允许的选项
    pub fn validate_one_of(value: &str, allowed: &[&str], field_name: &str) -> ConfigResult<()> {
        if !allowed.contains(&value) {
            return Err(crate::ConfigError::Validation(format!(
                "Invalid {field_name}: {value}. Valid values: {allowed:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(ValidationUtils::validate_not_empty("value", "field").is_ok());
        assert!(ValidationUtils::validate_not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_bind_address() {
        assert!(ValidationUtils::validate_bind_address("0.0.0.0:3000", "addr").is_ok());
        assert!(ValidationUtils::validate_bind_address("127.0.0.1:8080", "addr").is_ok());
        assert!(ValidationUtils::validate_bind_address("localhost", "addr").is_err());
        assert!(ValidationUtils::validate_bind_address("0.0.0.0:0", "addr").is_err());
        assert!(ValidationUtils::validate_bind_address("", "addr").is_err());
    }

    #[test]
    fn test_validate_one_of() {
        let allowed = ["json", "pretty"];
        assert!(ValidationUtils::validate_one_of("json", &allowed, "format").is_ok());
        let err = ValidationUtils::validate_one_of("xml", &allowed, "format").unwrap_err();
        assert!(err.to_string().contains("xml"));
    }
}

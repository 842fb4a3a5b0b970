//! 运行配置
//!
//! 默认值来自 crate 根部的常量；trunk 构建时可以通过环境变量覆盖
//! (`XPBOARD_API_ORIGIN`, `XPBOARD_XP_CHART_MONTHS`)，值在编译期写入。

use crate::error::{DashError, DashResult};
use crate::{DEFAULT_API_ORIGIN, DEFAULT_XP_CHART_MONTHS, GRAPHQL_PATH, SIGNIN_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// API 源，如 `https://learn.reboot01.com`
    pub api_origin: String,
    pub signin_path: String,
    pub graphql_path: String,
    /// XP 曲线回看的月数，0 表示全部
    pub xp_chart_months: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_origin: DEFAULT_API_ORIGIN.to_string(),
            signin_path: SIGNIN_PATH.to_string(),
            graphql_path: GRAPHQL_PATH.to_string(),
            xp_chart_months: DEFAULT_XP_CHART_MONTHS,
        }
    }
}

impl AppConfig {
    /// 读取编译期环境变量，缺省时使用默认值
    pub fn from_build_env() -> DashResult<Self> {
        Self::from_values(
            option_env!("XPBOARD_API_ORIGIN"),
            option_env!("XPBOARD_XP_CHART_MONTHS"),
        )
    }

    pub fn from_values(origin: Option<&str>, months: Option<&str>) -> DashResult<Self> {
        let mut config = Self::default();
        if let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) {
            config.api_origin = origin.trim_end_matches('/').to_string();
        }
        if let Some(months) = months.map(str::trim).filter(|m| !m.is_empty()) {
            config.xp_chart_months = months.parse().map_err(|_| {
                DashError::config(format!("XPBOARD_XP_CHART_MONTHS is not a number: {}", months))
                    .in_op("config.load")
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DashResult<()> {
        if !(self.api_origin.starts_with("https://") || self.api_origin.starts_with("http://")) {
            return Err(DashError::config(format!(
                "api origin must be an http(s) URL: {}",
                self.api_origin
            ))
            .in_op("config.validate"));
        }
        for path in [&self.signin_path, &self.graphql_path] {
            if !path.starts_with('/') {
                return Err(DashError::config(format!("endpoint path must start with '/': {}", path))
                    .in_op("config.validate"));
            }
        }
        Ok(())
    }

    pub fn signin_url(&self) -> String {
        format!("{}{}", self.api_origin, self.signin_path)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.api_origin, self.graphql_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_platform() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.signin_url(),
            "https://learn.reboot01.com/api/auth/signin"
        );
        assert_eq!(
            config.graphql_url(),
            "https://learn.reboot01.com/api/graphql-engine/v1/graphql"
        );
        assert_eq!(config.xp_chart_months, 6);
    }

    #[test]
    fn overrides_are_trimmed() {
        let config = AppConfig::from_values(Some(" http://localhost:8080/ "), Some("0")).unwrap();
        assert_eq!(config.api_origin, "http://localhost:8080");
        assert_eq!(config.xp_chart_months, 0);
        assert_eq!(config.signin_url(), "http://localhost:8080/api/auth/signin");
    }

    #[test]
    fn blank_overrides_keep_defaults() {
        let config = AppConfig::from_values(Some(""), None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_values(Some("ftp://host"), None).is_err());
        assert!(AppConfig::from_values(None, Some("six")).is_err());
    }
}

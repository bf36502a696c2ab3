//! 应用配置
//! JSON 格式，所有字段均有默认值

use crate::services::html::HtmlRenderConfig;
use crate::services::parser::SolutionParserConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 覆盖日志级别的环境变量
pub const LOG_LEVEL_ENV: &str = "ELEMENTO_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub parser: SolutionParserConfig,
    pub html: HtmlRenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            parser: SolutionParserConfig::default(),
            html: HtmlRenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// 读取配置文件，文件不存在时返回 `Ok(None)`
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件失败: {}", config_path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// 日志级别，环境变量优先
    pub fn log_level_filter(&self) -> Result<log::LevelFilter> {
        let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| self.log_level.clone());
        level
            .parse()
            .with_context(|| format!("无效的日志级别: {}", level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("config.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"parser": {{"line_break": "<br/>"}}}}"#).unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap().unwrap();
        assert_eq!(config.parser.line_break, "<br/>");
        assert_eq!(config.parser.problem_caption, "Problem Statement");
        assert_eq!(config.html, HtmlRenderConfig::default());
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("解析配置文件失败"));
    }

    #[test]
    fn test_log_level_filter() {
        let mut config = AppConfig::default();

        std::env::remove_var(LOG_LEVEL_ENV);
        assert_eq!(config.log_level_filter().unwrap(), log::LevelFilter::Warn);

        std::env::set_var(LOG_LEVEL_ENV, "debug");
        assert_eq!(config.log_level_filter().unwrap(), log::LevelFilter::Debug);

        std::env::set_var(LOG_LEVEL_ENV, "loud");
        let err = config.log_level_filter().unwrap_err();
        assert!(err.to_string().contains("无效的日志级别: loud"));

        std::env::remove_var(LOG_LEVEL_ENV);
        config.log_level = "verbose".to_string();
        let err = config.log_level_filter().unwrap_err();
        assert!(err.to_string().contains("无效的日志级别: verbose"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = AppConfig::default();
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }
}

use serde::{de, Deserialize, Deserializer};
use std::{fmt, str::FromStr};
use tracing::Level;
use super::{server::parse_env_var, SettingsError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LogOutput {
    #[default]
    Stdout,
    File(String),
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(LogOutput::Stdout),
            _ => Ok(LogOutput::File(s.to_string())),
        }
    }
}

/// 로그 출력 설정
///
/// 파일 설정에서는 빠진 항목마다 기본값(`text`, `info`, `stdout`)을 씁니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
    #[serde(deserialize_with = "from_str_field")]
    pub level: Level,
    #[serde(deserialize_with = "from_str_field")]
    pub output: LogOutput,
}

impl LogSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            format: parse_env_var("AUTH_LOG_FORMAT", LogFormat::default)?,
            level: parse_env_var("AUTH_LOG_LEVEL", || Level::INFO)?,
            output: parse_env_var("AUTH_LOG_OUTPUT", LogOutput::default)?,
        })
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: Level::INFO,
            output: LogOutput::default(),
        }
    }
}

/// 문자열 값을 `FromStr` 로 변환하는 serde 필드 어댑터
fn from_str_field<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_log_settings() {
        let settings: LogSettings = toml::from_str("level = \"DEBUG\"").unwrap();
        assert_eq!(settings.level, Level::DEBUG);
        assert_eq!(settings.format, LogFormat::Text);
        assert_eq!(settings.output, LogOutput::Stdout);

        let settings: LogSettings = serde_json::from_str(r#"{"format": "json", "output": "/tmp/auth.log"}"#).unwrap();
        assert_eq!(settings.level, Level::INFO);
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.output, LogOutput::File("/tmp/auth.log".to_string()));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(toml::from_str::<LogSettings>("level = \"loud\"").is_err());
    }
}

use std::{env, fs, path::Path};
use serde::Deserialize;
use tracing::{debug, info};
use crate::web::filter::auth::{parse_users, AuthSource, BasicAuthConfig};

mod server;
pub mod logging;
mod error;

pub use server::ServerSettings;
pub use logging::LogSettings;
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// Basic 인증 설정
    #[serde(default)]
    pub auth: BasicAuthConfig,
}

impl Settings {
    /// `AUTH_CONFIG_FILE` 이 있으면 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    pub fn load() -> Result<Self> {
        match env::var("AUTH_CONFIG_FILE") {
            Ok(config_path) => {
                info!(path = %config_path, "설정 파일 로드");
                Self::from_file(&config_path)
            }
            Err(_) => Self::from_env(),
        }
    }

    /// 확장자(`.toml`, `.json`)에 따라 설정 파일을 읽습니다.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(SettingsError::UnsupportedFormat {
                path: path.to_string_lossy().to_string(),
            }),
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read_file(path.as_ref())?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = read_file(path.as_ref())?;
        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| SettingsError::JsonError { source: e })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            auth: auth_from_env(),
        };

        // 환경 변수로 읽은 경우 빠진 변수 이름을 알려준다
        match &settings.auth.source {
            AuthSource::Users if settings.auth.users.is_empty() => {
                return Err(SettingsError::EnvVarMissing {
                    var_name: "AUTH_USERS".to_string(),
                });
            }
            AuthSource::Env(prefix) if prefix.is_empty() => {
                return Err(SettingsError::EnvVarMissing {
                    var_name: "AUTH_ENV_PREFIX".to_string(),
                });
            }
            _ => {}
        }

        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;

        match &self.auth.source {
            AuthSource::Users if self.auth.users.is_empty() => {
                return Err(SettingsError::InvalidConfig(
                    "등록된 사용자가 없습니다".to_string()
                ));
            }
            AuthSource::Htpasswd(path) if !Path::new(path).is_file() => {
                return Err(SettingsError::InvalidConfig(
                    format!("htpasswd 파일을 찾을 수 없습니다: {}", path)
                ));
            }
            AuthSource::Env(prefix) if prefix.is_empty() => {
                return Err(SettingsError::InvalidConfig(
                    "환경 변수 접두사가 비어 있습니다".to_string()
                ));
            }
            _ => {}
        }

        debug!(realm = %self.auth.realm, source = ?self.auth.source, "설정 검증 완료");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SettingsError::FileError {
        path: path.to_string_lossy().to_string(),
        error: e,
    })
}

/// 환경 변수에서 인증 설정을 읽습니다.
///
/// `AUTH_HTPASSWD_FILE` 이 `AUTH_ENV_PREFIX` 보다, 둘 다 `AUTH_USERS` 보다 우선합니다.
fn auth_from_env() -> BasicAuthConfig {
    let mut config = BasicAuthConfig::default();

    if let Ok(realm) = env::var("AUTH_REALM") {
        config.realm = realm;
    }
    if let Ok(users) = env::var("AUTH_USERS") {
        config.users = parse_users(&users);
    }

    if let Ok(path) = env::var("AUTH_HTPASSWD_FILE") {
        config.source = AuthSource::Htpasswd(path);
    } else if let Ok(prefix) = env::var("AUTH_ENV_PREFIX") {
        config.source = AuthSource::Env(prefix);
    }

    config
}

use std::{collections::HashMap, env};
use serde::{Deserialize, Serialize};
use crate::web::WebError;
use super::{HtpasswdFile, SecretProvider, DEFAULT_REALM};

/// Basic 인증 비밀값 소스
///
/// # TOML 예시
///
/// ## 인라인 사용자
/// ```toml
/// [auth]
/// realm = "Restricted Area"
/// users = { admin = "$2y$05$...", guest = "{SHA}qvTGHdzF6KLavt4PO0gs2a6pQ00=" }
/// ```
///
/// ## Htpasswd 파일
/// ```toml
/// [auth]
/// source = { htpasswd = "/etc/nginx/.htpasswd" }
/// ```
///
/// ## 환경 변수
/// ```toml
/// [auth]
/// source = { env = "BASIC_AUTH_USER_" }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    /// 설정에 직접 적은 사용자 목록
    #[default]
    Users,
    /// .htpasswd 파일
    Htpasswd(String),
    /// `<prefix><username>` 환경 변수
    Env(String),
}

/// Basic 인증 설정
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicAuthConfig {
    /// 인증 영역 (realm)
    #[serde(default = "default_realm")]
    pub realm: String,

    /// 사용자 이름과 비밀값 맵
    #[serde(default)]
    pub users: HashMap<String, String>,

    /// 비밀값 소스
    #[serde(default)]
    pub source: AuthSource,
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

impl Default for BasicAuthConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            users: HashMap::new(),
            source: AuthSource::default(),
        }
    }
}

impl BasicAuthConfig {
    /// 설정된 소스로부터 비밀값 제공자를 만듭니다.
    ///
    /// htpasswd 파일은 이 시점에 한 번 읽습니다.
    pub fn secret_provider(&self) -> Result<SecretProvider, WebError> {
        match &self.source {
            AuthSource::Users => {
                if self.users.is_empty() {
                    return Err(WebError::Config("등록된 사용자가 없습니다".to_string()));
                }
                Ok(SecretProvider::from_users(self.users.clone()))
            }
            AuthSource::Htpasswd(path) => Ok(HtpasswdFile::load(path)?.into_provider()),
            AuthSource::Env(prefix) => {
                if prefix.is_empty() {
                    return Err(WebError::Config("환경 변수 접두사가 비어 있습니다".to_string()));
                }
                let prefix = prefix.clone();
                Ok(SecretProvider::new(move |user| {
                    // 빈 이름이면 접두사 자체를 조회하게 된다
                    if user.is_empty() {
                        return None;
                    }
                    env::var(format!("{}{}", prefix, user)).ok()
                }))
            }
        }
    }
}

/// `user:secret,user2:secret2` 형식의 사용자 목록을 파싱합니다.
pub fn parse_users(value: &str) -> HashMap<String, String> {
    let mut users = HashMap::new();
    for user_entry in value.split(',') {
        if let Some((username, secret)) = user_entry.split_once(':') {
            let username = username.trim();
            if !username.is_empty() {
                users.insert(username.to_string(), secret.trim().to_string());
            }
        }
    }
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_users() {
        let users = parse_users("admin:$apr1$H6uskkkW$IgXLP6ewTrSuBkTrqE8wj/, guest:{SHA}abc= ,broken");

        assert_eq!(users.len(), 2);
        assert_eq!(
            users.get("admin").unwrap(),
            "$apr1$H6uskkkW$IgXLP6ewTrSuBkTrqE8wj/"
        );
        assert_eq!(users.get("guest").unwrap(), "{SHA}abc=");
    }

    #[test]
    fn test_config_from_toml() {
        let config: BasicAuthConfig = toml::from_str(r#"
            realm = "My Realm"
            users = { test = "secret" }
        "#).unwrap();

        assert_eq!(config.realm, "My Realm");
        assert_eq!(config.source, AuthSource::Users);

        let provider = config.secret_provider().unwrap();
        assert_eq!(provider.secret("test").as_deref(), Some("secret"));
        assert_eq!(provider.secret("other"), None);
    }

    #[test]
    fn test_config_htpasswd_source() {
        let config: BasicAuthConfig = toml::from_str(r#"
            source = { htpasswd = "/etc/nginx/.htpasswd" }
        "#).unwrap();

        assert_eq!(config.realm, DEFAULT_REALM);
        assert_eq!(
            config.source,
            AuthSource::Htpasswd("/etc/nginx/.htpasswd".to_string())
        );
    }

    #[test]
    fn test_empty_users_is_config_error() {
        let config = BasicAuthConfig::default();
        assert!(matches!(config.secret_provider(), Err(WebError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_env_source() {
        std::env::set_var("CONFIG_TEST_AUTH_USER_alice", "wonderland");
        std::env::set_var("CONFIG_TEST_AUTH_USER_", "bare-prefix");
        let config = BasicAuthConfig {
            source: AuthSource::Env("CONFIG_TEST_AUTH_USER_".to_string()),
            ..Default::default()
        };

        let provider = config.secret_provider().unwrap();
        assert_eq!(provider.secret("alice").as_deref(), Some("wonderland"));
        assert_eq!(provider.secret("bob"), None);
        assert_eq!(provider.secret(""), None);
        std::env::remove_var("CONFIG_TEST_AUTH_USER_alice");
        std::env::remove_var("CONFIG_TEST_AUTH_USER_");
    }
}

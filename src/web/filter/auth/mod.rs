//! HTTP Basic 인증 필터
//!
//! # 간단한 사용법
//!
//! ```
//! use basic_auth_filter::web::{App, FilterPosition, filter::auth};
//!
//! let mut app = App::new();
//! // 모든 요청을 인증
//! app.insert_filter("*", FilterPosition::BeforeRouter, auth::basic("username", "secretpassword"))
//!     .unwrap();
//! ```
//!
//! # 사용자별 비밀값 조회
//!
//! ```
//! use basic_auth_filter::web::{App, FilterPosition, filter::auth::{self, SecretProvider}};
//!
//! let secrets = SecretProvider::new(|user: &str| {
//!     (user == "alice").then(|| "{SHA}qvTGHdzF6KLavt4PO0gs2a6pQ00=".to_string())
//! });
//! let mut app = App::new();
//! app.insert_filter(
//!     "/admin/*",
//!     FilterPosition::BeforeRouter,
//!     auth::new_basic_authenticator(secrets, "Authorization Required"),
//! )
//! .unwrap();
//! ```

mod config;
mod htpasswd;
pub mod secret;

use std::{collections::HashMap, fmt, sync::Arc};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hyper::{header::{self, HeaderValue}, StatusCode};
use tracing::{debug, warn};
use super::FilterFunc;
use crate::web::{Context, RequestView, ResponseWriter};

pub use config::{AuthSource, BasicAuthConfig, parse_users};
pub use htpasswd::HtpasswdFile;
pub use secret::check_secret;

pub const DEFAULT_REALM: &str = "Authorization Required";

/// 인증에 성공한 사용자 이름이 저장되는 컨텍스트 데이터 키
pub const AUTH_USER_KEY: &str = "auth.user";

/// 사용자 이름으로 기대하는 비밀값을 찾는 함수
///
/// 비밀값은 평문, `{SHA}`, `$apr1$`/`$1$`, bcrypt 형식을 지원합니다.
/// 사용자를 찾지 못하면 `None` 을 반환합니다.
#[derive(Clone)]
pub struct SecretProvider(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>);

impl SecretProvider {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// 고정된 사용자/비밀값 맵에서 조회하는 제공자
    pub fn from_users(users: HashMap<String, String>) -> Self {
        Self::new(move |user| users.get(user).cloned())
    }

    pub fn secret(&self, user: &str) -> Option<String> {
        (self.0)(user)
    }
}

impl fmt::Debug for SecretProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretProvider")
    }
}

/// 비밀값 제공자와 realm 을 가진 Basic 인증기
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub secrets: SecretProvider,
    pub realm: String,
}

impl BasicAuth {
    pub fn new(secrets: SecretProvider, realm: impl Into<String>) -> Self {
        Self {
            secrets,
            realm: realm.into(),
        }
    }

    /// 요청의 사용자 이름/비밀번호 조합을 검사합니다.
    ///
    /// 인증된 사용자 이름을 반환하고, 자격증명이 없거나 형식이 잘못되었거나
    /// 비밀값과 일치하지 않으면 `None` 을 반환합니다.
    pub fn check_auth<R: RequestView + ?Sized>(&self, request: &R) -> Option<String> {
        let (username, password) = match extract_credentials(request) {
            Some(credentials) => credentials,
            None => {
                debug!(realm = %self.realm, path = %request.path(), "Authorization 헤더 누락 또는 형식 오류");
                return None;
            }
        };

        let secret = match self.secrets.secret(&username) {
            Some(secret) => secret,
            None => {
                debug!(realm = %self.realm, user = %username, "알 수 없는 사용자");
                return None;
            }
        };

        if check_secret(&password, &secret) {
            Some(username)
        } else {
            debug!(realm = %self.realm, user = %username, "비밀번호 불일치");
            None
        }
    }

    /// 인증(또는 재인증)을 요구하는 401 응답을 씁니다.
    pub fn require_auth<R: RequestView + ?Sized>(&self, w: &mut ResponseWriter, request: &R) {
        match HeaderValue::from_str(&format!("Basic realm=\"{}\"", self.realm)) {
            Ok(value) => {
                w.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
            Err(e) => {
                warn!(realm = %self.realm, error = %e, "realm 을 헤더 값으로 쓸 수 없음");
            }
        }
        debug!(method = %request.method(), path = %request.path(), "인증 요구");
        w.write_header(StatusCode::UNAUTHORIZED);
        w.write(b"401 Unauthorized\n");
    }
}

/// Authorization 헤더에서 자격증명을 추출합니다.
fn extract_credentials<R: RequestView + ?Sized>(request: &R) -> Option<(String, String)> {
    let value = request.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, credentials) = value.split_once(' ')?;
    if scheme != "Basic" {
        return None;
    }
    let decoded = BASE64.decode(credentials).ok()?;
    let pair = String::from_utf8(decoded).ok()?;
    let (username, password) = pair.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// 고정된 사용자 이름/비밀번호 한 쌍으로 인증하는 필터
pub fn basic(username: &str, password: &str) -> FilterFunc {
    let username = username.to_string();
    let password = password.to_string();
    let secrets = SecretProvider::new(move |user| {
        (user == username).then(|| password.clone())
    });
    new_basic_authenticator(secrets, DEFAULT_REALM)
}

/// 비밀값 제공자와 realm 으로 인증 필터를 만듭니다.
///
/// 인증에 실패하면 401 챌린지를 쓰고, 성공하면 사용자 이름을
/// [`AUTH_USER_KEY`] 로 컨텍스트에 남깁니다.
pub fn new_basic_authenticator(secrets: SecretProvider, realm: impl Into<String>) -> FilterFunc {
    let auth = BasicAuth::new(secrets, realm);
    Arc::new(move |ctx: &mut Context| match auth.check_auth(&*ctx) {
        Some(user) => ctx.set_data(AUTH_USER_KEY, user),
        None => auth.require_auth(&mut ctx.response, &ctx.request),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn request_with_auth(value: &str) -> hyper::Request<Bytes> {
        hyper::Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, value)
            .body(Bytes::new())
            .unwrap()
    }

    fn encode(user: &str, pass: &str) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:{}", user, pass)))
    }

    #[test]
    fn test_extract_credentials() {
        let req = request_with_auth(&encode("user", "pa:ss"));
        assert_eq!(
            extract_credentials(&req),
            Some(("user".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn test_extract_rejects_malformed_headers() {
        let cases = vec![
            "Bearer dXNlcjpwYXNz".to_string(),
            "basic dXNlcjpwYXNz".to_string(),
            "Basic".to_string(),
            "Basic !!notbase64!!".to_string(),
            format!("Basic {}", BASE64.encode("no-separator")),
        ];

        for value in cases {
            let req = request_with_auth(&value);
            assert_eq!(extract_credentials(&req), None, "헤더 '{}'", value);
        }
    }

    #[test]
    fn test_realm_with_invalid_characters_still_rejects() {
        let auth = BasicAuth::new(SecretProvider::new(|_| None), "bad\nrealm");
        let req = request_with_auth("Basic");
        let mut w = ResponseWriter::new();

        auth.require_auth(&mut w, &req);
        assert_eq!(w.status(), StatusCode::UNAUTHORIZED);
        assert!(!w.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}

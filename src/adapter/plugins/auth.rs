//! 이전 프레임워크 타입으로 노출한 HTTP Basic 인증 필터
//!
//! 실제 인증 동작은 모두 [`crate::web::filter::auth`] 에 위임합니다.
//!
//! # 간단한 사용법
//!
//! ```
//! use basic_auth_filter::adapter::{App, FilterPosition, plugins::auth};
//!
//! let mut app = App::new();
//! // 모든 요청을 인증
//! app.insert_filter("*", FilterPosition::BeforeRouter, auth::basic("username", "secretpassword"))
//!     .unwrap();
//! ```
//!
//! # 고급 사용법
//!
//! ```
//! use basic_auth_filter::adapter::{App, FilterPosition, plugins::auth::{self, SecretProvider}};
//!
//! let secrets = SecretProvider::new(|user: &str| (user == "alice").then(|| "wonderland".to_string()));
//! let mut app = App::new();
//! app.insert_filter(
//!     "*",
//!     FilterPosition::BeforeRouter,
//!     auth::new_basic_authenticator(secrets, "Authorization Required"),
//! )
//! .unwrap();
//! ```

use std::{fmt, sync::Arc};
use crate::adapter::{Context, FilterFunc};
use crate::web::{filter::auth, RequestView, ResponseWriter};

pub use crate::web::filter::auth::{AUTH_USER_KEY, DEFAULT_REALM};

/// 사용자 이름으로 기대하는 비밀값을 찾는 함수
///
/// 웹 계층의 [`auth::SecretProvider`] 와 같은 모양이며, 이 모듈만 쓰는 쪽이
/// 웹 계층을 직접 가져오지 않아도 되도록 따로 정의합니다.
#[derive(Clone)]
pub struct SecretProvider(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>);

impl SecretProvider {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
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

impl From<SecretProvider> for auth::SecretProvider {
    fn from(secrets: SecretProvider) -> Self {
        let f = secrets.0;
        auth::SecretProvider::new(move |user| f(user))
    }
}

impl From<auth::SecretProvider> for SecretProvider {
    fn from(secrets: auth::SecretProvider) -> Self {
        SecretProvider::new(move |user| secrets.secret(user))
    }
}

/// 고정된 사용자 이름/비밀번호 한 쌍으로 인증하는 필터
pub fn basic(username: &str, password: &str) -> FilterFunc {
    let f = auth::basic(username, password);
    Arc::new(move |ctx: &mut Context| ctx.with_web_context(|web_ctx| f(web_ctx)))
}

/// 비밀값 제공자와 realm 으로 인증 필터를 만듭니다.
pub fn new_basic_authenticator(secrets: SecretProvider, realm: &str) -> FilterFunc {
    let f = auth::new_basic_authenticator(secrets.into(), realm);
    Arc::new(move |ctx: &mut Context| ctx.with_web_context(|web_ctx| f(web_ctx)))
}

/// 비밀값 제공자와 realm 을 가진 Basic 인증기
///
/// 웹 계층의 [`auth::BasicAuth`] 를 감쌀 뿐 상태를 더하지 않습니다.
#[derive(Debug, Clone)]
pub struct BasicAuth(auth::BasicAuth);

impl BasicAuth {
    pub fn new(secrets: SecretProvider, realm: &str) -> Self {
        Self(auth::BasicAuth::new(secrets.into(), realm))
    }

    pub fn realm(&self) -> &str {
        &self.0.realm
    }

    /// 요청의 사용자 이름/비밀번호 조합을 검사합니다.
    ///
    /// 인증된 사용자 이름을, 실패하면 빈 문자열을 반환합니다.
    /// MD5, SHA1 비밀값을 지원합니다.
    pub fn check_auth<R: RequestView + ?Sized>(&self, request: &R) -> String {
        self.0.check_auth(request).unwrap_or_default()
    }

    /// 인증(또는 재인증)을 요구하는 응답을 씁니다.
    pub fn require_auth<R: RequestView + ?Sized>(&self, w: &mut ResponseWriter, request: &R) {
        self.0.require_auth(w, request)
    }
}

impl From<auth::BasicAuth> for BasicAuth {
    fn from(inner: auth::BasicAuth) -> Self {
        Self(inner)
    }
}

impl From<BasicAuth> for auth::BasicAuth {
    fn from(outer: BasicAuth) -> Self {
        outer.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_provider_conversion() {
        let secrets = SecretProvider::new(|user: &str| (user == "alice").then(|| "pw".to_string()));

        let inner: auth::SecretProvider = secrets.clone().into();
        assert_eq!(inner.secret("alice").as_deref(), Some("pw"));
        assert_eq!(inner.secret("bob"), None);

        let outer: SecretProvider = inner.into();
        assert_eq!(outer.secret("alice").as_deref(), Some("pw"));
    }

    #[test]
    fn test_basic_auth_conversion_keeps_realm() {
        let outer = BasicAuth::new(SecretProvider::new(|_| None), "Legacy Realm");
        let inner: auth::BasicAuth = outer.into();
        assert_eq!(inner.realm, "Legacy Realm");

        let outer = BasicAuth::from(inner);
        assert_eq!(outer.realm(), "Legacy Realm");
    }
}

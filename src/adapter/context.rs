use std::{collections::HashMap, mem};
use hyper::{header::HeaderMap, Method, Uri};
use crate::web::{self, Request, RequestView, ResponseWriter};

/// 요청과 요청 범위 데이터
#[derive(Debug, Default)]
pub struct Input {
    pub request: Request,
    data: HashMap<String, String>,
}

impl Input {
    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

/// 이전 프레임워크의 요청 컨텍스트
///
/// 웹 계층의 [`web::Context`] 와 필드 구성이 다르므로 두 타입 사이는
/// `From` 변환으로만 오갑니다. 변환은 필드를 옮길 뿐 복사하지 않습니다.
#[derive(Debug, Default)]
pub struct Context {
    pub input: Input,
    pub output: ResponseWriter,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            input: Input {
                request,
                data: HashMap::new(),
            },
            output: ResponseWriter::new(),
        }
    }

    /// 웹 계층 컨텍스트로 잠시 변환해 `f` 를 실행하고 결과를 다시 옮겨 옵니다.
    pub fn with_web_context<T>(&mut self, f: impl FnOnce(&mut web::Context) -> T) -> T {
        let mut ctx = web::Context::from(mem::take(self));
        let result = f(&mut ctx);
        *self = Context::from(ctx);
        result
    }
}

impl From<web::Context> for Context {
    fn from(ctx: web::Context) -> Self {
        let (request, response, data) = ctx.into_parts();
        Self {
            input: Input { request, data },
            output: response,
        }
    }
}

impl From<Context> for web::Context {
    fn from(ctx: Context) -> Self {
        web::Context::from_parts(ctx.input.request, ctx.output, ctx.input.data)
    }
}

impl RequestView for Context {
    fn method(&self) -> &Method {
        self.input.request.method()
    }

    fn uri(&self) -> &Uri {
        self.input.request.uri()
    }

    fn headers(&self) -> &HeaderMap {
        self.input.request.headers()
    }
}

/// 웹 계층 컨텍스트를 이 모듈의 컨텍스트로 잠시 변환해 `f` 를 실행합니다.
pub(crate) fn with_adapter_context<T>(ctx: &mut web::Context, f: impl FnOnce(&mut Context) -> T) -> T {
    let mut adapted = Context::from(mem::take(ctx));
    let result = f(&mut adapted);
    *ctx = web::Context::from(adapted);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use hyper::{header, StatusCode};

    fn sample_request() -> Request {
        hyper::Request::builder()
            .method(Method::POST)
            .uri("/admin/users?page=2")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .header("x-request-id", "abc")
            .body(Bytes::from_static(b"payload"))
            .unwrap()
    }

    #[test]
    fn test_round_trip_keeps_everything() {
        let mut web_ctx = web::Context::new(sample_request());
        web_ctx.set_data("k", "v");
        web_ctx.response.write_header(StatusCode::ACCEPTED);

        let ctx = Context::from(web_ctx);
        assert_eq!(RequestView::method(&ctx), Method::POST);
        assert_eq!(ctx.input.data("k"), Some("v"));
        assert_eq!(ctx.output.status(), StatusCode::ACCEPTED);

        let back = web::Context::from(ctx);
        assert_eq!(back.request.uri(), "/admin/users?page=2");
        assert_eq!(back.request.body(), &Bytes::from_static(b"payload"));
        assert_eq!(back.data("k"), Some("v"));
        assert!(back.response.started());
    }

    #[test]
    fn test_with_web_context_writes_through() {
        let mut ctx = Context::new(sample_request());

        let path = ctx.with_web_context(|web_ctx| {
            web_ctx.set_data("seen", "yes");
            web_ctx.response.write_header(StatusCode::UNAUTHORIZED);
            web_ctx.request.uri().path().to_string()
        });

        assert_eq!(path, "/admin/users");
        assert_eq!(ctx.input.data("seen"), Some("yes"));
        assert_eq!(ctx.output.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ctx.input.request.headers()["x-request-id"], "abc");
    }
}

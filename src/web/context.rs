use std::collections::HashMap;
use bytes::Bytes;
use hyper::{header::HeaderMap, Method, Uri};
use super::ResponseWriter;

/// 본문을 모두 읽어 들인 요청
pub type Request = hyper::Request<Bytes>;

/// 필터가 요청에서 읽는 필드에 대한 읽기 전용 뷰
///
/// 서로 다른 컨텍스트 타입이 같은 요청을 노출할 수 있도록
/// 인증 코드는 구체 타입 대신 이 트레이트에 의존합니다.
pub trait RequestView {
    fn method(&self) -> &Method;
    fn uri(&self) -> &Uri;
    fn headers(&self) -> &HeaderMap;

    fn path(&self) -> &str {
        self.uri().path()
    }
}

impl<B> RequestView for hyper::Request<B> {
    fn method(&self) -> &Method {
        hyper::Request::method(self)
    }

    fn uri(&self) -> &Uri {
        hyper::Request::uri(self)
    }

    fn headers(&self) -> &HeaderMap {
        hyper::Request::headers(self)
    }
}

/// 요청 처리 한 번 동안 필터 체인과 핸들러가 공유하는 컨텍스트
#[derive(Debug, Default)]
pub struct Context {
    pub request: Request,
    pub response: ResponseWriter,
    data: HashMap<String, String>,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: ResponseWriter::new(),
            data: HashMap::new(),
        }
    }

    /// 이미 채워진 구성 요소로 컨텍스트를 조립합니다.
    pub fn from_parts(
        request: Request,
        response: ResponseWriter,
        data: HashMap<String, String>,
    ) -> Self {
        Self { request, response, data }
    }

    pub fn into_parts(self) -> (Request, ResponseWriter, HashMap<String, String>) {
        (self.request, self.response, self.data)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }
}

impl RequestView for Context {
    fn method(&self) -> &Method {
        self.request.method()
    }

    fn uri(&self) -> &Uri {
        self.request.uri()
    }

    fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }
}

use std::sync::Arc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Response};
use crate::web::{self, FilterOptions, FilterPosition, Request, WebError};
use super::context::{with_adapter_context, Context};

/// 이전 프레임워크의 필터 함수
pub type FilterFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// 웹 계층 [`web::App`] 을 이전 프레임워크의 타입으로 감싼 애플리케이션
#[derive(Default)]
pub struct App {
    inner: web::App,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필터를 등록합니다.
    ///
    /// ```
    /// use basic_auth_filter::adapter::{App, FilterPosition, plugins::auth};
    ///
    /// let mut app = App::new();
    /// app.insert_filter("*", FilterPosition::BeforeRouter, auth::basic("username", "secretpassword"))
    ///     .unwrap();
    /// ```
    pub fn insert_filter(
        &mut self,
        pattern: &str,
        position: FilterPosition,
        filter: FilterFunc,
    ) -> Result<(), WebError> {
        self.inner.insert_filter(pattern, position, into_web_filter(filter))
    }

    pub fn insert_filter_with_options(
        &mut self,
        pattern: &str,
        position: FilterPosition,
        filter: FilterFunc,
        options: FilterOptions,
    ) -> Result<(), WebError> {
        self.inner.insert_filter_with_options(pattern, position, into_web_filter(filter), options)
    }

    pub fn route<H>(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), WebError>
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.inner.route(method, pattern, move |ctx: &mut web::Context| {
            with_adapter_context(ctx, |ctx| handler(ctx))
        })
    }

    pub fn get<H>(&mut self, pattern: &str, handler: H) -> Result<(), WebError>
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    pub fn handle(&self, request: Request) -> Response<Full<Bytes>> {
        self.inner.handle(request)
    }

    pub fn into_inner(self) -> web::App {
        self.inner
    }
}

fn into_web_filter(filter: FilterFunc) -> web::FilterFunc {
    Arc::new(move |ctx: &mut web::Context| with_adapter_context(ctx, |ctx| filter(ctx)))
}

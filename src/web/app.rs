use std::sync::Arc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Response, StatusCode};
use tracing::{debug, trace};
use super::{
    Context, FilterFunc, FilterOptions, FilterPosition, FilterRouter, PathPattern, Request, WebError,
};

/// 라우트 핸들러
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: HandlerFunc,
}

/// 필터 체인과 라우트 테이블을 가진 웹 애플리케이션
///
/// 구성이 끝난 뒤에는 `Arc<App>` 으로 공유되며 요청 처리 중에는
/// 내부 상태를 변경하지 않습니다.
#[derive(Default)]
pub struct App {
    filters: [Vec<FilterRouter>; FilterPosition::COUNT],
    routes: Vec<Route>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기본 옵션(`return_on_output = true`)으로 필터를 등록합니다.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use basic_auth_filter::web::{App, FilterPosition, filter::auth};
    ///
    /// let mut app = App::new();
    /// app.insert_filter("*", FilterPosition::BeforeRouter, auth::basic("admin", "secret"))
    ///     .unwrap();
    /// ```
    pub fn insert_filter(
        &mut self,
        pattern: &str,
        position: FilterPosition,
        filter: FilterFunc,
    ) -> Result<(), WebError> {
        self.insert_filter_with_options(pattern, position, filter, FilterOptions::default())
    }

    pub fn insert_filter_with_options(
        &mut self,
        pattern: &str,
        position: FilterPosition,
        filter: FilterFunc,
        options: FilterOptions,
    ) -> Result<(), WebError> {
        let router = FilterRouter::new(pattern, filter, options)?;
        debug!(pattern = %pattern, position = ?position, "필터 등록");
        self.filters[position.index()].push(router);
        Ok(())
    }

    pub fn route<H>(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), WebError>
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern)?,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    pub fn get<H>(&mut self, pattern: &str, handler: H) -> Result<(), WebError>
    where
        H: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    /// 요청 하나를 필터 체인과 라우트에 통과시켜 응답을 만듭니다.
    pub fn handle(&self, request: Request) -> Response<Full<Bytes>> {
        self.dispatch(request).response.into_response()
    }

    /// `handle` 과 같지만 처리가 끝난 컨텍스트를 그대로 돌려줍니다.
    pub fn dispatch(&self, request: Request) -> Context {
        let mut ctx = Context::new(request);
        self.serve(&mut ctx);
        ctx
    }

    fn serve(&self, ctx: &mut Context) {
        let path = ctx.request.uri().path().to_string();

        if self.exec_filters(FilterPosition::BeforeStatic, &path, ctx)
            || self.exec_filters(FilterPosition::BeforeRouter, &path, ctx)
        {
            return;
        }

        let handler = self.routes.iter()
            .find(|route| route.method == ctx.request.method() && route.pattern.matches(&path))
            .map(|route| route.handler.clone());

        match handler {
            Some(handler) => {
                if self.exec_filters(FilterPosition::BeforeExec, &path, ctx) {
                    return;
                }
                handler(ctx);
                if self.exec_filters(FilterPosition::AfterExec, &path, ctx) {
                    return;
                }
            }
            None => {
                debug!(path = %path, method = %ctx.request.method(), "라우트 없음");
                ctx.response.write_header(StatusCode::NOT_FOUND);
                ctx.response.write(b"404 Not Found\n");
            }
        }

        self.exec_filters(FilterPosition::FinishRouter, &path, ctx);
    }

    /// 해당 위치의 필터를 실행합니다. 처리를 중단해야 하면 `true` 를 반환합니다.
    fn exec_filters(&self, position: FilterPosition, path: &str, ctx: &mut Context) -> bool {
        for router in &self.filters[position.index()] {
            if router.return_on_output() && ctx.response.started() {
                return true;
            }
            if !router.valid_router(path) {
                continue;
            }
            trace!(position = ?position, pattern = %router.pattern().pattern, "필터 실행");
            router.call(ctx);
            if router.return_on_output() && ctx.response.started() {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(path: &str) -> Request {
        hyper::Request::builder()
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_unknown_route_is_404() {
        let app = App::new();
        let response = app.handle(request("/missing"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_filter_only_runs_for_matching_pattern() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut app = App::new();
        app.insert_filter(
            "/admin/*",
            FilterPosition::BeforeRouter,
            Arc::new(move |_ctx: &mut Context| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        app.get("*", |ctx: &mut Context| ctx.response.write(b"ok")).unwrap();

        app.handle(request("/public"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        app.handle(request("/admin/users"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

use std::{convert::Infallible, sync::Arc};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::{io::{AsyncRead, AsyncWrite}, net::TcpListener};
use tracing::{error, info};
use crate::logging::{log_request, RequestLog};
use crate::web::{filter::auth::AUTH_USER_KEY, App};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("리스너 바인딩 실패: {0}")]
    Bind(#[source] std::io::Error),

    #[error("연결 수락 실패: {0}")]
    Accept(#[source] std::io::Error),

    #[error("HTTP 연결 처리 실패: {0}")]
    Connection(#[source] hyper::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// 주소에 바인딩한 뒤 [`serve`] 를 실행합니다.
pub async fn bind_and_serve(addr: std::net::SocketAddr, app: Arc<App>) -> Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "HTTP 포트 바인딩 실패");
        ServerError::Bind(e)
    })?;
    serve(listener, app).await
}

/// 연결을 수락하며 요청마다 `app` 을 실행합니다. 반환하지 않습니다.
pub async fn serve(listener: TcpListener, app: Arc<App>) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "HTTP 리스너 시작");
    }

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let app = app.clone();
                tokio::spawn(async move {
                    if let Err(err) = serve_connection(stream, app).await {
                        error!(error = %err, peer = %peer, "HTTP 연결 처리 실패");
                    }
                });
            }
            // 수락 실패는 해당 연결만의 문제로 보고 계속 진행
            Err(e) => {
                error!(error = %ServerError::Accept(e), "HTTP 연결 수락 실패");
            }
        }
    }
}

/// 하나의 연결에서 HTTP/1 요청을 처리합니다.
pub async fn serve_connection<I>(io: I, app: Arc<App>) -> Result<()>
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = service_fn(move |req| handle_request(app.clone(), req));
    http1::Builder::new()
        .serve_connection(TokioIo::new(io), service)
        .await
        .map_err(ServerError::Connection)
}

async fn handle_request(
    app: Arc<App>,
    req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let mut log = RequestLog::new();
    log.with_request(&req);

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(request_id = %log.request_id, error = %e, "요청 본문 읽기 실패");
            let response = Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Full::new(Bytes::from("Bad Request")))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())));
            log.with_response(&response);
            log_request(&log);
            return Ok(response);
        }
    };

    let ctx = app.dispatch(Request::from_parts(parts, body));
    if let Some(user) = ctx.data(AUTH_USER_KEY) {
        log.with_user(user);
    }

    let response = ctx.response.into_response();
    log.with_response(&response);
    log_request(&log);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_malformed_request_is_connection_error() {
        let (mut client, server) = tokio::io::duplex(4096);
        client.write_all(b"NOT AN HTTP REQUEST\r\n\r\n").await.unwrap();

        let result = serve_connection(server, Arc::new(App::new())).await;
        assert!(matches!(result, Err(ServerError::Connection(_))));
    }

    #[tokio::test]
    async fn test_serve_connection_runs_app() {
        let (mut client, server) = tokio::io::duplex(4096);
        let mut app = App::new();
        app.get("/", |ctx: &mut crate::web::Context| ctx.response.write(b"ok")).unwrap();

        let task = tokio::spawn(serve_connection(server, Arc::new(app)));
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        let reply = String::from_utf8_lossy(&reply);
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
        assert!(reply.ends_with("ok"));
        assert!(task.await.unwrap().is_ok());
    }
}

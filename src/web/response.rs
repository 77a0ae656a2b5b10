use bytes::{Bytes, BytesMut};
use http_body_util::Full;
use hyper::{header::HeaderMap, Response, StatusCode};

/// 필터와 핸들러가 공유하는 응답 버퍼
///
/// 상태 코드는 처음 `write_header` 또는 `write` 가 호출될 때 고정됩니다.
/// 이후의 `write_header` 호출은 무시됩니다.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    started: bool,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn write_header(&mut self, status: StatusCode) {
        if self.started {
            return;
        }
        self.status = status;
        self.started = true;
    }

    pub fn write(&mut self, data: &[u8]) {
        if !self.started {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// 응답 출력이 시작되었는지 여부
    pub fn started(&self) -> bool {
        self.started
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_status_wins() {
        let mut writer = ResponseWriter::new();
        assert!(!writer.started());

        writer.write_header(StatusCode::UNAUTHORIZED);
        writer.write_header(StatusCode::OK);
        writer.write(b"denied");

        assert!(writer.started());
        assert_eq!(writer.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(writer.body(), b"denied");
    }

    #[test]
    fn test_write_implies_ok() {
        let mut writer = ResponseWriter::new();
        writer.write(b"hello");

        let response = writer.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

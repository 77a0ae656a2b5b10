use std::path::PathBuf;

/// 웹 계층 구성 단계에서 발생하는 에러
///
/// 인증 실패는 에러가 아닙니다. 인증 실패는 401 응답으로만 표현됩니다.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("잘못된 경로 패턴: {pattern} ({reason})")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },

    #[error("htpasswd 파일 {path} 읽기 실패: {source}")]
    Htpasswd {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("설정 오류: {0}")]
    Config(String),
}

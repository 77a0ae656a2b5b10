//! 필터 체인 기반 웹 계층
//!
//! 요청 컨텍스트, 응답 버퍼, 경로 패턴, 필터 체인과 Basic 인증 필터를 제공합니다.

mod app;
mod context;
mod error;
pub mod filter;
pub mod matcher;
mod response;

pub use app::{App, HandlerFunc};
pub use context::{Context, Request, RequestView};
pub use error::WebError;
pub use filter::{FilterFunc, FilterOptions, FilterPosition, FilterRouter};
pub use matcher::{PathPattern, PatternKind};
pub use response::ResponseWriter;

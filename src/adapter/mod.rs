//! 이전 프레임워크 호환 계층
//!
//! 이전 프레임워크의 컨텍스트, 필터 함수와 애플리케이션 타입을 제공하고
//! 모든 동작을 [`crate::web`] 계층에 위임합니다.

mod app;
pub mod context;
pub mod plugins;

pub use app::{App, FilterFunc};
pub use context::{Context, Input};
pub use crate::web::{FilterOptions, FilterPosition, Request, RequestView, ResponseWriter};

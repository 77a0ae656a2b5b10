//! HTTP Basic 인증 필터와 이전 프레임워크 호환 계층
//!
//! # 주요 기능
//!
//! - 필터 체인 기반 웹 계층 (`web`)
//! - Basic 인증 필터: 평문, `{SHA}`, `$apr1$`, bcrypt 비밀값
//! - 이전 프레임워크 타입으로 같은 필터를 노출하는 호환 계층 (`adapter`)
//!
//! # 예제
//!
//! ```
//! use basic_auth_filter::adapter::{App, Context, FilterPosition, plugins::auth};
//! use bytes::Bytes;
//! use hyper::StatusCode;
//!
//! let mut app = App::new();
//! app.insert_filter("*", FilterPosition::BeforeRouter, auth::basic("admin", "secret"))
//!     .unwrap();
//! app.get("/", |ctx: &mut Context| ctx.output.write(b"hello")).unwrap();
//!
//! let request = hyper::Request::builder()
//!     .uri("/")
//!     .body(Bytes::new())
//!     .unwrap();
//! let response = app.handle(request);
//! assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
//! ```

pub mod adapter;
pub mod logging;
pub mod server;
pub mod settings;
pub mod web;

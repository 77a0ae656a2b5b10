//! 필터 체인 구성 요소
//!
//! 필터는 라우팅 전후에 실행되는 함수로, 요청을 검사하거나
//! 응답을 먼저 써서 처리를 중단시킬 수 있습니다.

pub mod auth;

use std::sync::Arc;
use super::{Context, PathPattern, WebError};

/// 요청 처리 체인에 끼워 넣는 필터 함수
pub type FilterFunc = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// 필터가 실행되는 위치 (실행 순서대로)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPosition {
    BeforeStatic,
    BeforeRouter,
    BeforeExec,
    AfterExec,
    FinishRouter,
}

impl FilterPosition {
    pub(crate) const COUNT: usize = 5;

    pub(crate) fn index(self) -> usize {
        match self {
            FilterPosition::BeforeStatic => 0,
            FilterPosition::BeforeRouter => 1,
            FilterPosition::BeforeExec => 2,
            FilterPosition::AfterExec => 3,
            FilterPosition::FinishRouter => 4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    /// 응답 출력이 시작되면 이후 처리를 중단할지 여부
    pub return_on_output: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self { return_on_output: true }
    }
}

/// 경로 패턴에 묶인 필터 하나
#[derive(Clone)]
pub struct FilterRouter {
    pattern: PathPattern,
    filter: FilterFunc,
    options: FilterOptions,
}

impl FilterRouter {
    pub fn new(pattern: &str, filter: FilterFunc, options: FilterOptions) -> Result<Self, WebError> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            filter,
            options,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn valid_router(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }

    pub fn return_on_output(&self) -> bool {
        self.options.return_on_output
    }

    pub fn call(&self, ctx: &mut Context) {
        (self.filter)(ctx)
    }
}

impl std::fmt::Debug for FilterRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRouter")
            .field("pattern", &self.pattern.pattern)
            .field("options", &self.options)
            .finish()
    }
}

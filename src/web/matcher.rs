use regex_lite as regex;
use super::WebError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `*` 모든 경로
    Any,
    Exact,
    Prefix,
    Regex,
}

/// 필터와 라우트 등록에 쓰이는 경로 패턴
///
/// - `*` : 모든 경로
/// - `/admin` : 정확히 일치
/// - `/admin/*` : `/admin` 과 그 하위 경로
/// - `^/api/v[0-9]+/.*` : 정규식
#[derive(Debug, Clone)]
pub struct PathPattern {
    pub kind: PatternKind,
    pub pattern: String,
    regex: Option<regex::Regex>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, WebError> {
        if pattern == "*" {
            return Ok(Self {
                kind: PatternKind::Any,
                pattern: pattern.to_string(),
                regex: None,
            });
        }

        if pattern.starts_with('^') {
            let re = regex::Regex::new(pattern).map_err(|e| WebError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(Self {
                kind: PatternKind::Regex,
                pattern: pattern.to_string(),
                regex: Some(re),
            });
        }

        if !pattern.starts_with('/') {
            return Err(WebError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "경로 패턴은 '/' 로 시작해야 합니다".to_string(),
            });
        }

        Ok(Self {
            kind: if pattern.ends_with('*') {
                PatternKind::Prefix
            } else {
                PatternKind::Exact
            },
            pattern: pattern.trim_end_matches('*').to_string(),
            regex: None,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            PatternKind::Any => true,
            PatternKind::Exact => self.pattern == path,
            PatternKind::Prefix => {
                // 접두사 매칭에서는 trailing slash 무시
                let pattern = self.pattern.trim_end_matches('/');
                let path = path.trim_end_matches('/');
                pattern.is_empty() || path == pattern || path.starts_with(&format!("{}/", pattern))
            }
            PatternKind::Regex => self.regex.as_ref()
                .map(|r| r.is_match(path))
                .unwrap_or(false),
        }
    }
}

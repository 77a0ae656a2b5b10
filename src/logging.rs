use std::path::Path;
use std::time::Instant;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn, error, Level, span};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::time::UtcTime, EnvFilter};
use crate::settings::logging::{LogFormat, LogOutput};
use crate::settings::LogSettings;

/// 로그 설정에 따라 전역 subscriber 를 설치합니다.
///
/// 반환된 guard 가 살아 있는 동안 비동기 writer 가 로그를 내보냅니다.
pub fn init_logging(settings: &LogSettings) -> Result<WorkerGuard, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::from_default_env()
        .add_directive(settings.level.into());

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name()
                .map(|name| name.to_os_string())
                .unwrap_or_else(|| "basic_auth_filter.log".into());
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_timer(UtcTime::new(Rfc3339))
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match settings.format {
        LogFormat::Text => builder.try_init()?,
        LogFormat::Json => builder.json().try_init()?,
    }

    Ok(guard)
}

#[derive(Debug)]
pub struct RequestLog {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub status_code: u16,
    pub duration_ms: u64,
    pub user: Option<String>,
    started: Instant,
}

impl RequestLog {
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            method: String::new(),
            path: String::new(),
            status_code: 0,
            duration_ms: 0,
            user: None,
            started: Instant::now(),
        }
    }

    pub fn with_request<B>(&mut self, req: &hyper::Request<B>) {
        self.method = req.method().to_string();
        self.path = req.uri().path().to_string();
    }

    pub fn with_response<B>(&mut self, res: &hyper::Response<B>) {
        self.status_code = res.status().as_u16();
        self.duration_ms = self.started.elapsed().as_millis() as u64;
    }

    pub fn with_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_request(log: &RequestLog) {
    let level = if log.status_code >= 500 {
        Level::ERROR
    } else if log.status_code >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    let span = span!(
        Level::INFO,
        "request",
        request_id = %log.request_id,
        method = %log.method,
        path = %log.path,
        status = %log.status_code,
        duration_ms = %log.duration_ms
    );
    let _enter = span.enter();

    match level {
        Level::ERROR => error!(user = ?log.user, "Request failed"),
        Level::WARN => warn!(user = ?log.user, "Request rejected"),
        _ => info!(user = ?log.user, "Request completed"),
    }
}

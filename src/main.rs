use std::sync::Arc;
use basic_auth_filter::{
    adapter::{self, plugins::auth, Context, FilterPosition},
    logging::init_logging,
    server,
    settings::Settings,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    let _guard = match init_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("로깅 초기화 실패: {}", e);
            std::process::exit(1);
        }
    };

    let secrets = match settings.auth.secret_provider() {
        Ok(secrets) => secrets,
        Err(e) => {
            error!(error = %e, "비밀값 제공자 생성 실패");
            std::process::exit(1);
        }
    };

    let mut app = adapter::App::new();
    let filter = auth::new_basic_authenticator(secrets.into(), &settings.auth.realm);
    if let Err(e) = app.insert_filter("*", FilterPosition::BeforeRouter, filter) {
        error!(error = %e, "필터 등록 실패");
        std::process::exit(1);
    }
    let greeting = app.get("*", |ctx: &mut Context| {
        let user = ctx.input.data(auth::AUTH_USER_KEY).unwrap_or("anonymous").to_string();
        ctx.output.write(format!("hello, {}\n", user).as_bytes());
    });
    if let Err(e) = greeting {
        error!(error = %e, "라우트 등록 실패");
        std::process::exit(1);
    }

    info!(realm = %settings.auth.realm, addr = %settings.server.socket_addr(), "Basic 인증 서버 시작");
    if let Err(e) = server::bind_and_serve(settings.server.socket_addr(), Arc::new(app.into_inner())).await {
        error!(error = %e, "서버 실행 실패");
        std::process::exit(1);
    }
}

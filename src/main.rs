//! # tubeprompt 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 검증 (필수 값이 없으면 여기서 종료)
//! 4. 외부 클라이언트(Appwrite, Gemini)와 공유 상태 생성
//! 5. 라우터 + 정적 파일 + 요청 로깅 설정
//! 6. HTTP 서버 시작

use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use std::path::Path;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubeprompt::{config::Config, router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다. (운영에서는 실제 환경변수를 사용)
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG 환경변수가 없으면 tubeprompt, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubeprompt=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    // 필수 환경변수가 하나라도 없으면 `?`로 에러가 전파되어 서버가 뜨지 않습니다.
    let config = Config::from_env()?;
    tracing::info!(
        "Starting tubeprompt on {}:{} (project {}, model {}, production: {})",
        config.host,
        config.port,
        config.appwrite.project_id,
        config.gemini.model,
        config.production
    );

    // ── 4단계: 애플리케이션 상태(State) 생성 ──
    // 인증 게이트웨이와 생성 프록시를 시작 시점에 한 번만 만듭니다.
    let state = AppState::new(&config);

    // ── 5단계: 라우터 설정 ──
    let app = router(state);

    // 정적 파일(이미지, 스타일시트 등) 디렉토리가 있으면
    // 라우트에 매칭되지 않는 요청을 그 디렉토리에서 찾아 서빙합니다.
    let public_dir = Path::new(&config.public_dir);
    let app = if public_dir.exists() {
        tracing::info!("Serving static files from {}", config.public_dir);
        app.fallback_service(ServeDir::new(public_dir))
    } else {
        tracing::warn!("Static directory {} not found, serving routes only", config.public_dir);
        app
    };

    // TraceLayer: HTTP 요청/응답 자동 로깅
    let app = app.layer(TraceLayer::new_for_http());

    // ── 6단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

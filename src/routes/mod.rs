//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 그들이 공유하는 `AppState`를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 로그인 페이지, 로그인, 로그아웃
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `home`: 보호된 메인 페이지, 영상 프롬프트 제출(일반 / 스트리밍)
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | / | `home` | 로그인한 사용자 정보 (비로그인 시 /login 리다이렉트) |
//! | POST | / | `generate` | `video-url`, `prompt` 폼 → `{ "output" }` |
//! | POST | /stream | `generate_stream` | 같은 폼 → SSE 이벤트 스트림 |
//! | GET | /login | `login_page` | 이미 로그인했으면 / 로 리다이렉트 |
//! | POST | /login | `login` | `email`, `password` 폼 → 쿠키 설정 후 / 로 리다이렉트 |
//! | POST | /logout | `logout` | 쿠키 삭제 후 /login 으로 리다이렉트 |
//! | GET | /health | `health_check` | `{ "status": "ok" }` |

pub mod auth;
pub mod health;
pub mod home;

pub use auth::*;
pub use health::*;
pub use home::*;

use axum::{
    extract::rejection::FormRejection,
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::middleware::auth::AuthGateway;
use crate::services::{
    appwrite::{AppwriteClient, IdentityBackend},
    cookie::SessionCookies,
    gemini::{GeminiClient, GenerationBackend},
    generation::GenerationProxy,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 안에 든 것은 모두 읽기 전용이며 `Arc`로 공유되므로,
/// 동시에 처리되는 요청끼리 주고받는 가변 상태가 없습니다.
#[derive(Clone)]
pub struct AppState {
    /// 인증 게이트웨이 (세션 쿠키 + Appwrite)
    pub auth: AuthGateway,
    /// 생성 프록시 (Gemini)
    pub generator: GenerationProxy,
}

impl AppState {
    /// 검증이 끝난 설정으로 실제 외부 클라이언트들을 만듭니다.
    ///
    /// 인증 게이트웨이는 여기서 무조건 함께 만들어집니다.
    /// 첫 요청 때 늦게 초기화하는 경로는 없습니다.
    pub fn new(config: &Config) -> Self {
        let cookies = SessionCookies::new(&config.appwrite.project_id, config.production);
        let identity: Arc<dyn IdentityBackend> =
            Arc::new(AppwriteClient::new(config.appwrite.clone()));
        let generation: Arc<dyn GenerationBackend> =
            Arc::new(GeminiClient::new(config.gemini.clone()));

        Self::from_parts(identity, generation, cookies)
    }

    /// 백엔드 구현을 직접 넣어 상태를 만듭니다. (테스트에서 가짜 백엔드 주입용)
    pub fn from_parts(
        identity: Arc<dyn IdentityBackend>,
        generation: Arc<dyn GenerationBackend>,
        cookies: SessionCookies,
    ) -> Self {
        Self {
            auth: AuthGateway::new(identity, cookies),
            generator: GenerationProxy::new(generation),
        }
    }
}

/// 모든 라우트를 등록한 라우터를 만듭니다.
///
/// 정적 파일 서빙과 요청 로깅 레이어는 `main`에서 덧붙입니다.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home).post(generate))
        .route("/stream", post(generate_stream))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/health", get(health_check))
        .with_state(state)
}

/// 폼 본문을 읽지 못했으면(`Content-Type` 불일치, 깨진 본문) 빈 폼으로 취급합니다.
///
/// 핸들러는 인증 확인을 먼저 끝낸 뒤 이 함수를 부르고,
/// 빈 필드는 이후 검증에서 `MissingInput`(400 JSON)으로 걸러집니다.
pub(crate) fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Unreadable form body: {}", rejection);
            T::default()
        }
    }
}

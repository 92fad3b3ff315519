//! # 메인 페이지 / 생성 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /`       → 로그인한 사용자 정보 `{ "user": { "name", "email" } }`
//! - `POST /`       → 영상 URL + 프롬프트로 생성한 텍스트 `{ "output": "..." }`
//! - `POST /stream` → 같은 생성 결과를 SSE(Server-Sent Events)로 조각조각 전송
//!
//! ## 인증 처리
//! `require_user()`는 `AuthOutcome`을 돌려주고, 핸들러가 두 경우를 `match`로 직접 처리합니다.
//! - `Authenticated(user)`: 정상 처리 계속
//! - `RedirectRequired(location)`: 즉시 리다이렉트 응답을 반환하고 더 이상 아무것도 하지 않음

use axum::{
    extract::{rejection::FormRejection, State},
    http::HeaderMap,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Redirect, Response,
    },
    Form, Json,
};
use futures::StreamExt;
use serde_json::json;

use crate::{
    error::AppError,
    middleware::auth::AuthOutcome,
    models::{GenerateForm, GenerationOutput},
    routes::{form_or_default, AppState},
    services::generation::{events, GenerationEvent},
};

/// `GET /`: 보호된 페이지. 화면에 보여줄 최소한의 사용자 정보만 돌려줍니다.
pub async fn home(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.auth.require_user(&headers).await {
        AuthOutcome::Authenticated(user) => Json(json!({ "user": user })).into_response(),
        AuthOutcome::RedirectRequired(location) => Redirect::to(&location).into_response(),
    }
}

/// `POST /`: 폼(`video-url`, `prompt`)을 받아 생성 결과를 JSON으로 돌려줍니다.
///
/// # 응답
/// - 200 `{ "output": "..." }`
/// - 400 `{ "error": "Please provide a URL and a prompt." }` (백엔드 호출 없음, 폼 본문이 없거나 깨진 경우 포함)
/// - 500 `{ "error": "<백엔드 메시지>" }`
/// - 비로그인: `/login`으로 리다이렉트
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    // Form은 요청 본문을 소비하므로 항상 마지막 추출기여야 합니다.
    // Result로 받아서, 본문이 잘못돼도 인증 확인이 먼저 실행되게 합니다.
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let user = match state.auth.require_user(&headers).await {
        AuthOutcome::Authenticated(user) => user,
        AuthOutcome::RedirectRequired(location) => {
            return Ok(Redirect::to(&location).into_response())
        }
    };
    tracing::debug!("Generation requested by {}", user.email);

    let form = form_or_default(form);

    let output = state.generator.generate(&form.prompt, &form.video_url).await?;
    Ok(Json(GenerationOutput { output }).into_response())
}

/// `POST /stream`: `POST /`와 같은 폼을 받아 결과를 SSE로 흘려보냅니다.
///
/// 이벤트 종류:
/// - `chunk`: `{ "text": "..." }` 새로 생성된 조각
/// - `done`: `{ "output": "..." }` 모든 조각을 이어 붙인 최종 결과
/// - `error`: `{ "error": "..." }` 생성 도중 실패
///
/// EventSource/fetch 스트림은 리다이렉트를 따라갈 수 없으므로,
/// 비로그인 요청에는 리다이렉트 대신 401을 돌려줍니다.
pub async fn generate_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Result<Response, AppError> {
    if let AuthOutcome::RedirectRequired(_) = state.auth.require_user(&headers).await {
        return Err(AppError::Unauthorized);
    }
    let form = form_or_default(form);

    // 검증 실패나 첫 요청 실패는 스트림을 열기 전에 일반 JSON 에러로 응답합니다.
    let chunks = state.generator.start(&form.prompt, &form.video_url).await?;
    let stream = events(chunks).map(to_sse_event);

    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response())
}

/// 데이터는 JSON으로 감쌉니다. 모델 출력에 섞인 줄바꿈/캐리지 리턴을 그대로 실으면
/// SSE 필드 규칙에 어긋나기 때문입니다.
fn to_sse_event(event: GenerationEvent) -> Result<Event, axum::Error> {
    match event {
        GenerationEvent::Chunk(text) => Event::default()
            .event("chunk")
            .json_data(json!({ "text": text })),
        GenerationEvent::Done(output) => Event::default()
            .event("done")
            .json_data(GenerationOutput { output }),
        GenerationEvent::Failed(message) => Event::default()
            .event("error")
            .json_data(json!({ "error": message })),
    }
}

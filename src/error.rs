//! # 에러 처리 모듈
//!
//! 요청 경계(request boundary)에서 사용하는 에러 타입을 정의합니다.
//! 하위 계층(Appwrite 클라이언트, Gemini 클라이언트)은 각자의 에러 타입을 가지며,
//! 라우트 핸들러에 도달하기 전에 이 `AppError`로 변환됩니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 사용자에게 보여줄 수 있는 모든 실패 종류
//! - `IntoResponse` 구현: 에러를 `{ "error": "..." }` JSON과 HTTP 상태 코드로 변환

use axum::{
    http::StatusCode,                   // HTTP 상태 코드 (400, 401, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json;
use thiserror::Error;

/// 메시지가 비어 있을 때 대신 보여줄 문구
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// 요청 처리 중 발생할 수 있는 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
/// 어떤 variant도 프로세스를 죽이지 않습니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 필수 폼 필드 누락 (HTTP 400)
    #[error("{0}")]
    MissingInput(String),

    /// 로그인 거부 (HTTP 401)
    /// 인증 백엔드가 돌려준 메시지를 그대로 담습니다.
    #[error("{0}")]
    InvalidCredentials(String),

    /// 유효한 세션 없음 (HTTP 401)
    ///
    /// 페이지 라우트에서는 에러 대신 `/login` 리다이렉트로 처리되므로,
    /// 리다이렉트를 따라갈 수 없는 클라이언트(SSE 등)에게만 응답으로 나갑니다.
    #[error("Unauthorized")]
    Unauthorized,

    /// 생성 백엔드 호출 실패 (HTTP 500)
    #[error("{0}")]
    Generation(String),
}

impl AppError {
    /// 이 에러에 대응하는 HTTP 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials(_) | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 클라이언트에게 보여줄 메시지. 빈 문자열은 내보내지 않습니다.
    pub fn message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 결과: `{ "error": "Please provide a URL and a prompt." }`
    fn into_response(self) -> Response {
        let status = self.status();
        // 서버 쪽 실패만 error 레벨로 남기고, 사용자 입력 문제는 debug로 충분합니다.
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = Json(json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::MissingInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Generation("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_generation_message_is_replaced() {
        assert_eq!(AppError::Generation(String::new()).message(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(AppError::Generation("quota exceeded".into()).message(), "quota exceeded");
    }
}

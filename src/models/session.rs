//! # 세션 모델
//!
//! Appwrite가 발급한 로그인 세션입니다.
//! 이 서버는 `secret`을 해석하거나 검증하지 않고, 쿠키에 실어 나르기만 합니다.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 인증 백엔드가 발급한 세션
///
/// `POST /account/sessions/email` 응답의 일부입니다.
/// `secret`은 API 키로 호출했을 때만 채워집니다.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// 불투명(opaque) 세션 비밀값
    #[serde(default)]
    pub secret: String,
    /// 만료 시각. Appwrite는 `"2026-11-17T09:30:00.000+00:00"` 같은 ISO 8601 문자열을 돌려줍니다.
    pub expire: DateTime<Utc>,
}

//! # 세션 쿠키 어댑터
//!
//! 불투명한 세션 비밀값(secret)과 HTTP 쿠키 사이를 변환합니다.
//!
//! 이 모듈의 함수들:
//! - `read_secret()`: 요청의 `Cookie` 헤더에서 세션 비밀값을 꺼냄
//! - `build_set_cookie()`: 로그인 성공 시 내려보낼 `Set-Cookie` 값 생성
//! - `build_clear_cookie()`: 로그아웃 시 쿠키를 지우는 `Set-Cookie` 값 생성
//!
//! 쿠키 이름은 Appwrite 관례를 따라 `a_session_<프로젝트ID>`입니다.
//! 헤더 문자열만 만들 뿐, 호출 사이에 어떤 상태도 보관하지 않습니다.

use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// 쿠키 값 인코딩에서 그대로 두는 문자들: 영숫자와 `- _ . ! ~ * ' ( )`
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// HTTP 날짜 형식 (RFC 7231 IMF-fixdate)
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// 유닉스 시간 0. 쿠키를 즉시 만료시킬 때 사용합니다.
const EPOCH_HTTP_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// 세션 쿠키 이름을 만듭니다. 예: `a_session_64f1c2`
pub fn session_cookie_name(project_id: &str) -> String {
    format!("a_session_{}", project_id)
}

/// 세션 쿠키를 읽고 쓰는 어댑터
///
/// 서버 시작 시 설정(`Config`)으로부터 한 번 만들어지고,
/// 이후에는 읽기 전용으로 모든 요청이 공유합니다.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    /// 운영 환경이면 true → `Secure` 속성 추가.
    /// 개발 중 `http://localhost`에서도 쿠키가 동작하도록 끌 수 있어야 합니다.
    secure: bool,
}

impl SessionCookies {
    pub fn new(project_id: &str, secure: bool) -> Self {
        Self {
            name: session_cookie_name(project_id),
            secure,
        }
    }

    /// 쿠키 이름
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 요청 헤더에서 세션 비밀값을 읽습니다.
    ///
    /// `Cookie: theme=dark; a_session_proj=abc%3D` → `Some("abc=")`
    ///
    /// 쿠키가 없거나, 값이 비었거나, 퍼센트 인코딩이 깨져 있으면 `None`입니다.
    /// HTTP/2에서는 `Cookie` 헤더가 여러 줄로 나뉘어 올 수 있어 모두 확인합니다.
    pub fn read_secret(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| raw.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| percent_decode_str(value).decode_utf8().ok())
            .map(|secret| secret.into_owned())
            .filter(|secret| !secret.is_empty())
    }

    /// 로그인 성공 후 브라우저에 심을 `Set-Cookie` 값을 만듭니다.
    ///
    /// 만료 시각은 인증 백엔드 세션의 만료 시각과 같게 맞춥니다.
    /// 결과 예: `a_session_proj=abc; Path=/; HttpOnly; SameSite=Lax; Secure; Expires=Wed, 18 Nov 2026 09:30:00 GMT`
    pub fn build_set_cookie(&self, secret: &str, expires: DateTime<Utc>) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, utf8_percent_encode(secret, COOKIE_VALUE)),
            "Path=/".to_string(),
            "HttpOnly".to_string(),
            "SameSite=Lax".to_string(),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push(format!("Expires={}", expires.format(HTTP_DATE)));
        parts.join("; ")
    }

    /// 세션 쿠키를 지우는 `Set-Cookie` 값을 만듭니다.
    ///
    /// 같은 이름 + `Max-Age=0` + 과거 `Expires`로 브라우저가 즉시 삭제하게 합니다.
    pub fn build_clear_cookie(&self) -> String {
        let mut parts = vec![
            format!("{}=", self.name),
            "Path=/".to_string(),
            "HttpOnly".to_string(),
            "SameSite=Strict".to_string(),
        ];
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push("Max-Age=0".to_string());
        parts.push(format!("Expires={}", EPOCH_HTTP_DATE));
        parts.join("; ")
    }
}

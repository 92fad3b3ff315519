//! # 사용자 모델
//!
//! Appwrite 계정 정보 중 이 서버가 실제로 쓰는 부분만 담은 투영(projection)입니다.
//! 로컬에 저장하지 않으며, 필요할 때마다 세션으로 다시 조회합니다.

use serde::{Deserialize, Serialize};

/// 현재 로그인한 사용자
///
/// Appwrite `GET /account` 응답에는 `$id`, `prefs`, `labels` 등 더 많은 필드가 있지만
/// serde는 모르는 필드를 무시하므로 `name`, `email`만 꺼내 씁니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// 표시 이름. 가입 시 이름을 넣지 않은 계정은 빈 문자열입니다.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// 로그인 폼: `POST /login`의 요청 본문(application/x-www-form-urlencoded)
///
/// 필드가 아예 없어도 역직렬화가 실패하지 않도록 `default`를 붙이고,
/// 비어 있는지는 인증 게이트웨이에서 검사합니다.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

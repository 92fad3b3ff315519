//! # tubeprompt
//!
//! 로그인한 사용자가 YouTube 영상 URL과 프롬프트를 보내면,
//! 둘을 함께 멀티모달 LLM(Gemini)에 전달하고 생성된 텍스트를 돌려주는 웹 서버입니다.
//! 계정과 세션은 전부 외부 인증 백엔드(Appwrite)가 관리하며,
//! 이 서버는 세션 비밀값을 쿠키에 실어 나르기만 합니다.
//!
//! ```text
//! 요청 ─▶ 인증 게이트웨이 ─(비로그인)─▶ /login 리다이렉트
//!              │
//!              └─(로그인)─▶ 생성 프록시 ─▶ Gemini ─▶ 결과 / 에러 JSON
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::{router, AppState};

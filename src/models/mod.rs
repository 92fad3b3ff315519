//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `generation`: 생성 폼, 생성 요청/결과
//! - `session`: 인증 백엔드가 발급한 세션
//! - `user`: 로그인한 사용자, 로그인 폼
//!
//! 어떤 모델도 저장되지 않습니다. 요청 하나가 끝나면 함께 사라집니다.

pub mod generation;
pub mod session;
pub mod user;

pub use generation::*;
pub use session::*;
pub use user::*;

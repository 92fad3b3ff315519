//! # 인증 미들웨어 모듈
//!
//! - `auth`: 세션 쿠키로 현재 사용자를 확인하고, 로그인/로그아웃을 처리하는 인증 게이트웨이

pub mod auth;

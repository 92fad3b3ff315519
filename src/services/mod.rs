//! # 서비스 계층
//!
//! 외부 시스템과 대화하는 코드와, 그 위에 얹은 얇은 비즈니스 로직입니다.
//! - `appwrite`: 인증 백엔드(Appwrite) REST 클라이언트와 관리자/세션 핸들
//! - `cookie`: 세션 비밀값 ⇄ HTTP 쿠키 변환
//! - `gemini`: 생성 백엔드(Gemini) 스트리밍 클라이언트
//! - `generation`: 입력 검증 후 생성 결과를 모으는 생성 프록시

pub mod appwrite;
pub mod cookie;
pub mod gemini;
pub mod generation;

//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /health` → `{ "status": "ok", "service": "tubeprompt", "version": "0.1.0" }`
//!
//! 쿠키 없이 호출할 수 있고, 외부 백엔드(Appwrite, Gemini)를 호출하지 않습니다.
//! 로드밸런서나 컨테이너 오케스트레이터의 생존 확인(liveness)용입니다.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`: 서버 프로세스가 요청을 받을 수 있는지만 확인합니다.
pub async fn health_check() -> Json<Value> {
    // env!: 컴파일 시점에 Cargo.toml의 값을 문자열 상수로 넣습니다.
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! # 생성 요청 모델
//!
//! 폼 제출 한 번마다 만들어졌다가 응답을 돌려주면 버려지는 값들입니다.

use serde::{Deserialize, Serialize};

/// 영상과 함께 보낼 MIME 타입. YouTube URL도 이 타입으로 전달합니다.
pub const VIDEO_MIME_TYPE: &str = "video/mp4";

/// 생성 폼: `POST /`, `POST /stream`의 요청 본문
#[derive(Debug, Default, Deserialize)]
pub struct GenerateForm {
    #[serde(default, rename = "video-url")]
    pub video_url: String,
    #[serde(default)]
    pub prompt: String,
}

/// 검증을 통과한 생성 요청 (prompt, video URL 모두 비어 있지 않음)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub video_url: String,
}

/// 생성 성공 응답 본문: `{ "output": "..." }`
#[derive(Debug, Serialize)]
pub struct GenerationOutput {
    pub output: String,
}

//! # Gemini(생성 백엔드) 스트리밍 클라이언트
//!
//! 프롬프트와 영상 URL을 하나의 멀티모달 요청으로 묶어 Gemini에 보내고,
//! SSE(`alt=sse`)로 흘러오는 답변을 텍스트 조각 스트림으로 바꿉니다.
//!
//! 이 모듈의 함수들:
//! - `GeminiClient::stream_generate()`: `streamGenerateContent` 호출, 조각 스트림 반환
//! - `sse_text_stream()`: 바이트 스트림을 줄 단위로 잘라 `data:` 줄의 텍스트만 꺼냄
//! - `parse_sse_line()`: SSE 한 줄을 해석 (에러 본문, 차단된 프롬프트 포함)
//!
//! 재시도는 하지 않습니다. 실패는 모두 `GenerationError`로 돌려줍니다.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{stream::BoxStream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::GeminiConfig;
use crate::models::{GenerationRequest, VIDEO_MIME_TYPE};

/// 모든 요청에 쓰는 고정 temperature 값
pub const TEMPERATURE: f32 = 0.5;

/// 생성 백엔드가 만들어 내는 텍스트 조각 스트림
pub type TextStream = BoxStream<'static, Result<String, GenerationError>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// 모델 API가 에러로 응답함 (할당량 초과, 잘못된 영상, 차단된 프롬프트 등)
    #[error("{0}")]
    Upstream(String),

    #[error("Generation backend unreachable: {0}")]
    Transport(String),

    #[error("Malformed generation stream: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 멀티모달 요청 하나를 보내고, 답변이 만들어지는 대로 조각을 돌려줍니다.
    async fn stream_generate(&self, request: &GenerationRequest)
        -> Result<TextStream, GenerationError>;
}

// 요청 본문: https://ai.google.dev/api/generate-content
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'static str,
    file_uri: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

// 응답 조각
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            // 영상 분석은 느립니다. 스트리밍 답변 전체가 이 시간 안에 끝나야 합니다.
            client: Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn stream_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<TextStream, GenerationError> {
        debug!(
            "Calling {} (prompt: {} chars, video: {})",
            self.config.model,
            request.prompt.chars().count(),
            request.video_url
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        text: Some(&request.prompt),
                        ..Default::default()
                    },
                    Part {
                        file_data: Some(FileData {
                            mime_type: VIDEO_MIME_TYPE,
                            file_uri: &request.video_url,
                        }),
                        ..Default::default()
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Gemini API error ({}): {}", status, text);
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|body| body.error.message)
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Gemini API error ({})", status));
            return Err(GenerationError::Upstream(message));
        }

        Ok(Box::pin(sse_text_stream(response.bytes_stream())))
    }
}

/// SSE 바이트 스트림을 각 `data:` 줄에 담긴 텍스트 스트림으로 바꿉니다.
///
/// 네트워크 조각은 줄 경계와 무관하게 잘려 오므로, 줄바꿈이 올 때까지 버퍼에 모읍니다.
pub fn sse_text_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, GenerationError>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| GenerationError::Transport(e.to_string()))?;
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line).into_owned();
                if let Some(text) = parse_sse_line(&line)? {
                    yield text;
                }
            }
        }

        // 줄바꿈 없이 끝난 마지막 이벤트
        let rest = String::from_utf8_lossy(&buffer).into_owned();
        if let Some(text) = parse_sse_line(&rest)? {
            yield text;
        }
    }
}

/// SSE 한 줄에서 생성된 텍스트를 꺼냅니다. `data:` 줄이 아니거나 빈 조각이면 `None`.
fn parse_sse_line(line: &str) -> Result<Option<String>, GenerationError> {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let chunk: StreamChunk =
        serde_json::from_str(data).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if let Some(err) = chunk.error {
        return Err(GenerationError::Upstream(err.message));
    }
    if chunk.candidates.is_empty() {
        if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenerationError::Upstream(format!(
                "Prompt was blocked by the model ({})",
                reason
            )));
        }
    }

    let text: String = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    Ok((!text.is_empty()).then_some(text))
}

//! # 생성 프록시(Generation Proxy)
//!
//! 폼에서 받은 (프롬프트, 영상 URL)을 검증한 뒤 생성 백엔드에 한 번 요청하고,
//! 조각(chunk)으로 흘러오는 답변을 이어 붙여 최종 텍스트를 만듭니다.
//!
//! ## 흐름
//! ```text
//! validate() ──실패──▶ AppError::MissingInput (백엔드 호출 없음)
//!     │
//!     ▼
//! backend.stream_generate() ──▶ "조각1" "조각2" ... ──▶ join ──▶ 최종 텍스트
//!                                   │
//!                                   └─▶ on_chunk 콜백 / SSE 이벤트 (선택)
//! ```
//!
//! 재시도, 캐시, 속도 제한은 하지 않습니다. 제출 한 번에 호출 한 번입니다.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::GenerationRequest;
use crate::services::gemini::{GenerationBackend, GenerationError, TextStream};

/// 입력 누락 시 사용자에게 보여줄 메시지
pub const MISSING_INPUT_MESSAGE: &str = "Please provide a URL and a prompt.";

/// 스트리밍 응답에서 클라이언트에게 내보내는 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// 방금 생성된 텍스트 조각
    Chunk(String),
    /// 모든 조각을 이어 붙인 최종 텍스트 (정식 결과)
    Done(String),
    /// 생성 도중 실패. 이후 이벤트는 없습니다.
    Failed(String),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Generation(err.to_string())
    }
}

/// 폼 입력을 검증하여 생성 요청으로 바꿉니다.
///
/// 공백만 있는 값도 비어 있는 것으로 봅니다.
pub fn validate(prompt: &str, video_url: &str) -> Result<GenerationRequest, AppError> {
    let prompt = prompt.trim();
    let video_url = video_url.trim();
    if prompt.is_empty() || video_url.is_empty() {
        return Err(AppError::MissingInput(MISSING_INPUT_MESSAGE.to_string()));
    }

    Ok(GenerationRequest {
        prompt: prompt.to_string(),
        video_url: video_url.to_string(),
    })
}

/// 생성 프록시
///
/// 내부 상태가 없으므로 동시에 들어온 요청들이 서로의 결과를 볼 일이 없습니다.
/// `Arc`로 감싼 백엔드만 공유합니다.
#[derive(Clone)]
pub struct GenerationProxy {
    backend: Arc<dyn GenerationBackend>,
}

impl GenerationProxy {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// 입력을 검증하고 백엔드 호출을 시작합니다. 조각 스트림을 그대로 돌려줍니다.
    pub async fn start(&self, prompt: &str, video_url: &str) -> Result<TextStream, AppError> {
        let request = validate(prompt, video_url)?;
        info!("Generating for video {}", request.video_url);

        let stream = self.backend.stream_generate(&request).await.map_err(|e| {
            warn!("Generation backend rejected request: {}", e);
            AppError::from(e)
        })?;
        Ok(stream)
    }

    /// 최종 텍스트만 필요할 때 사용합니다.
    pub async fn generate(&self, prompt: &str, video_url: &str) -> Result<String, AppError> {
        self.generate_with(prompt, video_url, |_| {}).await
    }

    /// 조각이 도착할 때마다 `on_chunk`를 호출하면서 최종 텍스트를 만듭니다.
    ///
    /// 도중에 실패하면 그때까지 받은 조각은 버리고 에러를 돌려줍니다.
    pub async fn generate_with<F>(
        &self,
        prompt: &str,
        video_url: &str,
        mut on_chunk: F,
    ) -> Result<String, AppError>
    where
        F: FnMut(&str) + Send,
    {
        let mut stream = self.start(prompt, video_url).await?;
        let mut output = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                warn!("Generation stream failed: {}", e);
                AppError::from(e)
            })?;
            on_chunk(&chunk);
            output.push_str(&chunk);
        }

        debug!("Generation finished ({} chars)", output.chars().count());
        Ok(output)
    }
}

/// 조각 스트림을 클라이언트용 이벤트 스트림으로 바꿉니다.
///
/// 조각마다 `Chunk`, 끝나면 이어 붙인 텍스트로 `Done`을 하나 내보냅니다.
/// 실패하면 `Failed` 하나를 내보내고 끝납니다.
pub fn events(mut chunks: TextStream) -> impl Stream<Item = GenerationEvent> + Send {
    async_stream::stream! {
        let mut output = String::new();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    output.push_str(&text);
                    yield GenerationEvent::Chunk(text);
                }
                Err(e) => {
                    warn!("Generation stream failed: {}", e);
                    yield GenerationEvent::Failed(AppError::from(e).message());
                    return;
                }
            }
        }
        yield GenerationEvent::Done(output);
    }
}

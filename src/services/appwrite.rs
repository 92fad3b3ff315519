//! # Appwrite(인증 백엔드) 클라이언트
//!
//! 계정과 세션은 모두 Appwrite가 소유합니다. 이 서버는 REST API로 세 가지만 요청합니다:
//!
//! | 작업 | 요청 | 핸들 |
//! |------|------|------|
//! | 세션 생성 | `POST /account/sessions/email` | 관리자(API 키) |
//! | 내 계정 조회 | `GET /account` | 세션 |
//! | 현재 세션 삭제 | `DELETE /account/sessions/current` | 세션 |
//!
//! 핸들은 요청 하나를 위해 잠깐 만들었다가 버리는 가벼운 값입니다.
//! 실제 커넥션 풀은 내부의 `reqwest::Client`가 관리합니다.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::AppwriteConfig;
use crate::models::{Session, User};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";
const SESSION_HEADER: &str = "X-Appwrite-Session";

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Appwrite가 요청을 거부함 (잘못된 비밀번호, 만료된 세션 등)
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Identity backend unreachable: {0}")]
    Transport(String),

    #[error("Unexpected identity backend response: {0}")]
    Decode(String),
}

impl IdentityError {
    /// 백엔드가 직접 돌려준 메시지 (있을 때만)
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            IdentityError::Rejected { message, .. } if !message.trim().is_empty() => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// 인증 게이트웨이가 의존하는 인증 백엔드 기능
///
/// 운영에서는 `AppwriteClient`가 구현하고, 테스트에서는 가짜 구현으로 바꿔 끼웁니다.
#[async_trait]
pub trait IdentityBackend: Send + Sync {
    /// 이메일/비밀번호로 새 세션을 만듭니다. (관리자 권한)
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    /// 세션 주인의 계정 정보를 조회합니다.
    async fn get_account(&self, secret: &str) -> Result<User, IdentityError>;

    /// 세션을 서버 쪽에서 무효화합니다.
    async fn delete_current_session(&self, secret: &str) -> Result<(), IdentityError>;
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct AppwriteClient {
    http: Client,
    config: AppwriteConfig,
}

impl AppwriteClient {
    pub fn new(config: AppwriteConfig) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// 서비스 자격 증명(API 키)으로 동작하는 관리자 핸들
    pub fn admin(&self) -> AdminHandle<'_> {
        AdminHandle { client: self }
    }

    /// 특정 사용자 세션 범위로 동작하는 핸들
    pub fn session<'a>(&'a self, secret: &'a str) -> SessionHandle<'a> {
        SessionHandle {
            client: self,
            secret,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.config.endpoint, path))
            .header(PROJECT_HEADER, &self.config.project_id)
    }
}

pub struct AdminHandle<'a> {
    client: &'a AppwriteClient,
}

impl AdminHandle<'_> {
    pub async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let response = self
            .client
            .request(Method::POST, "/account/sessions/email")
            .header(KEY_HEADER, &self.client.config.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        read_json(response).await
    }
}

pub struct SessionHandle<'a> {
    client: &'a AppwriteClient,
    secret: &'a str,
}

impl SessionHandle<'_> {
    pub async fn get_account(&self) -> Result<User, IdentityError> {
        let response = self
            .scoped(Method::GET, "/account")
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        read_json(response).await
    }

    pub async fn delete_current_session(&self) -> Result<(), IdentityError> {
        let response = self
            .scoped(Method::DELETE, "/account/sessions/current")
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        ensure_success(response).await.map(|_| ())
    }

    fn scoped(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, path)
            .header(SESSION_HEADER, self.secret)
    }
}

#[async_trait]
impl IdentityBackend for AppwriteClient {
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        self.admin().create_email_password_session(email, password).await
    }

    async fn get_account(&self, secret: &str) -> Result<User, IdentityError> {
        self.session(secret).get_account().await
    }

    async fn delete_current_session(&self, secret: &str) -> Result<(), IdentityError> {
        self.session(secret).delete_current_session().await
    }
}

/// 2xx가 아니면 Appwrite 에러 본문(`{ "message", "code", "type" }`)에서 메시지를 꺼냅니다.
async fn ensure_success(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<AppwriteErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or_default();
    debug!("Appwrite responded {}: {}", status, message);

    Err(IdentityError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
    ensure_success(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| IdentityError::Decode(e.to_string()))
}

//! Shared fixtures: in-memory identity and generation backends plus a test server.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tubeprompt::models::{GenerationRequest, Session, User};
use tubeprompt::services::appwrite::{IdentityBackend, IdentityError};
use tubeprompt::services::cookie::SessionCookies;
use tubeprompt::services::gemini::{GenerationBackend, GenerationError, TextStream};
use tubeprompt::{router, AppState};

pub const PROJECT_ID: &str = "proj123";
pub const VALID_EMAIL: &str = "ada@example.com";
pub const VALID_PASSWORD: &str = "correct horse";
pub const VALID_SECRET: &str = "valid-secret";
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

pub fn session_cookie(secret: &str) -> (HeaderName, HeaderValue) {
    (
        COOKIE,
        HeaderValue::from_str(&format!("a_session_{}={}", PROJECT_ID, secret)).unwrap(),
    )
}

#[derive(Default)]
pub struct FakeIdentity {
    pub calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_delete: bool,
}

#[async_trait]
impl IdentityBackend for FakeIdentity {
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if email == VALID_EMAIL && password == VALID_PASSWORD {
            Ok(Session {
                secret: VALID_SECRET.to_string(),
                expire: Utc.with_ymd_and_hms(2026, 11, 18, 9, 30, 0).unwrap(),
            })
        } else {
            Err(IdentityError::Rejected {
                status: 401,
                message: "Invalid credentials. Please check the email and password.".to_string(),
            })
        }
    }

    async fn get_account(&self, secret: &str) -> Result<User, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if secret == VALID_SECRET {
            Ok(User {
                name: "Ada Lovelace".to_string(),
                email: VALID_EMAIL.to_string(),
            })
        } else {
            Err(IdentityError::Rejected {
                status: 401,
                message: "User (role: guests) missing scope (account)".to_string(),
            })
        }
    }

    async fn delete_current_session(&self, _secret: &str) -> Result<(), IdentityError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete {
            Err(IdentityError::Transport("connection reset by peer".to_string()))
        } else {
            Ok(())
        }
    }
}

pub enum Script {
    /// Answers `"<prompt> :: <video url>"` in three chunks, after `delay`.
    Echo { delay: Duration },
    /// Answers with these chunks verbatim.
    Reply(Vec<&'static str>),
    Fail(GenerationError),
}

pub struct FakeGenerator {
    pub script: Script,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn echo() -> Self {
        Self::with(Script::Echo {
            delay: Duration::ZERO,
        })
    }

    pub fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GenerationBackend for FakeGenerator {
    async fn stream_generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<TextStream, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Echo { delay } => {
                tokio::time::sleep(*delay).await;
                let chunks = vec![
                    Ok(request.prompt.clone()),
                    Ok(" :: ".to_string()),
                    Ok(request.video_url.clone()),
                ];
                Ok(Box::pin(futures::stream::iter(chunks)))
            }
            Script::Reply(chunks) => {
                let chunks: Vec<Result<String, GenerationError>> =
                    chunks.iter().map(|c| Ok(c.to_string())).collect();
                Ok(Box::pin(futures::stream::iter(chunks)))
            }
            Script::Fail(err) => Err(err.clone()),
        }
    }
}

pub struct TestContext {
    pub server: TestServer,
    pub identity: Arc<FakeIdentity>,
    pub generator: Arc<FakeGenerator>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with(FakeIdentity::default(), FakeGenerator::echo())
    }

    pub fn with(identity: FakeIdentity, generator: FakeGenerator) -> Self {
        let identity = Arc::new(identity);
        let generator = Arc::new(generator);
        let state = AppState::from_parts(
            identity.clone(),
            generator.clone(),
            SessionCookies::new(PROJECT_ID, true),
        );
        let server = TestServer::new(router(state)).expect("Failed to create test server");

        Self {
            server,
            identity,
            generator,
        }
    }

    pub fn generation_calls(&self) -> usize {
        self.generator.calls.load(Ordering::SeqCst)
    }
}

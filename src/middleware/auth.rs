use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::User;
use crate::services::appwrite::IdentityBackend;
use crate::services::cookie::SessionCookies;

pub const LOGIN_PATH: &str = "/login";

pub const MISSING_CREDENTIALS_MESSAGE: &str = "Email and password are required.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials.";

/// Result of guarding a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(User),
    /// Anonymous or rejected session; the caller must answer with a redirect and stop.
    RedirectRequired(String),
}

#[derive(Clone)]
pub struct AuthGateway {
    backend: Arc<dyn IdentityBackend>,
    cookies: SessionCookies,
}

impl AuthGateway {
    pub fn new(backend: Arc<dyn IdentityBackend>, cookies: SessionCookies) -> Self {
        Self { backend, cookies }
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    /// Never fails: a missing cookie or any backend error means anonymous.
    pub async fn get_current_user(&self, headers: &HeaderMap) -> Option<User> {
        let secret = self.cookies.read_secret(headers)?;

        match self.backend.get_account(&secret).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Session not accepted by identity backend: {}", e);
                None
            }
        }
    }

    pub async fn require_user(&self, headers: &HeaderMap) -> AuthOutcome {
        match self.get_current_user(headers).await {
            Some(user) => AuthOutcome::Authenticated(user),
            None => AuthOutcome::RedirectRequired(LOGIN_PATH.to_string()),
        }
    }

    /// Creates a session and returns the `Set-Cookie` value carrying it.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::MissingInput(MISSING_CREDENTIALS_MESSAGE.to_string()));
        }

        let session = self
            .backend
            .create_email_password_session(email, password)
            .await
            .map_err(|e| {
                warn!("Login rejected for {}: {}", email, e);
                AppError::InvalidCredentials(
                    e.backend_message()
                        .unwrap_or(INVALID_CREDENTIALS_MESSAGE)
                        .to_string(),
                )
            })?;

        // Without a secret there is nothing to put in the cookie (API key lacks sessions.write).
        if session.secret.is_empty() {
            warn!("Identity backend created a session without a secret for {}", email);
            return Err(AppError::InvalidCredentials(
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ));
        }

        info!("User {} logged in", email);

        Ok(self.cookies.build_set_cookie(&session.secret, session.expire))
    }

    /// Always returns the clear-cookie header; remote deletion is best effort.
    pub async fn logout(&self, headers: &HeaderMap) -> String {
        if let Some(secret) = self.cookies.read_secret(headers) {
            if let Err(e) = self.backend.delete_current_session(&secret).await {
                debug!("Ignoring session delete failure: {}", e);
            }
        }

        self.cookies.build_clear_cookie()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::services::appwrite::IdentityError;
    use async_trait::async_trait;
    use axum::http::{header::COOKIE, HeaderValue};
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeIdentity {
        calls: AtomicUsize,
        backend_down: bool,
    }

    #[async_trait]
    impl IdentityBackend for FakeIdentity {
        async fn create_email_password_session(
            &self,
            email: &str,
            password: &str,
        ) -> Result<Session, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.backend_down {
                return Err(IdentityError::Transport("connection refused".into()));
            }
            if email == "ada@example.com" && password == "pw" {
                Ok(Session {
                    secret: "good".into(),
                    expire: Utc.with_ymd_and_hms(2026, 11, 18, 9, 30, 0).unwrap(),
                })
            } else {
                Err(IdentityError::Rejected {
                    status: 401,
                    message: "Invalid credentials. Please check the email and password.".into(),
                })
            }
        }

        async fn get_account(&self, secret: &str) -> Result<User, IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.backend_down {
                return Err(IdentityError::Transport("connection refused".into()));
            }
            if secret == "good" {
                Ok(User {
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                })
            } else {
                Err(IdentityError::Rejected {
                    status: 401,
                    message: "User (role: guests) missing scope (account)".into(),
                })
            }
        }

        async fn delete_current_session(&self, _secret: &str) -> Result<(), IdentityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(IdentityError::Transport("connection reset".into()))
        }
    }

    fn gateway(fake: Arc<FakeIdentity>) -> AuthGateway {
        AuthGateway::new(fake, SessionCookies::new("proj", true))
    }

    fn with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&format!("a_session_proj={}", value)).unwrap());
        headers
    }

    #[tokio::test]
    async fn no_cookie_is_anonymous_without_backend_call() {
        let fake = Arc::new(FakeIdentity::default());
        let gateway = gateway(fake.clone());

        assert_eq!(gateway.get_current_user(&HeaderMap::new()).await, None);
        assert_eq!(
            gateway.require_user(&HeaderMap::new()).await,
            AuthOutcome::RedirectRequired("/login".into())
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rejected_cookie_looks_like_no_cookie() {
        let gateway = gateway(Arc::new(FakeIdentity::default()));

        assert_eq!(
            gateway.require_user(&with_cookie("expired")).await,
            gateway.require_user(&HeaderMap::new()).await
        );
    }

    #[tokio::test]
    async fn unreachable_backend_looks_like_no_cookie() {
        let fake = Arc::new(FakeIdentity {
            backend_down: true,
            ..Default::default()
        });
        let gateway = gateway(fake.clone());

        assert_eq!(gateway.get_current_user(&with_cookie("good")).await, None);
        assert_eq!(
            gateway.require_user(&with_cookie("good")).await,
            AuthOutcome::RedirectRequired("/login".into())
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn valid_cookie_authenticates() {
        let gateway = gateway(Arc::new(FakeIdentity::default()));

        match gateway.require_user(&with_cookie("good")).await {
            AuthOutcome::Authenticated(user) => assert_eq!(user.name, "Ada"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_requires_both_fields_before_calling_backend() {
        let fake = Arc::new(FakeIdentity::default());
        let gateway = gateway(fake.clone());

        assert!(matches!(gateway.login("", "pw").await, Err(AppError::MissingInput(_))));
        assert!(matches!(gateway.login("ada@example.com", "").await, Err(AppError::MissingInput(_))));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn login_sets_cookie_matching_backend_expiry() {
        let fake = Arc::new(FakeIdentity::default());
        let gateway = gateway(fake.clone());

        let set_cookie = gateway.login("ada@example.com", "pw").await.unwrap();

        assert!(set_cookie.starts_with("a_session_proj=good;"));
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("Expires=Wed, 18 Nov 2026 09:30:00 GMT"));
        // only the session is created; the profile is read on the next request
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bad_password_carries_backend_message() {
        let gateway = gateway(Arc::new(FakeIdentity::default()));

        let err = gateway.login("ada@example.com", "nope").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials(ref m) if m.starts_with("Invalid credentials. Please")));
    }

    #[tokio::test]
    async fn backend_outage_uses_generic_message() {
        let gateway = gateway(Arc::new(FakeIdentity {
            backend_down: true,
            ..Default::default()
        }));

        let err = gateway.login("ada@example.com", "pw").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials(ref m) if m == INVALID_CREDENTIALS_MESSAGE));
    }

    #[tokio::test]
    async fn logout_clears_cookie_even_when_delete_fails() {
        let fake = Arc::new(FakeIdentity::default());
        let gateway = gateway(fake.clone());

        let cookie = gateway.logout(&with_cookie("good")).await;

        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);

        // anonymous logout skips the backend entirely
        let cookie = gateway.logout(&HeaderMap::new()).await;
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }
}

//! Triage backend client with rate limiting and retry logic

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, TriageError};
use crate::models::{DeleteUsage, EmailCount, ScanRecord, User};

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub id: String,
    pub name: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

/// Session bootstrap response: the user record plus a bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(rename = "accesstoken")]
    pub access_token: String,
}

/// Outcome of a selective deletion request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

#[derive(Serialize)]
struct ScanRequest<'a> {
    user_no: i64,
    email_id: &'a str,
}

#[derive(Serialize)]
struct CountRequest {
    user_no: i64,
}

#[derive(Serialize)]
struct LinkRequest<'a> {
    user_no: i64,
    email_address: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    user_no: i64,
    email_id: &'a str,
    indices: &'a [u32],
}

#[derive(Deserialize)]
struct ScanResponse {
    result: Vec<ScanRecord>,
}

/// The deployed backend misspells the wrapper key as `Ressult`; the
/// alias lets a corrected backend parse with the same client.
#[derive(Deserialize)]
struct CountResponse {
    #[serde(rename = "Ressult", alias = "Result")]
    result: Vec<EmailCount>,
}

/// Trait defining triage backend operations for easier testing
#[async_trait]
pub trait TriageApi: Send + Sync {
    /// Create an account and obtain a session token
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse>;

    /// Sign in to an existing account
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse>;

    /// Link an external email address to the account
    async fn link_email(&self, user_no: i64, email_address: &str, password: &str) -> Result<()>;

    /// Inbox counts for every linked address
    async fn email_counts(&self, user_no: i64) -> Result<Vec<EmailCount>>;

    /// Run classification over the linked inbox; the full classified
    /// result is returned in one response, no pagination
    async fn classify_inbox(&self, user_no: i64, email_id: &str) -> Result<Vec<ScanRecord>>;

    /// Deletion-usage lookup; `None` means the account has no history
    async fn delete_usage(&self, user_no: i64) -> Result<Option<DeleteUsage>>;

    /// Delete the selected messages from the linked inbox
    async fn delete_messages(
        &self,
        user_no: i64,
        email_id: &str,
        indices: &[u32],
    ) -> Result<DeleteOutcome>;
}

/// Production client for the triage REST backend
///
/// This implementation includes:
/// - Semaphore-based bounding of in-flight requests
/// - Exponential backoff retry for transient failures
/// - Bearer token auth applied once a session exists
pub struct HttpTriageClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<String>>,
    limiter: Arc<Semaphore>,
    max_attempts: u32,
}

impl HttpTriageClient {
    /// Create a new client against `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Backend root, e.g. `http://127.0.0.1:8080/`
    /// * `timeout` - Per-request timeout
    /// * `max_concurrent` - Maximum in-flight requests
    /// * `max_attempts` - Total attempts per request (initial + retries)
    pub fn new(
        base_url: Url,
        timeout: Duration,
        max_concurrent: usize,
        max_attempts: u32,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TriageError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
            limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            max_attempts: max_attempts.max(1),
        })
    }

    /// Attach the bearer token used for authenticated endpoints.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("token lock poisoned") = Some(token.into());
    }

    /// Drop the bearer token (logout).
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TriageError::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    /// Issue a request, retrying transient failures with exponential
    /// backoff. Returns the raw response body on success.
    async fn request_text(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<String> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|e| TriageError::Unknown(format!("Failed to acquire permit: {}", e)))?;

        let url = self.endpoint(path)?;
        let mut attempts = 0;
        let mut delay = Duration::from_millis(200);

        loop {
            attempts += 1;

            let mut request = self.http.request(method.clone(), url.clone());
            if let Some(token) = self.token.read().expect("token lock poisoned").as_deref() {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let error = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(TriageError::from);
                    }
                    let message = response.text().await.unwrap_or_default();
                    TriageError::from_status(status.as_u16(), message)
                }
                Err(e) => TriageError::from(e),
            };

            if error.is_transient() && attempts < self.max_attempts {
                debug!(
                    "Request {} {} failed (attempt {}/{}): {}, retrying in {:?}",
                    method, path, attempts, self.max_attempts, error, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                continue;
            }

            warn!("Request {} {} failed: {}", method, path, error);
            return Err(error);
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let text = self.request_text(Method::POST, path, Some(body)).await?;
        serde_json::from_str(&text)
            .map_err(|e| TriageError::InvalidPayload(format!("{} response: {}", path, e)))
    }
}

#[async_trait]
impl TriageApi for HttpTriageClient {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .post_json("auth/register", serde_json::to_value(request)?)
            .await?;
        self.set_token(auth.access_token.clone());
        Ok(auth)
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .post_json("auth/login", serde_json::to_value(request)?)
            .await?;
        self.set_token(auth.access_token.clone());
        Ok(auth)
    }

    async fn link_email(&self, user_no: i64, email_address: &str, password: &str) -> Result<()> {
        let body = serde_json::to_value(LinkRequest {
            user_no,
            email_address,
            password,
        })?;
        self.request_text(Method::POST, "email-link", Some(body))
            .await?;
        Ok(())
    }

    async fn email_counts(&self, user_no: i64) -> Result<Vec<EmailCount>> {
        let body = serde_json::to_value(CountRequest { user_no })?;
        let response: CountResponse = self.post_json("count", body).await?;
        Ok(response.result)
    }

    async fn classify_inbox(&self, user_no: i64, email_id: &str) -> Result<Vec<ScanRecord>> {
        debug!("Requesting classification for user {} / {}", user_no, email_id);
        let body = serde_json::to_value(ScanRequest { user_no, email_id })?;
        let response: ScanResponse = self.post_json("predict", body).await?;
        Ok(response.result)
    }

    async fn delete_usage(&self, user_no: i64) -> Result<Option<DeleteUsage>> {
        let path = format!("delete/num/{}", user_no);
        let text = self.request_text(Method::GET, &path, None).await?;

        // A fresh account gets an empty or null body, not a record.
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<DeleteUsage>>(&text)
            .map_err(|e| TriageError::InvalidPayload(format!("delete/num response: {}", e)))
    }

    async fn delete_messages(
        &self,
        user_no: i64,
        email_id: &str,
        indices: &[u32],
    ) -> Result<DeleteOutcome> {
        let body = serde_json::to_value(DeleteRequest {
            user_no,
            email_id,
            indices,
        })?;
        self.post_json("delete", body).await
    }
}

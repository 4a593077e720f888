use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use chirp_types::api::{
    AuthResponse, CreatePostRequest, ErrorBody, FeedResponse, HealthResponse, LoginRequest,
    PostResponse, RegisterRequest, VerifyResponse,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a `{success: false, message}` envelope.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Thin typed wrapper over the JSON API. Holds the base URL and, once
/// logged in, the bearer token attached to every request.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        self.post_json(
            "/api/auth/register",
            &RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.post_json(
            "/api/auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ClientError> {
        self.get_json("/api/auth/verify").await
    }

    pub async fn create_post(&self, content: &str) -> Result<PostResponse, ClientError> {
        self.post_json(
            "/api/posts/create",
            &CreatePostRequest {
                content: content.to_string(),
            },
        )
        .await
    }

    pub async fn all_posts(&self) -> Result<FeedResponse, ClientError> {
        self.get_json("/api/posts/all").await
    }

    pub async fn posts_by_user(&self, user_id: i64) -> Result<FeedResponse, ClientError> {
        self.get_json(&format!("/api/posts/user/{}", user_id)).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("/api/health").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let mut req = self.http.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Self::decode(req.send().await?).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Self::decode(req.send().await?).await
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let message = resp
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| format!("Request failed with status {}", status));
        debug!("API error {}: {}", status, message);

        Err(ClientError::Api { status, message })
    }
}

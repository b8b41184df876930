//! HTTP client for the hospital-management API gateway.
//!
//! Only the two endpoints the session core depends on live here: the
//! token endpoint and the current-identity endpoint. The bearer token is
//! read from the shared [`TokenCell`] at request time, so whatever session
//! state says right now is what goes on the wire.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::auth::token::TokenCell;
use crate::models::User;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow gateway responses while failing fast enough for
/// a responsive login screen.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token endpoint, form-encoded credentials in, access token out
const LOGIN_PATH: &str = "/api/login/access-token";

/// Current-identity endpoint, requires a bearer token
const CURRENT_USER_PATH: &str = "/api/users/me";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// The two gateway operations the session coordinator needs. The session
/// is written against this trait so tests can stand in a fake gateway.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for an access token.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    /// Fetch the identity behind the current token.
    async fn current_user(&self) -> Result<User>;
}

/// API client for the gateway.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: TokenCell,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: TokenCell) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if a response is successful, mapping the status and body
    /// through `map` if not. All non-2xx handling funnels through here.
    async fn check_response_with(
        response: reqwest::Response,
        map: fn(reqwest::StatusCode, &str) -> ApiError,
    ) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(map(status, &body).into())
        }
    }

    /// Check if a response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        Self::check_response_with(response, ApiError::from_status).await
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response_with(response, ApiError::login_rejection).await?;

        let token: AccessTokenResponse = response
            .json()
            .await
            .context("Failed to parse access token response")?;
        Ok(token.access_token)
    }

    async fn current_user(&self) -> Result<User> {
        let mut request = self.client.get(self.url(CURRENT_USER_PATH));
        if let Some(token) = self.token.get() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .context("Failed to send current-user request")?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .context("Failed to parse current-user response")
    }
}

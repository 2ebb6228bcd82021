//! HTTP client for the remote auth API.
//!
//! One method per endpoint. Every method returns the raw `ApiError` on
//! failure; turning those into user-facing messages is the session layer's job.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{SignupRequest, User};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const ME_PATH: &str = "/auth/me";
const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";
const GOOGLE_PATH: &str = "/auth/google";
const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
const SIGNUP_PATH: &str = "/auth/signup";
const USERS_PATH: &str = "/auth/users";

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleAuthResponse {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ResetRequestBody<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordBody<'a> {
    password: &'a str,
}

/// API client for the auth backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given backend. A trailing `/` on the base URL
    /// is dropped so endpoint paths can be appended directly.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::InvalidUrl("backend URL is empty".to_string()));
        }
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header(header::ACCEPT, "application/json");
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        debug!(path, "Sending request");
        let response = builder.send().await?;
        Self::check_response(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    // ===== Session Endpoints =====

    /// Resolve the identity behind a bearer token
    pub async fn fetch_me(&self, token: &str) -> Result<User, ApiError> {
        let response = self
            .send(self.request(Method::GET, ME_PATH, Some(token)), ME_PATH)
            .await?;
        Self::parse(response, ME_PATH).await
    }

    /// Exchange email and password for a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let builder = self
            .request(Method::POST, LOGIN_PATH, None)
            .json(&LoginBody { email, password });
        let response = self.send(builder, LOGIN_PATH).await?;
        let body: LoginResponse = Self::parse(response, LOGIN_PATH).await?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("login response did not include a token".to_string()))
    }

    pub async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, LOGOUT_PATH, token), LOGOUT_PATH)
            .await?;
        Ok(())
    }

    /// Ask the backend for the Google authorization URL to send the user to
    pub async fn google_auth_url(&self, token: Option<&str>) -> Result<Url, ApiError> {
        let response = self
            .send(self.request(Method::GET, GOOGLE_PATH, token), GOOGLE_PATH)
            .await?;
        let body: GoogleAuthResponse = Self::parse(response, GOOGLE_PATH).await?;

        let url = body
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("No authorization URL received".to_string()))?;
        Url::parse(url.trim()).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", url, e)))
    }

    // ===== Account Endpoints =====

    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, RESET_PASSWORD_PATH, None)
            .json(&ResetRequestBody { email });
        self.send(builder, RESET_PASSWORD_PATH).await?;
        Ok(())
    }

    /// Set a new password. The reset token is a one-time credential from the
    /// reset email, unrelated to the session token.
    pub async fn update_password(&self, password: &str, reset_token: &str) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, RESET_PASSWORD_PATH, Some(reset_token))
            .json(&PasswordBody { password });
        self.send(builder, RESET_PASSWORD_PATH).await?;
        Ok(())
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, SIGNUP_PATH, None).json(request);
        self.send(builder, SIGNUP_PATH).await?;
        Ok(())
    }

    pub async fn fetch_users(&self, token: Option<&str>) -> Result<Vec<User>, ApiError> {
        let response = self
            .send(self.request(Method::GET, USERS_PATH, token), USERS_PATH)
            .await?;
        let users: Vec<User> = Self::parse(response, USERS_PATH).await?;
        debug!(count = users.len(), "Users fetched");
        Ok(users)
    }
}

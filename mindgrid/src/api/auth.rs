//! Authentication endpoints.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::models::{Credentials, UserProfile};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
}

#[derive(Serialize)]
struct GoogleExchange<'a> {
    code: &'a str,
}

/// The slice of the backend the session context needs.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError>;

    /// Exchange a Google authorization code for a bearer token.
    async fn login_with_google(&self, code: &str) -> Result<String, ApiError>;

    /// Fetch the profile the token belongs to.
    async fn me(&self, token: &str) -> Result<UserProfile, ApiError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let req = self.request(Method::POST, "/auth/login").json(credentials);
        let resp: TokenResponse = self.send_json(req).await?;
        Ok(resp.access_token)
    }

    async fn login_with_google(&self, code: &str) -> Result<String, ApiError> {
        let req = self
            .request(Method::POST, "/auth/oauth/google")
            .json(&GoogleExchange { code });
        let resp: TokenResponse = self.send_json(req).await?;
        Ok(resp.access_token)
    }

    async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
        // Token is passed explicitly: it is not yet the client's own during login.
        let req = self
            .clone()
            .with_token(Some(token.to_string()))
            .request(Method::GET, "/auth/me");
        let resp: MeResponse = self.send_json(req).await?;
        Ok(resp.user)
    }
}

impl ApiClient {
    /// Create an account. Does not log in.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<String, ApiError> {
        let req = self.request(Method::POST, "/auth/signup").json(&SignupRequest {
            email,
            password,
            full_name,
        });
        let resp: MessageResponse = self.send_json(req).await?;
        Ok(resp.message)
    }
}

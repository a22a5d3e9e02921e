//! Authentication endpoints
//!
//! Login exchanges an email and password for an opaque bearer token. The
//! token is never inspected; it is only stored and sent back.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiClient, ApiError, Query};

/// The signed-in user as reported by the auth service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub roles: Vec<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
}

impl User {
    /// Best display name available
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for login and token checks
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Signs in with email and password
    ///
    /// No token is required; the returned `access_token` is what later
    /// requests should carry.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.api.post_anonymous("auth/login", &request).await?;
        info!(user = %response.user.display_name(), "logged in");
        Ok(response)
    }

    /// Asks the server whether the current token is still accepted
    ///
    /// A 401 is reported as an invalid token rather than an error.
    pub async fn validate_token(&self) -> Result<TokenValidation, ApiError> {
        match self.api.get("auth/validate-token", &Query::new()).await {
            Ok(validation) => Ok(validation),
            Err(err) if err.is_unauthorized() => {
                debug!(error = %err, "token rejected");
                Ok(TokenValidation {
                    valid: false,
                    user: None,
                    message: Some(err.to_string()),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Profile of the signed-in user
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.api.get("auth/profile", &Query::new()).await
    }
}

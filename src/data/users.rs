//! Hospital users API client
//!
//! Hospital users are the accounts that sign in to the console. New accounts
//! start in `pending_password_set` until the invite email is followed. None
//! of these responses are cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use super::{push_param, ApiClient, ApiError, Query};

/// Account state of a hospital user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    PendingPasswordSet,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::PendingPasswordSet => "pending_password_set",
        }
    }

    /// Parses a status name, ignoring case
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            "pending_password_set" => Some(UserStatus::PendingPasswordSet),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub status: UserStatus,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_by_email: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalUsersResponse {
    #[serde(default)]
    pub message: String,
    pub users: Vec<HospitalUser>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalUserResponse {
    #[serde(default)]
    pub message: String,
    pub user: HospitalUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateHospitalUserRequest {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHospitalUserResponse {
    #[serde(default)]
    pub message: String,
    pub user: HospitalUser,
    #[serde(default)]
    pub email_sent: bool,
}

/// Short form of a user returned by a status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatusChange {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub status: UserStatus,
    #[serde(default)]
    pub updated_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatusResponse {
    #[serde(default)]
    pub message: String,
    pub user: UserStatusChange,
}

#[derive(Debug, Clone, Serialize)]
struct StatusRequest {
    status: UserStatus,
}

#[derive(Debug, Clone, Serialize)]
struct BulkStatusRequest<'a> {
    user_ids: &'a [String],
    status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkStatusSuccess {
    pub user_id: String,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkStatusFailure {
    pub user_id: String,
    pub error: String,
}

/// Outcome of a bulk status change; individual users may fail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStatusResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub successful_updates: Vec<BulkStatusSuccess>,
    #[serde(default)]
    pub failed_updates: Vec<BulkStatusFailure>,
    #[serde(default)]
    pub total_processed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResendInviteResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub email_sent: bool,
}

/// Filters for the user listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HospitalUserFilters {
    pub status: Option<UserStatus>,
    pub role: Option<String>,
}

impl HospitalUserFilters {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "status", self.status);
        push_param(&mut query, "role", self.role.as_deref());
        query
    }
}

/// Client for the hospital user endpoints
#[derive(Debug, Clone)]
pub struct HospitalUsersClient {
    api: ApiClient,
}

impl HospitalUsersClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &HospitalUserFilters) -> Result<HospitalUsersResponse, ApiError> {
        self.api.get("hospital-users", &filters.to_query()).await
    }

    pub async fn get(&self, user_id: &str) -> Result<HospitalUserResponse, ApiError> {
        self.api
            .get(&format!("hospital-users/{}", user_id), &Query::new())
            .await
    }

    /// Creates an account and sends the password setup email
    pub async fn create(
        &self,
        request: &CreateHospitalUserRequest,
    ) -> Result<CreateHospitalUserResponse, ApiError> {
        let response: CreateHospitalUserResponse =
            self.api.post("hospital-users", request).await?;
        info!(
            user_id = %response.user.user_id,
            email_sent = response.email_sent,
            "hospital user created"
        );
        Ok(response)
    }

    pub async fn set_status(
        &self,
        user_id: &str,
        status: UserStatus,
    ) -> Result<UserStatusResponse, ApiError> {
        let response = self
            .api
            .put(
                &format!("hospital-users/{}/status", user_id),
                &StatusRequest { status },
            )
            .await?;
        info!(user_id, %status, "hospital user status changed");
        Ok(response)
    }

    pub async fn bulk_set_status(
        &self,
        user_ids: &[String],
        status: UserStatus,
    ) -> Result<BulkStatusResponse, ApiError> {
        let request = BulkStatusRequest { user_ids, status };
        let response: BulkStatusResponse = self
            .api
            .put("hospital-users/bulk-update-status", &request)
            .await?;
        info!(
            succeeded = response.successful_updates.len(),
            failed = response.failed_updates.len(),
            "bulk user status change"
        );
        Ok(response)
    }

    pub async fn resend_invite(&self, user_id: &str) -> Result<ResendInviteResponse, ApiError> {
        let response: ResendInviteResponse = self
            .api
            .post_empty(&format!("hospital-users/{}/resend-password-setup", user_id))
            .await?;
        info!(user_id, email_sent = response.email_sent, "password setup resent");
        Ok(response)
    }
}

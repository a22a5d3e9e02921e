//! Staff API client
//!
//! Staff listings are not cached. The department name list offered by the
//! staff form is the same one the doctor form uses, so it shares that cache
//! entry and is dropped whenever departments change.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::doctors::DepartmentNamesResponse;
use super::{fetch_cached, push_param, ApiClient, ApiError, FetchMode, Pagination, Query, RecordStatus};
use crate::cache::{CacheKey, Resource, ResponseCache};

/// A non-doctor staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub staff_id: String,
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffResponse {
    #[serde(default)]
    pub message: String,
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleStaffResponse {
    #[serde(default)]
    pub message: String,
    pub staff: StaffMember,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateStaffRequest {
    pub staff_name: String,
    pub contact_number: String,
    pub email: String,
    pub department_name: String,
}

/// Partial staff update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateStaffRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteStaffResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub staff_id: String,
}

/// Filters for the staff listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffFilters {
    pub department_name: Option<String>,
    pub status: Option<RecordStatus>,
}

impl StaffFilters {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "department_name", self.department_name.as_deref());
        push_param(&mut query, "status", self.status);
        query
    }
}

/// Client for the staff endpoints
#[derive(Debug, Clone)]
pub struct StaffClient {
    api: ApiClient,
    cache: ResponseCache,
}

impl StaffClient {
    pub fn new(api: ApiClient, cache: ResponseCache) -> Self {
        Self { api, cache }
    }

    pub async fn list(&self, filters: &StaffFilters) -> Result<StaffResponse, ApiError> {
        self.api.get("staff", &filters.to_query()).await
    }

    pub async fn get(&self, staff_id: &str) -> Result<SingleStaffResponse, ApiError> {
        self.api
            .get(&format!("staff/{}", staff_id), &Query::new())
            .await
    }

    pub async fn create(&self, request: &CreateStaffRequest) -> Result<SingleStaffResponse, ApiError> {
        let response: SingleStaffResponse = self.api.post("staff", request).await?;
        info!(staff_id = %response.staff.staff_id, "staff member created");
        Ok(response)
    }

    pub async fn update(
        &self,
        staff_id: &str,
        request: &UpdateStaffRequest,
    ) -> Result<SingleStaffResponse, ApiError> {
        let response = self
            .api
            .put(&format!("staff/{}", staff_id), request)
            .await?;
        info!(staff_id, "staff member updated");
        Ok(response)
    }

    pub async fn delete(&self, staff_id: &str) -> Result<DeleteStaffResponse, ApiError> {
        let response = self.api.delete(&format!("staff/{}", staff_id)).await?;
        info!(staff_id, "staff member deleted");
        Ok(response)
    }

    /// Department names offered in the staff form, cached for ten minutes
    pub async fn available_departments(
        &self,
        mode: FetchMode,
    ) -> Result<DepartmentNamesResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::DoctorDepartments),
            "doctors/available-departments",
            &Query::new(),
            mode,
            Resource::DoctorDepartments.default_ttl(),
        )
        .await
    }
}

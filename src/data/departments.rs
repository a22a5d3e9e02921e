//! Departments API client
//!
//! Paginated department listings are cached for five minutes per query. Any
//! successful create, update or delete drops every cached listing and the
//! department names offered by the doctor form.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::http::query_key;
use super::{fetch_cached, push_param, ApiClient, ApiError, FetchMode, Pagination, Query, RecordStatus};
use crate::cache::{CacheKey, Resource, ResponseCache};

/// Department category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartmentType {
    /// Direct patient care
    #[serde(rename = "CLINICAL")]
    Clinical,
    /// Administrative and support
    #[serde(rename = "NON-CLINICAL")]
    NonClinical,
    /// Essential services
    #[serde(rename = "SUPPORTIVE")]
    Supportive,
    /// Additional services
    #[serde(rename = "AUXILIARY")]
    Auxiliary,
}

/// An entry in a department's edit log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditHistoryEntry {
    pub action: String,
    pub changes: String,
    pub edited_at: String,
    pub edited_by: String,
    pub edited_by_email: String,
    pub edited_by_name: String,
}

/// A hospital department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: String,
    pub department_name: String,
    pub department_type: DepartmentType,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub point_of_contact: String,
    #[serde(default)]
    pub phone_no: String,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub hospital_name: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edit_history: Vec<EditHistoryEntry>,
}

/// One page of departments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentsResponse {
    #[serde(default)]
    pub message: String,
    pub departments: Vec<Department>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleDepartmentResponse {
    #[serde(default)]
    pub message: String,
    pub department: Department,
}

/// A staff member created together with a department
#[derive(Debug, Clone, Serialize)]
pub struct StaffMember {
    pub name: String,
    pub designation: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateDepartmentRequest {
    pub department_type: DepartmentType,
    pub department_id: String,
    pub department_name: String,
    pub point_of_contact: String,
    pub phone_no: String,
    pub email_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub staff_members: Vec<StaffMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartmentResponse {
    #[serde(default)]
    pub message: String,
    pub department: Department,
    #[serde(default)]
    pub staff_created: Option<u32>,
}

/// Partial update of a department; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDepartmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_type: Option<DepartmentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_of_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDepartmentResponse {
    #[serde(default)]
    pub message: String,
}

/// Paging and visibility options for the department listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepartmentFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub include_inactive: Option<bool>,
}

impl DepartmentFilters {
    fn to_query(self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "page", self.page);
        push_param(&mut query, "limit", self.limit);
        push_param(&mut query, "include_inactive", self.include_inactive);
        query
    }
}

/// Client for the departments endpoints
#[derive(Debug, Clone)]
pub struct DepartmentsClient {
    api: ApiClient,
    cache: ResponseCache,
}

impl DepartmentsClient {
    pub fn new(api: ApiClient, cache: ResponseCache) -> Self {
        Self { api, cache }
    }

    /// Lists departments, cached per distinct query for five minutes
    pub async fn list(
        &self,
        filters: DepartmentFilters,
        mode: FetchMode,
    ) -> Result<DepartmentsResponse, ApiError> {
        let query = filters.to_query();
        let key = CacheKey::with_variant(Resource::Departments, query_key(&query)?);
        fetch_cached(
            &self.api,
            &self.cache,
            key,
            "departments",
            &query,
            mode,
            Resource::Departments.default_ttl(),
        )
        .await
    }

    pub async fn get(&self, department_id: &str) -> Result<SingleDepartmentResponse, ApiError> {
        self.api
            .get(&format!("departments/{}", department_id), &Query::new())
            .await
    }

    pub async fn create(
        &self,
        request: &CreateDepartmentRequest,
    ) -> Result<CreateDepartmentResponse, ApiError> {
        let response: CreateDepartmentResponse = self.api.post("departments", request).await?;
        self.invalidate();
        info!(department_id = %response.department.department_id, "department created");
        Ok(response)
    }

    pub async fn update(
        &self,
        department_id: &str,
        request: &UpdateDepartmentRequest,
    ) -> Result<SingleDepartmentResponse, ApiError> {
        let response = self
            .api
            .put(&format!("departments/{}", department_id), request)
            .await?;
        self.invalidate();
        info!(department_id, "department updated");
        Ok(response)
    }

    pub async fn delete(&self, department_id: &str) -> Result<DeleteDepartmentResponse, ApiError> {
        let response = self
            .api
            .delete(&format!("departments/{}", department_id))
            .await?;
        self.invalidate();
        info!(department_id, "department deleted");
        Ok(response)
    }

    /// Drops cached listings and the doctor form's department names
    pub fn invalidate(&self) {
        self.cache.invalidate(Resource::Departments);
        self.cache.invalidate(Resource::DoctorDepartments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(server: &MockServer) -> (DepartmentsClient, ResponseCache) {
        let config = Config::default().with_api_url(server.uri());
        let api = ApiClient::new(&config, Some("test-token".to_string())).unwrap();
        let cache = ResponseCache::with_clock(ManualClock::default());
        (DepartmentsClient::new(api, cache.clone()), cache)
    }

    fn department_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "department_id": id,
            "department_name": name,
            "department_type": "NON-CLINICAL",
            "point_of_contact": "A. Menon",
            "phone_no": "9800000000",
            "email_id": "billing@example.com",
            "status": "active"
        })
    }

    fn list_json() -> serde_json::Value {
        json!({
            "message": "ok",
            "departments": [department_json("DEP1", "Billing")],
            "pagination": { "current_page": 1, "per_page": 10, "total_items": 1, "total_pages": 1 }
        })
    }

    #[test]
    fn test_department_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&DepartmentType::NonClinical).unwrap(),
            "\"NON-CLINICAL\""
        );
        let parsed: DepartmentType = serde_json::from_str("\"AUXILIARY\"").unwrap();
        assert_eq!(parsed, DepartmentType::Auxiliary);
    }

    #[test]
    fn test_filters_to_query_order() {
        let filters = DepartmentFilters {
            page: Some(2),
            limit: Some(25),
            include_inactive: Some(true),
        };
        assert_eq!(
            query_key(&filters.to_query()).unwrap(),
            "page=2&limit=25&include_inactive=true"
        );
    }

    #[tokio::test]
    async fn test_list_is_cached_per_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/departments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json()))
            .expect(2)
            .mount(&server)
            .await;

        let (client, cache) = create_test_client(&server);
        let page_one = DepartmentFilters {
            page: Some(1),
            ..Default::default()
        };
        let page_two = DepartmentFilters {
            page: Some(2),
            ..Default::default()
        };

        client.list(page_one, FetchMode::Cached).await.unwrap();
        client.list(page_one, FetchMode::Cached).await.unwrap();
        client.list(page_two, FetchMode::Cached).await.unwrap();

        assert!(cache.contains_entry("departments:page=1"));
        assert!(cache.contains_entry("departments:page=2"));
    }

    #[tokio::test]
    async fn test_update_then_list_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/departments"))
            .and(query_param("include_inactive", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_json()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/departments/DEP1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "updated",
                "department": department_json("DEP1", "Billing & Accounts")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache) = create_test_client(&server);
        let all = DepartmentFilters {
            include_inactive: Some(true),
            ..Default::default()
        };
        client.list(all, FetchMode::Cached).await.unwrap();
        cache.set_cached(
            &CacheKey::new(Resource::DoctorDepartments),
            &json!({ "department_names": ["Billing"] }),
            Resource::DoctorDepartments.default_ttl(),
        );

        let request = UpdateDepartmentRequest {
            department_name: Some("Billing & Accounts".to_string()),
            ..Default::default()
        };
        let updated = client.update("DEP1", &request).await.unwrap();
        assert_eq!(updated.department.department_name, "Billing & Accounts");

        assert!(cache.is_empty());
        client.list(all, FetchMode::Cached).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_cache() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/departments/DEP1"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": "Department has active staff"
            })))
            .mount(&server)
            .await;

        let (client, cache) = create_test_client(&server);
        cache.set("departments:page=1", &list_json(), Resource::Departments.default_ttl());

        let err = client.delete("DEP1").await.unwrap_err();

        assert_eq!(err.status(), Some(409));
        assert!(cache.contains_entry("departments:page=1"));
    }
}

//! Doctors API client
//!
//! CRUD over `/doctors` plus the specialty and department name lists offered
//! when registering a doctor. The two name lists are reference data and are
//! cached for ten minutes.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{fetch_cached, push_param, ApiClient, ApiError, FetchMode, Pagination, Query, RecordStatus};
use crate::cache::{CacheKey, Resource, ResponseCache};

/// A doctor registered at the hospital
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub doctor_id: String,
    pub doctor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub specialty_name: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub experience_years: Option<u32>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
}

/// One page of doctors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorsResponse {
    #[serde(default)]
    pub message: String,
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// A single doctor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorResponse {
    #[serde(default)]
    pub message: String,
    pub doctor: Doctor,
}

/// Body for registering a doctor
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDoctorRequest {
    pub doctor_name: String,
    pub specialty_name: String,
    pub department_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// Partial update of a doctor; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDoctorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDoctorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub doctor_id: String,
}

/// Specialty names a doctor can be registered under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtyNamesResponse {
    #[serde(default)]
    pub message: String,
    pub specialty_names: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Department names a doctor can be registered under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentNamesResponse {
    #[serde(default)]
    pub message: String,
    pub department_names: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Filters for the doctor listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorFilters {
    pub specialty_name: Option<String>,
    pub department_name: Option<String>,
    pub status: Option<RecordStatus>,
}

impl DoctorFilters {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "specialty_name", self.specialty_name.as_deref());
        push_param(&mut query, "department_name", self.department_name.as_deref());
        push_param(&mut query, "status", self.status);
        query
    }
}

/// Client for the doctors endpoints
#[derive(Debug, Clone)]
pub struct DoctorsClient {
    api: ApiClient,
    cache: ResponseCache,
}

impl DoctorsClient {
    pub fn new(api: ApiClient, cache: ResponseCache) -> Self {
        Self { api, cache }
    }

    /// Lists doctors matching `filters`
    pub async fn list(&self, filters: &DoctorFilters) -> Result<DoctorsResponse, ApiError> {
        self.api.get("doctors", &filters.to_query()).await
    }

    pub async fn by_status(&self, status: RecordStatus) -> Result<DoctorsResponse, ApiError> {
        self.list(&DoctorFilters {
            status: Some(status),
            ..Default::default()
        })
        .await
    }

    pub async fn get(&self, doctor_id: &str) -> Result<DoctorResponse, ApiError> {
        self.api.get(&format!("doctors/{}", doctor_id), &Query::new()).await
    }

    pub async fn create(&self, request: &CreateDoctorRequest) -> Result<DoctorResponse, ApiError> {
        let response: DoctorResponse = self.api.post("doctors", request).await?;
        info!(doctor_id = %response.doctor.doctor_id, "doctor created");
        Ok(response)
    }

    pub async fn update(
        &self,
        doctor_id: &str,
        request: &UpdateDoctorRequest,
    ) -> Result<DoctorResponse, ApiError> {
        let response = self.api.put(&format!("doctors/{}", doctor_id), request).await?;
        info!(doctor_id, "doctor updated");
        Ok(response)
    }

    pub async fn delete(&self, doctor_id: &str) -> Result<DeleteDoctorResponse, ApiError> {
        let response = self.api.delete(&format!("doctors/{}", doctor_id)).await?;
        info!(doctor_id, "doctor deleted");
        Ok(response)
    }

    /// Specialty names offered in the doctor form, cached for ten minutes
    pub async fn available_specialties(
        &self,
        mode: FetchMode,
    ) -> Result<SpecialtyNamesResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::DoctorSpecialties),
            "doctors/available-specialties",
            &Query::new(),
            mode,
            Resource::DoctorSpecialties.default_ttl(),
        )
        .await
    }

    /// Department names offered in the doctor form, cached for ten minutes
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(server: &MockServer) -> (DoctorsClient, ResponseCache, ManualClock) {
        let config = Config::default().with_api_url(server.uri());
        let api = ApiClient::new(&config, Some("test-token".to_string())).unwrap();
        let clock = ManualClock::default();
        let cache = ResponseCache::with_clock(clock.clone());
        (DoctorsClient::new(api, cache.clone()), cache, clock)
    }

    fn doctor_json(id: &str, name: &str) -> serde_json::Value {
        json!({
            "doctor_id": id,
            "doctor_name": name,
            "specialty_name": "Cardiology",
            "department_name": "Cardiac Sciences",
            "status": "active",
            "IsActive": 1
        })
    }

    #[test]
    fn test_filters_to_query() {
        let filters = DoctorFilters {
            specialty_name: Some("Cardiology".to_string()),
            department_name: None,
            status: Some(RecordStatus::Inactive),
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("specialty_name", "Cardiology".to_string()),
                ("status", "inactive".to_string())
            ]
        );
        assert!(DoctorFilters::default().to_query().is_empty());
    }

    #[test]
    fn test_doctor_ignores_unknown_fields() {
        let doctor: Doctor = serde_json::from_value(doctor_json("D1", "Dr. Rao")).unwrap();
        assert_eq!(doctor.doctor_id, "D1");
        assert_eq!(doctor.status, Some(RecordStatus::Active));
        assert!(doctor.experience_years.is_none());
    }

    #[tokio::test]
    async fn test_list_with_status_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doctors"))
            .and(query_param("status", "active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "doctors": [doctor_json("D1", "Dr. Rao")],
                "pagination": { "current_page": 1, "total_items": 1, "total_pages": 1 }
            })))
            .mount(&server)
            .await;

        let (client, _cache, _clock) = create_test_client(&server);
        let response = client.by_status(RecordStatus::Active).await.unwrap();

        assert_eq!(response.doctors.len(), 1);
        assert_eq!(response.doctors[0].doctor_name, "Dr. Rao");
        assert_eq!(response.pagination.total_items, 1);
    }

    #[tokio::test]
    async fn test_available_specialties_cached_for_ten_minutes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doctors/available-specialties"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "specialty_names": ["Cardiology", "Neurology"],
                "count": 2
            })))
            .expect(2)
            .mount(&server)
            .await;

        let (client, _cache, clock) = create_test_client(&server);

        let first = client.available_specialties(FetchMode::Cached).await.unwrap();
        let second = client.available_specialties(FetchMode::Cached).await.unwrap();
        assert_eq!(first, second);

        clock.advance_millis(600_000);
        let third = client.available_specialties(FetchMode::Cached).await.unwrap();
        assert_eq!(third.specialty_names, vec!["Cardiology", "Neurology"]);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doctors/available-departments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "department_names": ["ICU"],
                "count": 1
            })))
            .expect(2)
            .mount(&server)
            .await;

        let (client, cache, _clock) = create_test_client(&server);

        client.available_departments(FetchMode::Cached).await.unwrap();
        client.available_departments(FetchMode::Refresh).await.unwrap();

        assert!(cache.contains_entry("doctor-departments"));
    }

    #[tokio::test]
    async fn test_create_sends_only_set_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/doctors"))
            .and(body_json(json!({
                "doctor_name": "Dr. Rao",
                "specialty_name": "Cardiology",
                "department_name": "Cardiac Sciences",
                "experience_years": 12
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "Doctor created",
                "doctor": doctor_json("D9", "Dr. Rao")
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _cache, _clock) = create_test_client(&server);
        let request = CreateDoctorRequest {
            doctor_name: "Dr. Rao".to_string(),
            specialty_name: "Cardiology".to_string(),
            department_name: "Cardiac Sciences".to_string(),
            experience_years: Some(12),
            ..Default::default()
        };

        let response = client.create(&request).await.unwrap();
        assert_eq!(response.doctor.doctor_id, "D9");
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doctors/available-specialties"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "down" })))
            .mount(&server)
            .await;

        let (client, cache, _clock) = create_test_client(&server);
        let err = client
            .available_specialties(FetchMode::Cached)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "down");
        assert!(cache.is_empty());
    }
}

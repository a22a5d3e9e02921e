//! Specialty affiliations API client
//!
//! The specialty catalogue is cached for ten minutes. The hospital's own
//! affiliation record and its affiliated specialty names are cached for five
//! minutes and dropped after every successful change to the affiliation.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{fetch_cached, ApiClient, ApiError, FetchMode, Query};
use crate::cache::{CacheKey, Resource, ResponseCache};

/// A specialty from the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub specialty_id: String,
    pub specialty_name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub specialty_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A specialty the hospital is affiliated with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliatedSpecialty {
    pub specialty_id: String,
    pub specialty_name: String,
    #[serde(default)]
    pub specialty_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The hospital's specialty affiliation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialtyAffiliation {
    pub hospital_id: String,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub affiliated_specialties: Vec<AffiliatedSpecialty>,
    #[serde(default)]
    pub specialty_count: usize,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSpecialtiesResponse {
    #[serde(default)]
    pub message: String,
    pub specialties: Vec<Specialty>,
    #[serde(default)]
    pub count: usize,
}

/// Current affiliation; `affiliation` is absent when none exists yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetSpecialtyAffiliationResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub affiliation: Option<SpecialtyAffiliation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecialtyIdsRequest {
    pub specialty_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpecialtyAffiliationResponse {
    #[serde(default)]
    pub message: String,
    pub affiliation: SpecialtyAffiliation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliatedSpecialtyNamesResponse {
    #[serde(default)]
    pub message: String,
    pub specialty_names: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSpecialtiesWarnings {
    #[serde(default)]
    pub already_affiliated: Vec<String>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSpecialtiesResponse {
    #[serde(default)]
    pub message: String,
    pub added_count: usize,
    pub total_specialties: usize,
    #[serde(default)]
    pub warnings: Option<AddSpecialtiesWarnings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSpecialtyResponse {
    #[serde(default)]
    pub message: String,
    pub specialty_id: String,
    pub remaining_specialties: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAffiliationResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub hospital_id: String,
}

/// Client for the specialty affiliation endpoints
#[derive(Debug, Clone)]
pub struct SpecialtyAffiliationsClient {
    api: ApiClient,
    cache: ResponseCache,
}

impl SpecialtyAffiliationsClient {
    pub fn new(api: ApiClient, cache: ResponseCache) -> Self {
        Self { api, cache }
    }

    /// Specialty catalogue, cached for ten minutes
    pub async fn available_specialties(
        &self,
        mode: FetchMode,
    ) -> Result<AvailableSpecialtiesResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::AvailableSpecialties),
            "specialty-affiliations/available-specialties",
            &Query::new(),
            mode,
            Resource::AvailableSpecialties.default_ttl(),
        )
        .await
    }

    /// The hospital's affiliation record, cached for five minutes
    pub async fn affiliation(
        &self,
        mode: FetchMode,
    ) -> Result<GetSpecialtyAffiliationResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::SpecialtyAffiliation),
            "specialty-affiliations",
            &Query::new(),
            mode,
            Resource::SpecialtyAffiliation.default_ttl(),
        )
        .await
    }

    /// Names of affiliated specialties, cached for five minutes
    pub async fn affiliated_names(
        &self,
        mode: FetchMode,
    ) -> Result<AffiliatedSpecialtyNamesResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::AffiliatedSpecialtyNames),
            "specialty-affiliations/affiliated-specialties",
            &Query::new(),
            mode,
            Resource::AffiliatedSpecialtyNames.default_ttl(),
        )
        .await
    }

    /// Replaces the affiliated specialty set, creating the record if needed
    pub async fn create_or_update(
        &self,
        specialty_ids: Vec<String>,
    ) -> Result<CreateSpecialtyAffiliationResponse, ApiError> {
        let request = SpecialtyIdsRequest { specialty_ids };
        let response: CreateSpecialtyAffiliationResponse =
            self.api.post("specialty-affiliations", &request).await?;
        self.invalidate();
        info!(
            specialties = response.affiliation.specialty_count,
            "specialty affiliation saved"
        );
        Ok(response)
    }

    pub async fn add_specialties(
        &self,
        specialty_ids: Vec<String>,
    ) -> Result<AddSpecialtiesResponse, ApiError> {
        let request = SpecialtyIdsRequest { specialty_ids };
        let response: AddSpecialtiesResponse = self
            .api
            .post("specialty-affiliations/add-specialties", &request)
            .await?;
        self.invalidate();
        info!(added = response.added_count, "specialties added");
        Ok(response)
    }

    pub async fn remove_specialty(&self, specialty_id: &str) -> Result<RemoveSpecialtyResponse, ApiError> {
        let response = self
            .api
            .delete(&format!("specialty-affiliations/remove-specialty/{}", specialty_id))
            .await?;
        self.invalidate();
        info!(specialty_id, "specialty removed");
        Ok(response)
    }

    pub async fn delete_affiliation(&self) -> Result<DeleteAffiliationResponse, ApiError> {
        let response = self.api.delete("specialty-affiliations").await?;
        self.invalidate();
        info!("specialty affiliation deleted");
        Ok(response)
    }

    /// Drops the cached affiliation record, the affiliated names and the
    /// specialty names offered by the doctor form
    pub fn invalidate(&self) {
        self.cache.invalidate(Resource::SpecialtyAffiliation);
        self.cache.invalidate(Resource::AffiliatedSpecialtyNames);
        self.cache.invalidate(Resource::DoctorSpecialties);
    }
}

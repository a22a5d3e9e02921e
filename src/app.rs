//! Console wiring for the provider services
//!
//! The `Console` owns one `ResponseCache` and hands a handle to every
//! resource client, so an invalidation made by one client is seen by all
//! of them.

use serde::Serialize;
use tracing::info;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::data::doctors::DepartmentNamesResponse;
use crate::data::payers::AvailablePayersResponse;
use crate::data::specialties::AvailableSpecialtiesResponse;
use crate::data::{
    ApiClient, ApiError, AuthClient, DepartmentsClient, DoctorsClient, FetchMode,
    HospitalSummaryClient, HospitalUsersClient, PayerAffiliationsClient,
    SpecialtyAffiliationsClient, StaffClient, TariffsClient, TdsClient,
};

/// Reference lists used to populate selection forms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceData {
    pub specialties: AvailableSpecialtiesResponse,
    pub payers: AvailablePayersResponse,
    pub departments: DepartmentNamesResponse,
}

/// All API clients sharing one cache
#[derive(Debug, Clone)]
pub struct Console {
    cache: ResponseCache,
    pub auth: AuthClient,
    pub doctors: DoctorsClient,
    pub staff: StaffClient,
    pub departments: DepartmentsClient,
    pub users: HospitalUsersClient,
    pub payers: PayerAffiliationsClient,
    pub specialties: SpecialtyAffiliationsClient,
    pub tariffs: TariffsClient,
    pub tds: TdsClient,
    pub summary: HospitalSummaryClient,
}

impl Console {
    /// Creates a console with a fresh cache
    pub fn new(config: &Config, token: Option<String>) -> Result<Self, ApiError> {
        Self::with_cache(config, token, ResponseCache::new())
    }

    /// Creates a console around an existing cache
    ///
    /// # Arguments
    /// * `config` - API base URL and timeout
    /// * `token` - Bearer token, if signed in
    /// * `cache` - Cache shared by every client
    pub fn with_cache(
        config: &Config,
        token: Option<String>,
        cache: ResponseCache,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(config, token)?;
        Ok(Self {
            auth: AuthClient::new(api.clone()),
            doctors: DoctorsClient::new(api.clone(), cache.clone()),
            staff: StaffClient::new(api.clone(), cache.clone()),
            departments: DepartmentsClient::new(api.clone(), cache.clone()),
            users: HospitalUsersClient::new(api.clone()),
            payers: PayerAffiliationsClient::new(api.clone(), cache.clone()),
            specialties: SpecialtyAffiliationsClient::new(api.clone(), cache.clone()),
            tariffs: TariffsClient::new(api.clone(), cache.clone()),
            tds: TdsClient::new(api.clone()),
            summary: HospitalSummaryClient::new(api),
            cache,
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drops every cached response
    pub fn clear_cache(&self) {
        self.cache.clear(None);
    }

    /// Loads specialties, payers and department names concurrently
    ///
    /// Each list is served from the cache when fresh. The first failure is
    /// returned; lists that did load stay cached.
    pub async fn load_reference_data(&self, mode: FetchMode) -> Result<ReferenceData, ApiError> {
        let (specialties, payers, departments) = futures::try_join!(
            self.specialties.available_specialties(mode),
            self.payers.available_payers(mode),
            self.doctors.available_departments(mode)
        )?;

        info!(
            specialties = specialties.specialties.len(),
            payers = payers.available_payers.len(),
            departments = departments.department_names.len(),
            "reference data loaded"
        );

        Ok(ReferenceData {
            specialties,
            payers,
            departments,
        })
    }
}

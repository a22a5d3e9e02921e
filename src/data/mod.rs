//! API clients and data models for the provider services
//!
//! This module contains one client per administrative resource (doctors,
//! staff, departments, hospital users, payer affiliations, specialty
//! affiliations, tariffs, TDS mappings, the hospital summary) plus the shared
//! transport and the types common to all of them.

pub mod auth;
pub mod departments;
pub mod doctors;
pub mod http;
pub mod payers;
pub mod specialties;
pub mod staff;
pub mod summary;
pub mod tariffs;
pub mod tds;
pub mod users;

pub use auth::{AuthClient, LoginResponse, TokenValidation, User};
pub use departments::DepartmentsClient;
pub use doctors::DoctorsClient;
pub use http::{ApiClient, ApiError, Query};
pub use payers::PayerAffiliationsClient;
pub use specialties::SpecialtyAffiliationsClient;
pub use staff::StaffClient;
pub use summary::HospitalSummaryClient;
pub use tariffs::TariffsClient;
pub use tds::TdsClient;
pub use users::HospitalUsersClient;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::cache::{CacheKey, ResponseCache};

/// Whether a cacheable read may be answered from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Serve a fresh cached response when one exists
    #[default]
    Cached,
    /// Always hit the server; the response still replaces the cached one
    Refresh,
}

/// Active/inactive flag carried by most records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }

    /// Parses `active`/`inactive`, ignoring case
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(RecordStatus::Active),
            "inactive" => Some(RecordStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page metadata returned by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Reads `key` from the cache or fetches it with GET and caches the result
///
/// A failed fetch is returned as-is; nothing is stored and no older value is
/// served in its place.
pub(crate) async fn fetch_cached<T>(
    api: &ApiClient,
    cache: &ResponseCache,
    key: CacheKey,
    path: &str,
    query: &Query,
    mode: FetchMode,
    ttl: Duration,
) -> Result<T, ApiError>
where
    T: Serialize + DeserializeOwned,
{
    if mode == FetchMode::Cached {
        if let Some(cached) = cache.get_cached::<T>(&key) {
            return Ok(cached);
        }
    }

    let data: T = api.get(path, query).await?;
    cache.set_cached(&key, &data, ttl);
    Ok(data)
}

/// Pushes `name=value` onto `query` when `value` is present
pub(crate) fn push_param<V: ToString>(query: &mut Query, name: &'static str, value: Option<V>) {
    if let Some(value) = value {
        query.push((name, value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_status_parse() {
        assert_eq!(RecordStatus::from_str("active"), Some(RecordStatus::Active));
        assert_eq!(RecordStatus::from_str("INACTIVE"), Some(RecordStatus::Inactive));
        assert_eq!(RecordStatus::from_str("pending"), None);
    }

    #[test]
    fn test_record_status_serde() {
        let json = serde_json::to_string(&RecordStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
        let status: RecordStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, RecordStatus::Active);
    }

    #[test]
    fn test_pagination_tolerates_missing_fields() {
        let pagination: Pagination =
            serde_json::from_str(r#"{"current_page": 2, "total_pages": 5}"#).unwrap();
        assert_eq!(pagination.current_page, 2);
        assert_eq!(pagination.total_pages, 5);
        assert!(!pagination.has_next);
    }

    #[test]
    fn test_push_param_skips_none() {
        let mut query = Query::new();
        push_param(&mut query, "page", Some(3));
        push_param::<u32>(&mut query, "limit", None);
        push_param(&mut query, "include_inactive", Some(true));

        assert_eq!(
            query,
            vec![("page", "3".to_string()), ("include_inactive", "true".to_string())]
        );
    }

    #[test]
    fn test_fetch_mode_default_is_cached() {
        assert_eq!(FetchMode::default(), FetchMode::Cached);
    }
}

//! Typed cache key registry
//!
//! Every cacheable endpoint is a [`Resource`]. Endpoints whose response
//! depends on query parameters add a variant suffix, giving keys such as
//! `tariffs:page=2&limit=20`. Invalidating a resource clears the bare name as
//! a prefix, which covers every variant at once.

use std::fmt;
use std::time::Duration;

/// Five minutes
pub const SHORT_TTL: Duration = Duration::from_secs(5 * 60);

/// Ten minutes
pub const REFERENCE_TTL: Duration = Duration::from_secs(10 * 60);

/// One hour
pub const LONG_TTL: Duration = Duration::from_secs(60 * 60);

/// A logical cached resource
///
/// Names are pairwise non-prefixing: clearing one resource by prefix never
/// touches another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Specialties a hospital may affiliate with
    AvailableSpecialties,
    /// Names of the specialties the hospital is affiliated with
    AffiliatedSpecialtyNames,
    /// The hospital's specialty affiliation record
    SpecialtyAffiliation,
    /// Payers available for affiliation
    AvailablePayers,
    /// Payer directory filtered by payer type
    PayersByType,
    /// Paginated department listings
    Departments,
    /// Specialty names offered when creating a doctor
    DoctorSpecialties,
    /// Department names offered when creating a doctor
    DoctorDepartments,
    /// Paginated tariff listings
    Tariffs,
    /// Payers available for tariff mapping
    TariffAvailablePayers,
    /// Payer type list used by tariff mapping
    TariffPayerTypes,
    /// Aggregate tariff counts
    TariffStatistics,
}

impl Resource {
    /// All registered resources
    pub const ALL: [Resource; 12] = [
        Resource::AvailableSpecialties,
        Resource::AffiliatedSpecialtyNames,
        Resource::SpecialtyAffiliation,
        Resource::AvailablePayers,
        Resource::PayersByType,
        Resource::Departments,
        Resource::DoctorSpecialties,
        Resource::DoctorDepartments,
        Resource::Tariffs,
        Resource::TariffAvailablePayers,
        Resource::TariffPayerTypes,
        Resource::TariffStatistics,
    ];

    /// The string prefix under which this resource is stored
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::AvailableSpecialties => "available-specialties",
            Resource::AffiliatedSpecialtyNames => "affiliated-specialty-names",
            Resource::SpecialtyAffiliation => "specialty-affiliation",
            Resource::AvailablePayers => "available-payers",
            Resource::PayersByType => "payers-by-type",
            Resource::Departments => "departments",
            Resource::DoctorSpecialties => "doctor-specialties",
            Resource::DoctorDepartments => "doctor-departments",
            Resource::Tariffs => "tariffs",
            Resource::TariffAvailablePayers => "tariff-available-payers",
            Resource::TariffPayerTypes => "tariff-payer-types",
            Resource::TariffStatistics => "tariff-statistics",
        }
    }

    /// Default time-to-live for responses of this resource
    pub fn default_ttl(self) -> Duration {
        match self {
            Resource::AffiliatedSpecialtyNames
            | Resource::SpecialtyAffiliation
            | Resource::Departments
            | Resource::Tariffs
            | Resource::TariffStatistics => SHORT_TTL,
            Resource::AvailableSpecialties
            | Resource::AvailablePayers
            | Resource::PayersByType
            | Resource::DoctorSpecialties
            | Resource::DoctorDepartments
            | Resource::TariffAvailablePayers => REFERENCE_TTL,
            Resource::TariffPayerTypes => LONG_TTL,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete key: a resource plus an optional variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: Resource,
    variant: Option<String>,
}

impl CacheKey {
    /// Key for a resource with a single response
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            variant: None,
        }
    }

    /// Key for one variant of a resource; an empty variant yields the bare key
    pub fn with_variant(resource: Resource, variant: impl Into<String>) -> Self {
        let variant = variant.into();
        Self {
            resource,
            variant: (!variant.is_empty()).then_some(variant),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl From<Resource> for CacheKey {
    fn from(resource: Resource) -> Self {
        Self::new(resource)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{}:{}", self.resource, variant),
            None => f.write_str(self.resource.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names_do_not_prefix_each_other() {
        for a in Resource::ALL {
            for b in Resource::ALL {
                if a != b {
                    assert!(
                        !b.as_str().starts_with(a.as_str()),
                        "{} is a prefix of {}",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_key_without_variant_is_resource_name() {
        let key = CacheKey::new(Resource::AvailablePayers);
        assert_eq!(key.to_string(), "available-payers");
        assert!(key.variant().is_none());
    }

    #[test]
    fn test_key_with_variant() {
        let key = CacheKey::with_variant(Resource::Tariffs, "page=2&limit=20");
        assert_eq!(key.to_string(), "tariffs:page=2&limit=20");
        assert_eq!(key.resource(), Resource::Tariffs);
    }

    #[test]
    fn test_empty_variant_collapses_to_bare_key() {
        let key = CacheKey::with_variant(Resource::Departments, "");
        assert_eq!(key, CacheKey::new(Resource::Departments));
        assert_eq!(key.to_string(), "departments");
    }

    #[test]
    fn test_variant_keys_start_with_resource_name() {
        let key = CacheKey::with_variant(Resource::PayersByType, "TPA");
        assert!(key.to_string().starts_with(Resource::PayersByType.as_str()));
    }

    #[test]
    fn test_default_ttls() {
        assert_eq!(Resource::AffiliatedSpecialtyNames.default_ttl(), SHORT_TTL);
        assert_eq!(Resource::AvailablePayers.default_ttl(), REFERENCE_TTL);
        assert_eq!(Resource::AvailableSpecialties.default_ttl(), REFERENCE_TTL);
        assert_eq!(Resource::DoctorDepartments.default_ttl(), REFERENCE_TTL);
        assert_eq!(Resource::TariffPayerTypes.default_ttl(), LONG_TTL);
        assert_eq!(REFERENCE_TTL.as_millis(), 600_000);
        assert_eq!(SHORT_TTL.as_millis(), 300_000);
    }
}

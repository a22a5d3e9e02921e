//! Tariffs API client
//!
//! Tariffs are priced line-item lists mapped to one or more payers. Listings
//! and statistics are cached for five minutes, the payer list used for
//! mapping for ten minutes and the payer type list for an hour. Any change
//! to a tariff, its line items or its payer mappings drops the cached
//! listings and statistics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use super::http::query_key;
use super::{fetch_cached, push_param, ApiClient, ApiError, FetchMode, Pagination, Query, RecordStatus};
use crate::cache::{CacheKey, Resource, ResponseCache};

/// A priced service within a tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffLineItem {
    pub id: String,
    pub code: String,
    pub line_item: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// A payer reference inside a mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerRef {
    pub payer_id: String,
    pub payer_name: String,
}

/// A payer a tariff applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerMapping {
    pub payer_id: String,
    pub payer_name: String,
    #[serde(default)]
    pub payer_type: String,
    #[serde(default)]
    pub mapped_at: Option<String>,
    #[serde(default)]
    pub mapped_by: Option<String>,
    /// Insurers a TPA mapping covers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliated_insurance_companies: Vec<PayerRef>,
    /// TPA managing an insurer mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by_tpa: Option<PayerRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub tariff_id: String,
    pub tariff_name: String,
    pub tariff_start_date: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tariff_end_date: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
    #[serde(default)]
    pub hospital_id: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
    #[serde(default)]
    pub line_items: Vec<TariffLineItem>,
    #[serde(default)]
    pub payer_mappings: Vec<PayerMapping>,
    pub status: RecordStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub updated_by_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffsResponse {
    #[serde(default)]
    pub message: String,
    pub tariffs: Vec<Tariff>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Response carrying a single tariff (get, create, update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffResponse {
    #[serde(default)]
    pub message: String,
    pub tariff: Tariff,
}

/// Plain acknowledgement returned by delete endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemRequest {
    pub code: String,
    pub line_item: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateLineItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_item: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemResponse {
    #[serde(default)]
    pub message: String,
    pub line_item: TariffLineItem,
}

/// Payer to map onto a tariff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayerMappingRequest {
    pub payer_id: String,
    pub payer_name: String,
    pub payer_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affiliated_insurance_companies: Vec<PayerRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerMappingResponse {
    #[serde(default)]
    pub message: String,
    pub payer_mapping: PayerMapping,
}

#[derive(Debug, Clone, Serialize)]
struct BulkPayerMappingsRequest<'a> {
    payers: &'a [PayerMappingRequest],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkPayerMappingsResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub successful: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub payer_mappings: Vec<PayerMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TpaAdded {
    pub payer_name: String,
    #[serde(default)]
    pub affiliated_count: usize,
}

/// Payers added by a relationship-aware bulk mapping, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipResults {
    pub tpas_added: Vec<TpaAdded>,
    pub insurance_companies_added: Vec<String>,
    pub other_payers_added: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipSummary {
    pub total_added: usize,
    pub tpas_added: usize,
    pub insurance_companies_added: usize,
    pub other_payers_added: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipMappingsResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tariff_id: String,
    #[serde(default)]
    pub results: RelationshipResults,
    #[serde(default)]
    pub summary: RelationshipSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTariffRequest {
    pub tariff_name: String,
    pub tariff_id: String,
    pub tariff_start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    pub line_items: Vec<LineItemRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payer_mappings: Vec<PayerMappingRequest>,
}

/// Partial tariff update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTariffRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff_end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

/// A payer that can be mapped onto a tariff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappablePayer {
    pub payer_id: String,
    pub payer_name: String,
    #[serde(default)]
    pub payer_code: String,
    #[serde(default)]
    pub payer_type: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappablePayersResponse {
    #[serde(default)]
    pub message: String,
    pub payers: Vec<MappablePayer>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerTypesResponse {
    #[serde(default)]
    pub message: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerDetails {
    pub payer_id: String,
    pub payer_name: String,
    #[serde(default)]
    pub payer_code: String,
    #[serde(default)]
    pub payer_type: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerDetailsResponse {
    #[serde(default)]
    pub message: String,
    pub payer: PayerDetails,
}

/// Aggregate tariff counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffStatistics {
    pub total_tariffs: u64,
    pub total_line_items: u64,
    pub total_payer_mappings: u64,
    pub active_tariffs: u64,
    pub inactive_tariffs: u64,
    pub by_hospital: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffStatisticsResponse {
    #[serde(default)]
    pub message: String,
    pub stats: TariffStatistics,
}

/// Paging and visibility options for the tariff listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TariffFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub include_inactive: Option<bool>,
}

impl TariffFilters {
    fn to_query(self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "page", self.page);
        push_param(&mut query, "limit", self.limit);
        push_param(&mut query, "include_inactive", self.include_inactive);
        query
    }
}

/// Client for the tariff endpoints
#[derive(Debug, Clone)]
pub struct TariffsClient {
    api: ApiClient,
    cache: ResponseCache,
}

impl TariffsClient {
    pub fn new(api: ApiClient, cache: ResponseCache) -> Self {
        Self { api, cache }
    }

    /// Lists tariffs, cached per distinct query for five minutes
    pub async fn list(&self, filters: TariffFilters, mode: FetchMode) -> Result<TariffsResponse, ApiError> {
        let query = filters.to_query();
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::with_variant(Resource::Tariffs, query_key(&query)?),
            "tariffs",
            &query,
            mode,
            Resource::Tariffs.default_ttl(),
        )
        .await
    }

    pub async fn get(&self, tariff_id: &str) -> Result<TariffResponse, ApiError> {
        self.api
            .get(&format!("tariffs/{}", tariff_id), &Query::new())
            .await
    }

    pub async fn create(&self, request: &CreateTariffRequest) -> Result<TariffResponse, ApiError> {
        let response: TariffResponse = self.api.post("tariffs", request).await?;
        self.invalidate();
        info!(tariff_id = %response.tariff.tariff_id, "tariff created");
        Ok(response)
    }

    pub async fn update(
        &self,
        tariff_id: &str,
        request: &UpdateTariffRequest,
    ) -> Result<TariffResponse, ApiError> {
        let response = self
            .api
            .put(&format!("tariffs/{}", tariff_id), request)
            .await?;
        self.invalidate();
        info!(tariff_id, "tariff updated");
        Ok(response)
    }

    pub async fn delete(&self, tariff_id: &str) -> Result<MessageResponse, ApiError> {
        let response = self.api.delete(&format!("tariffs/{}", tariff_id)).await?;
        self.invalidate();
        info!(tariff_id, "tariff deleted");
        Ok(response)
    }

    pub async fn add_line_item(
        &self,
        tariff_id: &str,
        request: &LineItemRequest,
    ) -> Result<LineItemResponse, ApiError> {
        let response = self
            .api
            .post(&format!("tariffs/{}/line-items", tariff_id), request)
            .await?;
        self.invalidate();
        info!(tariff_id, code = %request.code, "line item added");
        Ok(response)
    }

    pub async fn update_line_item(
        &self,
        tariff_id: &str,
        line_item_id: &str,
        request: &UpdateLineItemRequest,
    ) -> Result<LineItemResponse, ApiError> {
        let response = self
            .api
            .put(
                &format!("tariffs/{}/line-items/{}", tariff_id, line_item_id),
                request,
            )
            .await?;
        self.invalidate();
        info!(tariff_id, line_item_id, "line item updated");
        Ok(response)
    }

    pub async fn delete_line_item(
        &self,
        tariff_id: &str,
        line_item_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let response = self
            .api
            .delete(&format!("tariffs/{}/line-items/{}", tariff_id, line_item_id))
            .await?;
        self.invalidate();
        info!(tariff_id, line_item_id, "line item deleted");
        Ok(response)
    }

    pub async fn add_payer_mapping(
        &self,
        tariff_id: &str,
        request: &PayerMappingRequest,
    ) -> Result<PayerMappingResponse, ApiError> {
        let response = self
            .api
            .post(&format!("tariffs/{}/payers", tariff_id), request)
            .await?;
        self.invalidate();
        info!(tariff_id, payer_id = %request.payer_id, "payer mapped");
        Ok(response)
    }

    pub async fn bulk_add_payer_mappings(
        &self,
        tariff_id: &str,
        payers: &[PayerMappingRequest],
    ) -> Result<BulkPayerMappingsResponse, ApiError> {
        let request = BulkPayerMappingsRequest { payers };
        let response: BulkPayerMappingsResponse = self
            .api
            .post(&format!("tariffs/{}/payers/bulk", tariff_id), &request)
            .await?;
        self.invalidate();
        info!(
            tariff_id,
            successful = response.successful,
            failed = response.failed,
            "bulk payer mapping"
        );
        Ok(response)
    }

    /// Maps TPAs together with the insurers they are affiliated with
    ///
    /// Each request's `affiliated_insurance_companies` are mapped alongside
    /// the TPA itself.
    pub async fn bulk_add_payer_mappings_with_relationships(
        &self,
        tariff_id: &str,
        payers: &[PayerMappingRequest],
    ) -> Result<RelationshipMappingsResponse, ApiError> {
        let request = BulkPayerMappingsRequest { payers };
        let response: RelationshipMappingsResponse = self
            .api
            .post(
                &format!("tariffs/{}/payers/bulk-with-relationships", tariff_id),
                &request,
            )
            .await?;
        self.invalidate();
        info!(
            tariff_id,
            added = response.summary.total_added,
            "payer mapping with relationships"
        );
        Ok(response)
    }

    pub async fn delete_payer_mapping(
        &self,
        tariff_id: &str,
        payer_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let response = self
            .api
            .delete(&format!("tariffs/{}/payers/{}", tariff_id, payer_id))
            .await?;
        self.invalidate();
        info!(tariff_id, payer_id, "payer mapping removed");
        Ok(response)
    }

    /// Payers that can be mapped onto a tariff, cached for ten minutes
    pub async fn available_payers(&self, mode: FetchMode) -> Result<MappablePayersResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::TariffAvailablePayers),
            "tariffs/available-payers",
            &Query::new(),
            mode,
            Resource::TariffAvailablePayers.default_ttl(),
        )
        .await
    }

    /// Known payer types, cached for an hour
    pub async fn payer_types(&self, mode: FetchMode) -> Result<PayerTypesResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::TariffPayerTypes),
            "tariffs/payer-types",
            &Query::new(),
            mode,
            Resource::TariffPayerTypes.default_ttl(),
        )
        .await
    }

    pub async fn payer_details(&self, payer_id: &str) -> Result<PayerDetailsResponse, ApiError> {
        self.api
            .get(&format!("tariffs/payers/{}", payer_id), &Query::new())
            .await
    }

    /// Aggregate counts, cached for five minutes
    pub async fn statistics(&self, mode: FetchMode) -> Result<TariffStatisticsResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::TariffStatistics),
            "tariffs/stats",
            &Query::new(),
            mode,
            Resource::TariffStatistics.default_ttl(),
        )
        .await
    }

    /// Drops cached tariff listings and statistics
    pub fn invalidate(&self) {
        self.cache.invalidate(Resource::Tariffs);
        self.cache.invalidate(Resource::TariffStatistics);
    }
}

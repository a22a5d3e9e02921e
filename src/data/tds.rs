//! TDS mapping API client
//!
//! A TDS mapping fixes the tax deducted at source for one provider and payer
//! pair. `calculate` applies the active mapping to an amount. Mappings change
//! rarely but are edited in place, so nothing here is cached.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{push_param, ApiClient, ApiError, Pagination, Query, RecordStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdsMapping {
    pub id: String,
    pub provider_name: String,
    pub payer_name: String,
    pub tds_percentage: f64,
    #[serde(default)]
    pub effective_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hospital_id: Option<String>,
    pub status: RecordStatus,
    #[serde(default)]
    pub created_by_email: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_by_email: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdsMappingsResponse {
    #[serde(default)]
    pub message: String,
    pub tds_mappings: Vec<TdsMapping>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdsMappingResponse {
    #[serde(default)]
    pub message: String,
    pub tds_mapping: TdsMapping,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTdsMappingRequest {
    pub provider_name: String,
    pub payer_name: String,
    pub tds_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial mapping update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTdsMappingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tds_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTdsMappingResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub mapping_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TdsCalculationRequest {
    pub provider_name: String,
    pub payer_name: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_date: Option<String>,
}

/// Deduction worked out by the server for one amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdsCalculation {
    pub provider_name: String,
    pub payer_name: String,
    pub amount: f64,
    pub tds_percentage: f64,
    pub tds_amount: f64,
    pub net_amount: f64,
    #[serde(default)]
    pub calculation_date: Option<String>,
    #[serde(default)]
    pub mapping_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdsCalculationResponse {
    #[serde(default)]
    pub message: String,
    pub calculation: TdsCalculation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerNamesResponse {
    #[serde(default)]
    pub message: String,
    pub payer_names: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderNamesResponse {
    #[serde(default)]
    pub message: String,
    pub provider_names: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Filters and paging for the mapping listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TdsMappingFilters {
    pub payer_name: Option<String>,
    pub status: Option<RecordStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TdsMappingFilters {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "payer_name", self.payer_name.as_deref());
        push_param(&mut query, "status", self.status);
        push_param(&mut query, "page", self.page);
        push_param(&mut query, "per_page", self.per_page);
        query
    }
}

/// Client for TDS mappings and calculation
#[derive(Debug, Clone)]
pub struct TdsClient {
    api: ApiClient,
}

impl TdsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &TdsMappingFilters) -> Result<TdsMappingsResponse, ApiError> {
        self.api.get("tds-mapping", &filters.to_query()).await
    }

    pub async fn get(&self, mapping_id: &str) -> Result<TdsMappingResponse, ApiError> {
        self.api
            .get(&format!("tds-mapping/{}", mapping_id), &Query::new())
            .await
    }

    pub async fn create(&self, request: &CreateTdsMappingRequest) -> Result<TdsMappingResponse, ApiError> {
        let response: TdsMappingResponse = self.api.post("tds-mapping", request).await?;
        info!(
            mapping_id = %response.tds_mapping.id,
            payer = %request.payer_name,
            "tds mapping created"
        );
        Ok(response)
    }

    pub async fn update(
        &self,
        mapping_id: &str,
        request: &UpdateTdsMappingRequest,
    ) -> Result<TdsMappingResponse, ApiError> {
        let response = self
            .api
            .put(&format!("tds-mapping/{}", mapping_id), request)
            .await?;
        info!(mapping_id, "tds mapping updated");
        Ok(response)
    }

    pub async fn delete(&self, mapping_id: &str) -> Result<DeleteTdsMappingResponse, ApiError> {
        let response = self
            .api
            .delete(&format!("tds-mapping/{}", mapping_id))
            .await?;
        info!(mapping_id, "tds mapping deleted");
        Ok(response)
    }

    /// Applies the matching mapping to `request.amount`
    pub async fn calculate(&self, request: &TdsCalculationRequest) -> Result<TdsCalculationResponse, ApiError> {
        self.api.post("calculate-tds", request).await
    }

    /// Payer names a mapping can be created for
    pub async fn payer_names(&self) -> Result<PayerNamesResponse, ApiError> {
        self.api.get("payers/names", &Query::new()).await
    }

    /// Provider names a mapping can be created for
    pub async fn provider_names(&self) -> Result<ProviderNamesResponse, ApiError> {
        self.api.get("providers/names", &Query::new()).await
    }
}

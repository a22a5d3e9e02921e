//! Payer affiliations API client
//!
//! Manages which insurers and TPAs the hospital is affiliated with. The
//! available-payer list and the per-type payer directory are cached for ten
//! minutes; every successful affiliation change invalidates both, along with
//! the payer list used by tariff mapping.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{fetch_cached, push_param, ApiClient, ApiError, FetchMode, Pagination, Query, RecordStatus};
use crate::cache::{CacheKey, Resource, ResponseCache};

/// An affiliation between the hospital and a payer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerAffiliation {
    pub id: String,
    #[serde(default)]
    pub payer_id: String,
    pub payer_name: String,
    #[serde(default)]
    pub payer_type: String,
    #[serde(default)]
    pub payer_code: String,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub affiliated_by: Option<String>,
    #[serde(default)]
    pub affiliated_by_email: Option<String>,
    #[serde(default)]
    pub affiliated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayerAffiliationsResponse {
    #[serde(default)]
    pub message: String,
    pub affiliations: Vec<PayerAffiliation>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinglePayerAffiliationResponse {
    #[serde(default)]
    pub message: String,
    pub affiliation: PayerAffiliation,
}

/// Short form of an affiliation returned by create/update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliationSummary {
    pub id: String,
    pub payer_name: String,
    #[serde(default)]
    pub payer_type: String,
    #[serde(default)]
    pub payer_code: String,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePayerAffiliationRequest {
    pub payer_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatePayerAffiliationRequest {
    pub status: RecordStatus,
}

/// Response to create and update calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliationChangeResponse {
    #[serde(default)]
    pub message: String,
    pub affiliation: AffiliationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePayerAffiliationResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub affiliation_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkAffiliatePayersRequest {
    pub payer_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAffiliationSuccess {
    pub payer_name: String,
    #[serde(default)]
    pub payer_type: String,
    pub affiliation_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAffiliationFailure {
    pub payer_name: String,
    pub error: String,
}

/// Outcome of a bulk affiliation; individual payers may fail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkAffiliatePayersResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub successful_affiliations: Vec<BulkAffiliationSuccess>,
    #[serde(default)]
    pub failed_affiliations: Vec<BulkAffiliationFailure>,
    #[serde(default)]
    pub total_processed: usize,
}

/// A payer from the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailablePayer {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub payer_type: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

/// Payers open for affiliation, plus names already affiliated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailablePayersResponse {
    #[serde(default)]
    pub affiliated_payers: Vec<String>,
    pub available_payers: Vec<AvailablePayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayersByTypeResponse {
    #[serde(default)]
    pub message: String,
    pub payers: Vec<AvailablePayer>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub filter_type: Option<String>,
}

/// Filters for the affiliation listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayerAffiliationFilters {
    pub status: Option<RecordStatus>,
    pub payer_type: Option<String>,
}

impl PayerAffiliationFilters {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_param(&mut query, "status", self.status);
        push_param(&mut query, "payer_type", self.payer_type.as_deref());
        query
    }
}

/// Client for the payer affiliation endpoints
#[derive(Debug, Clone)]
pub struct PayerAffiliationsClient {
    api: ApiClient,
    cache: ResponseCache,
}

impl PayerAffiliationsClient {
    pub fn new(api: ApiClient, cache: ResponseCache) -> Self {
        Self { api, cache }
    }

    pub async fn list(
        &self,
        filters: &PayerAffiliationFilters,
    ) -> Result<PayerAffiliationsResponse, ApiError> {
        self.api.get("payer-affiliations", &filters.to_query()).await
    }

    pub async fn get(&self, affiliation_id: &str) -> Result<SinglePayerAffiliationResponse, ApiError> {
        self.api
            .get(&format!("payer-affiliations/{}", affiliation_id), &Query::new())
            .await
    }

    /// Affiliates the hospital with the named payer
    pub async fn create(&self, payer_name: &str) -> Result<AffiliationChangeResponse, ApiError> {
        let request = CreatePayerAffiliationRequest {
            payer_name: payer_name.to_string(),
        };
        let response: AffiliationChangeResponse =
            self.api.post("payer-affiliations", &request).await?;
        self.invalidate();
        info!(affiliation_id = %response.affiliation.id, payer_name, "payer affiliated");
        Ok(response)
    }

    /// Activates or deactivates an affiliation
    pub async fn set_status(
        &self,
        affiliation_id: &str,
        status: RecordStatus,
    ) -> Result<AffiliationChangeResponse, ApiError> {
        let request = UpdatePayerAffiliationRequest { status };
        let response = self
            .api
            .put(&format!("payer-affiliations/{}", affiliation_id), &request)
            .await?;
        self.invalidate();
        info!(affiliation_id, %status, "payer affiliation updated");
        Ok(response)
    }

    pub async fn delete(&self, affiliation_id: &str) -> Result<DeletePayerAffiliationResponse, ApiError> {
        let response = self
            .api
            .delete(&format!("payer-affiliations/{}", affiliation_id))
            .await?;
        self.invalidate();
        info!(affiliation_id, "payer affiliation deleted");
        Ok(response)
    }

    /// Affiliates several payers in one call
    ///
    /// The cache is invalidated whenever the call itself succeeds, even if
    /// some individual payers failed.
    pub async fn bulk_affiliate(
        &self,
        payer_names: Vec<String>,
    ) -> Result<BulkAffiliatePayersResponse, ApiError> {
        let request = BulkAffiliatePayersRequest { payer_names };
        let response: BulkAffiliatePayersResponse =
            self.api.post("payer-affiliations/bulk", &request).await?;
        self.invalidate();
        info!(
            succeeded = response.successful_affiliations.len(),
            failed = response.failed_affiliations.len(),
            "bulk payer affiliation"
        );
        Ok(response)
    }

    /// Payers open for affiliation, cached for ten minutes
    pub async fn available_payers(&self, mode: FetchMode) -> Result<AvailablePayersResponse, ApiError> {
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::new(Resource::AvailablePayers),
            "available-payers",
            &Query::new(),
            mode,
            Resource::AvailablePayers.default_ttl(),
        )
        .await
    }

    /// Payer directory filtered by type, cached per type for ten minutes
    ///
    /// An empty type is the unfiltered directory.
    pub async fn payers_by_type(
        &self,
        payer_type: Option<&str>,
        mode: FetchMode,
    ) -> Result<PayersByTypeResponse, ApiError> {
        let payer_type = payer_type.filter(|t| !t.is_empty());
        let mut query = Query::new();
        push_param(&mut query, "type", payer_type);
        fetch_cached(
            &self.api,
            &self.cache,
            CacheKey::with_variant(Resource::PayersByType, payer_type.unwrap_or_default()),
            "payers",
            &query,
            mode,
            Resource::PayersByType.default_ttl(),
        )
        .await
    }

    /// Drops every cached payer list affected by an affiliation change
    pub fn invalidate(&self) {
        self.cache.invalidate(Resource::AvailablePayers);
        self.cache.invalidate(Resource::PayersByType);
        self.cache.invalidate(Resource::TariffAvailablePayers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(server: &MockServer) -> (PayerAffiliationsClient, ResponseCache, ManualClock) {
        let config = Config::default().with_api_url(server.uri());
        let api = ApiClient::new(&config, Some("test-token".to_string())).unwrap();
        let clock = ManualClock::default();
        let cache = ResponseCache::with_clock(clock.clone());
        (PayerAffiliationsClient::new(api, cache.clone()), cache, clock)
    }

    fn available_json(names: &[&str]) -> serde_json::Value {
        let payers: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "id": format!("P{}", i), "name": name, "type": "TPA", "code": "X" }))
            .collect();
        json!({ "affiliated_payers": [], "available_payers": payers })
    }

    #[test]
    fn test_available_payer_type_field() {
        let payer: AvailablePayer =
            serde_json::from_value(json!({ "id": "P1", "name": "Medi Assist", "type": "TPA" })).unwrap();
        assert_eq!(payer.payer_type, "TPA");
        assert!(payer.status.is_none());
    }

    #[tokio::test]
    async fn test_available_payers_cached_then_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/available-payers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(available_json(&["A", "B"])))
            .expect(2)
            .mount(&server)
            .await;

        let (client, _cache, clock) = create_test_client(&server);

        let first = client.available_payers(FetchMode::Cached).await.unwrap();
        assert_eq!(first.available_payers.len(), 2);
        client.available_payers(FetchMode::Cached).await.unwrap();

        clock.advance_millis(600_001);
        client.available_payers(FetchMode::Cached).await.unwrap();
    }

    #[tokio::test]
    async fn test_affiliation_invalidates_available_payers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/available-payers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(available_json(&["A", "B"])))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/available-payers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(available_json(&["B"])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/payer-affiliations"))
            .and(body_json(json!({ "payer_name": "A" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "created",
                "affiliation": { "id": "AF1", "payer_name": "A", "payer_type": "TPA", "payer_code": "X" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _cache, _clock) = create_test_client(&server);

        let before = client.available_payers(FetchMode::Cached).await.unwrap();
        assert_eq!(before.available_payers.len(), 2);

        client.create("A").await.unwrap();

        let after = client.available_payers(FetchMode::Cached).await.unwrap();
        assert_eq!(after.available_payers.len(), 1);
        assert_eq!(after.available_payers[0].name, "B");
    }

    #[tokio::test]
    async fn test_payers_by_type_cached_per_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payers"))
            .and(query_param("type", "TPA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok", "payers": [], "count": 0, "filter_type": "TPA"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache, _clock) = create_test_client(&server);
        client.payers_by_type(Some("TPA"), FetchMode::Cached).await.unwrap();
        client.payers_by_type(Some("TPA"), FetchMode::Cached).await.unwrap();

        assert!(cache.contains_entry("payers-by-type:TPA"));
    }

    #[tokio::test]
    async fn test_empty_type_is_treated_as_unfiltered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payers"))
            .and(query_param("type", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "empty filter", "payers": [], "count": 0
            })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/payers"))
            .and(query_param_is_missing("type"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "all payers",
                "payers": [{ "id": "P1", "name": "Medi Assist", "type": "TPA" }],
                "count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/payers"))
            .and(query_param("type", "TPA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "tpa only", "payers": [], "count": 0, "filter_type": "TPA"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, cache, _clock) = create_test_client(&server);

        let empty = client.payers_by_type(Some(""), FetchMode::Cached).await.unwrap();
        let unfiltered = client.payers_by_type(None, FetchMode::Cached).await.unwrap();
        let tpa = client.payers_by_type(Some("TPA"), FetchMode::Cached).await.unwrap();

        assert_eq!(empty, unfiltered);
        assert_eq!(unfiltered.message, "all payers");
        assert_eq!(tpa.message, "tpa only");
        assert!(cache.contains_entry("payers-by-type"));
        assert!(cache.contains_entry("payers-by-type:TPA"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_list_by_status_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payer-affiliations"))
            .and(query_param("status", "inactive"))
            .and(query_param("payer_type", "TPA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "affiliations": [{ "id": "AF1", "payer_name": "Medi Assist", "status": "inactive" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _cache, _clock) = create_test_client(&server);
        let filters = PayerAffiliationFilters {
            status: Some(RecordStatus::Inactive),
            payer_type: Some("TPA".to_string()),
        };
        let response = client.list(&filters).await.unwrap();

        assert_eq!(response.affiliations[0].status, Some(RecordStatus::Inactive));
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_invalidate() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/payer-affiliations/AF1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (client, cache, _clock) = create_test_client(&server);
        cache.set_cached(
            &CacheKey::new(Resource::AvailablePayers),
            &available_json(&["A"]),
            Resource::AvailablePayers.default_ttl(),
        );

        let err = client.delete("AF1").await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert!(cache.contains_entry("available-payers"));
    }

    #[tokio::test]
    async fn test_bulk_affiliate_reports_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payer-affiliations/bulk"))
            .and(body_json(json!({ "payer_names": ["A", "Z"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "processed",
                "successful_affiliations": [{ "payer_name": "A", "payer_type": "TPA", "affiliation_id": "AF1" }],
                "failed_affiliations": [{ "payer_name": "Z", "error": "Unknown payer" }],
                "total_processed": 2
            })))
            .mount(&server)
            .await;

        let (client, cache, _clock) = create_test_client(&server);
        cache.set("payers-by-type:TPA", &json!({}), Resource::PayersByType.default_ttl());

        let response = client
            .bulk_affiliate(vec!["A".to_string(), "Z".to_string()])
            .await
            .unwrap();

        assert_eq!(response.total_processed, 2);
        assert_eq!(response.failed_affiliations[0].error, "Unknown payer");
        assert!(cache.is_empty());
    }
}

//! Hospital summary API client
//!
//! The summary is a dashboard roll-up whose shape the server owns, so it is
//! passed through as raw JSON.

use serde_json::Value;

use super::{ApiClient, ApiError, Query};

#[derive(Debug, Clone)]
pub struct HospitalSummaryClient {
    api: ApiClient,
}

impl HospitalSummaryClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch(&self) -> Result<Value, ApiError> {
        self.api.get("hospital-summary", &Query::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_passes_body_through() {
        let server = MockServer::start().await;
        let body = json!({
            "hospital_name": "City Hospital",
            "doctors": { "total": 12, "active": 10 },
            "tariffs": { "total": 3 }
        });
        Mock::given(method("GET"))
            .and(path("/hospital-summary"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config::default().with_api_url(server.uri());
        let client =
            HospitalSummaryClient::new(ApiClient::new(&config, Some("test-token".to_string())).unwrap());

        assert_eq!(client.fetch().await.unwrap(), body);
    }
}

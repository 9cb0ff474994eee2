use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::models::weather::UtilityRatesResponse;
use crate::services::ensure_success;

const PROVIDER: &str = "nrel";

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Residential electricity rate ($/kWh), `None` when unknown for the location.
    async fn residential_rate(&self, lat: f64, lon: f64) -> Result<Option<f64>>;
}

/// NREL utility rates API client (US coverage only)
pub struct NrelClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NrelClient {
    pub fn new(client: Client, cfg: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        }
    }
}

#[async_trait]
impl PriceProvider for NrelClient {
    async fn residential_rate(&self, lat: f64, lon: f64) -> Result<Option<f64>> {
        let Some(api_key) = &self.api_key else {
            debug!("no NREL key configured, skipping rate lookup");
            return Ok(None);
        };

        let url = format!("{}/api/utility_rates/v3.json", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("api_key", api_key.clone()), ("lat", lat.to_string()), ("lon", lon.to_string())])
            .send()
            .await?;

        let body = ensure_success(PROVIDER, resp)?.json::<UtilityRatesResponse>().await?;
        let rate = body
            .outputs
            .and_then(|o| o.residential)
            .and_then(|v| v.as_f64())
            .filter(|r| r.is_finite() && *r >= 0.0);
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::http_client;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String, key: Option<&str>) -> NrelClient {
        let cfg = ProviderConfig { base_url: url, api_key: key.map(str::to_string) };
        NrelClient::new(http_client(5).unwrap(), &cfg)
    }

    #[tokio::test]
    async fn test_residential_rate() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/utility_rates/v3.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".into(), "nrel_key".into()),
                Matcher::UrlEncoded("lat".into(), "40".into()),
                Matcher::UrlEncoded("lon".into(), "-105".into()),
            ]))
            .with_status(200)
            .with_body(json!({"outputs": {"utility_name": "Xcel", "residential": 0.1342}}).to_string())
            .create_async()
            .await;

        let rate = client_for(server.url(), Some("nrel_key"))
            .residential_rate(40.0, -105.0)
            .await
            .unwrap();
        assert_eq!(rate, Some(0.1342));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_data_is_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/utility_rates/v3.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"outputs": {"residential": "no data"}}).to_string())
            .create_async()
            .await;

        let rate = client_for(server.url(), Some("k")).residential_rate(35.0, 139.0).await.unwrap();
        assert_eq!(rate, None);
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/utility_rates/v3.json")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let rate = client_for(server.url(), None).residential_rate(40.0, -105.0).await.unwrap();
        assert_eq!(rate, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/utility_rates/v3.json")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let result = client_for(server.url(), Some("k")).residential_rate(40.0, -105.0).await;
        assert!(matches!(result, Err(AppError::UpstreamStatus { status: 503, .. })));
    }
}

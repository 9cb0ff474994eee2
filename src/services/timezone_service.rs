use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::models::weather::TimeZoneResponse;
use crate::services::ensure_success;

const PROVIDER: &str = "timezonedb";

#[async_trait]
pub trait TimezoneProvider: Send + Sync {
    /// IANA zone at the coordinates, `None` when the provider cannot tell.
    async fn timezone(&self, lat: f64, lon: f64) -> Result<Option<Tz>>;
}

/// TimeZoneDB position lookup client
pub struct TimeZoneDbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TimeZoneDbClient {
    pub fn new(client: Client, cfg: &ProviderConfig) -> Self {
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        }
    }
}

#[async_trait]
impl TimezoneProvider for TimeZoneDbClient {
    async fn timezone(&self, lat: f64, lon: f64) -> Result<Option<Tz>> {
        let Some(api_key) = &self.api_key else {
            debug!("no TimeZoneDB key configured, skipping timezone lookup");
            return Ok(None);
        };

        let url = format!("{}/v2.1/get-time-zone", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key.clone()),
                ("format", "json".to_string()),
                ("by", "position".to_string()),
                ("lat", lat.to_string()),
                ("lng", lon.to_string()),
            ])
            .send()
            .await?;

        let body = ensure_success(PROVIDER, resp)?.json::<TimeZoneResponse>().await?;
        let Some(zone_name) = body.zone_name.filter(|z| !z.is_empty()) else {
            debug!(message = ?body.message, "timezone lookup returned no zone");
            return Ok(None);
        };

        zone_name.parse::<Tz>().map(Some).map_err(|_| AppError::UpstreamData {
            provider: PROVIDER,
            reason: format!("unknown zone name {zone_name}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_client;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String) -> TimeZoneDbClient {
        let cfg = ProviderConfig { base_url: url, api_key: Some("tz_key".to_string()) };
        TimeZoneDbClient::new(http_client(5).unwrap(), &cfg)
    }

    #[tokio::test]
    async fn test_zone_by_position() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2.1/get-time-zone")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("key".into(), "tz_key".into()),
                Matcher::UrlEncoded("by".into(), "position".into()),
                Matcher::UrlEncoded("lat".into(), "35.6895".into()),
                Matcher::UrlEncoded("lng".into(), "139.6917".into()),
            ]))
            .with_status(200)
            .with_body(json!({"status": "OK", "zoneName": "Asia/Tokyo", "gmtOffset": 32400}).to_string())
            .create_async()
            .await;

        let tz = client_for(server.url()).timezone(35.6895, 139.6917).await.unwrap();
        assert_eq!(tz, Some(chrono_tz::Asia::Tokyo));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_lookup_is_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2.1/get-time-zone")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"status": "FAILED", "message": "Invalid API key."}).to_string())
            .create_async()
            .await;

        let tz = client_for(server.url()).timezone(0.0, 0.0).await.unwrap();
        assert_eq!(tz, None);
    }

    #[tokio::test]
    async fn test_unknown_zone_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2.1/get-time-zone")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"zoneName": "Mars/Olympus_Mons"}).to_string())
            .create_async()
            .await;

        let result = client_for(server.url()).timezone(0.0, 0.0).await;
        assert!(matches!(result, Err(AppError::UpstreamData { .. })));
    }
}

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::models::weather::{CurrentWeatherResponse, GeocodingEntry, Location, WeatherObservation};
use crate::services::ensure_success;

const PROVIDER: &str = "openweather";

/// Geocoding and current-conditions lookups.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// First match for a free-text place name, `None` when nothing matches.
    async fn search_location(&self, query: &str) -> Result<Option<Location>>;

    /// Place name for coordinates, `None` when the provider has no name.
    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Option<String>>;

    async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherObservation>;
}

/// OpenWeather geocoding + current weather API client
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(client: Client, cfg: &ProviderConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| AppError::Config("OpenWeather API key is missing".to_string()))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn geocode(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<GeocodingEntry>> {
        let url = format!("{}/geo/1.0/{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        let entries = ensure_success(PROVIDER, resp)?.json::<Vec<GeocodingEntry>>().await?;
        Ok(entries)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn search_location(&self, query: &str) -> Result<Option<Location>> {
        let entries = self.geocode("direct", &[("q", query.to_string())]).await?;
        debug!(query, hits = entries.len(), "geocoding search");

        Ok(entries.into_iter().next().map(|e| {
            let name = e.name.unwrap_or_else(|| query.to_string());
            Location { latitude: e.lat, longitude: e.lon, name }
        }))
    }

    async fn reverse_geocode(&self, lat: f64, lon: f64) -> Result<Option<String>> {
        let entries = self
            .geocode("reverse", &[("lat", lat.to_string()), ("lon", lon.to_string())])
            .await?;
        Ok(entries.into_iter().next().and_then(|e| e.name))
    }

    async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherObservation> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let body = ensure_success(PROVIDER, resp)?.json::<CurrentWeatherResponse>().await?;
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http_client;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: String) -> OpenWeatherClient {
        let cfg = ProviderConfig { base_url: url, api_key: Some("test_key".to_string()) };
        OpenWeatherClient::new(http_client(5).unwrap(), &cfg).unwrap()
    }

    #[test]
    fn missing_key_is_config_error() {
        let cfg = ProviderConfig { base_url: "http://localhost".to_string(), api_key: None };
        let result = OpenWeatherClient::new(http_client(5).unwrap(), &cfg);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_search_location_first_hit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "Tokyo".into()),
                Matcher::UrlEncoded("limit".into(), "1".into()),
                Matcher::UrlEncoded("appid".into(), "test_key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([{"name": "Tokyo", "lat": 35.6895, "lon": 139.6917, "country": "JP"}]).to_string())
            .create_async()
            .await;

        let location = client_for(server.url()).search_location("Tokyo").await.unwrap().unwrap();
        assert_eq!(location.name, "Tokyo");
        assert_eq!(location.latitude, 35.6895);
        assert_eq!(location.longitude, 139.6917);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_location_no_match() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let location = client_for(server.url()).search_location("Nowhere").await.unwrap();
        assert!(location.is_none());
    }

    #[tokio::test]
    async fn test_search_location_unauthorized() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let result = client_for(server.url()).search_location("Tokyo").await;
        assert!(matches!(result, Err(AppError::UpstreamStatus { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_reverse_geocode_name() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/geo/1.0/reverse")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "45.07".into()),
                Matcher::UrlEncoded("lon".into(), "7.33".into()),
            ]))
            .with_status(200)
            .with_body(json!([{"name": "Turin", "lat": 45.07, "lon": 7.33}]).to_string())
            .create_async()
            .await;

        let name = client_for(server.url()).reverse_geocode(45.07, 7.33).await.unwrap();
        assert_eq!(name.as_deref(), Some("Turin"));
    }

    #[tokio::test]
    async fn test_current_weather_metric() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("units".into(), "metric".into()),
                Matcher::UrlEncoded("appid".into(), "test_key".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "clouds": {"all": 20},
                    "main": {"temp": 28.5, "humidity": 40},
                    "wind": {"speed": 3.2}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let obs = client_for(server.url()).current_weather(35.6895, 139.6917).await.unwrap();
        assert_eq!(obs.cloud_cover_pct, 20.0);
        assert_eq!(obs.temperature_c, 28.5);
        assert_eq!(obs.humidity_pct, 40.0);
        assert_eq!(obs.wind_speed_m_s, 3.2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_current_weather_malformed_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"cod": 200}"#)
            .create_async()
            .await;

        let result = client_for(server.url()).current_weather(0.0, 0.0).await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }
}

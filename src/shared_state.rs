use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::services::http_client;
use crate::services::prediction_service::PredictionService;
use crate::services::pricing_service::NrelClient;
use crate::services::solar_algorithm::SpaSunPosition;
use crate::services::timezone_service::TimeZoneDbClient;
use crate::services::weather_service::OpenWeatherClient;

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub predictions: Arc<PredictionService>,
}

impl AppState {
    pub fn new(config: Config, predictions: PredictionService) -> Self {
        Self {
            config: Arc::new(config),
            predictions: Arc::new(predictions),
        }
    }

    /// Wires the real HTTP providers described by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = http_client(config.providers.timeout_s)?;
        let providers = &config.providers;

        let predictions = PredictionService::new(
            Arc::new(OpenWeatherClient::new(client.clone(), &providers.openweather)?),
            Arc::new(NrelClient::new(client.clone(), &providers.nrel)),
            Arc::new(TimeZoneDbClient::new(client, &providers.timezonedb)),
            Arc::new(SpaSunPosition),
            &config,
        );

        Ok(Self::new(config, predictions))
    }
}

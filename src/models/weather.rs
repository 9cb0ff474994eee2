use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::services::solar_algorithm::{DEFAULT_HUMIDITY_PCT, DEFAULT_TEMPERATURE_C};

// ─── Domain types ─────────────────────────────────────────────────────────────

/// Current conditions at a location, metric units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherObservation {
    /// Cloud cover (%), 0..=100
    pub cloud_cover_pct: f64,
    /// Air temperature (°C)
    pub temperature_c: f64,
    /// Relative humidity (%), 0..=100
    pub humidity_pct: f64,
    /// Wind speed (m/s)
    pub wind_speed_m_s: f64,
}

impl Default for WeatherObservation {
    /// Values substituted when the weather provider cannot be reached.
    fn default() -> Self {
        Self {
            cloud_cover_pct: 50.0,
            temperature_c: DEFAULT_TEMPERATURE_C,
            humidity_pct: DEFAULT_HUMIDITY_PCT,
            wind_speed_m_s: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Location {
    /// Name used when reverse geocoding yields nothing. Whole degrees keep
    /// their decimal point ("Lat: 10.0, ...").
    pub fn fallback_name(lat: f64, lon: f64) -> String {
        format!("Lat: {lat:?}, Lon: {lon:?}")
    }
}

// ─── OpenWeather wire types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GeocodingEntry {
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub clouds: Clouds,
    pub main: MainReadings,
    pub wind: Wind,
}

#[derive(Debug, Deserialize)]
pub struct Clouds {
    pub all: f64,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

impl From<CurrentWeatherResponse> for WeatherObservation {
    fn from(resp: CurrentWeatherResponse) -> Self {
        Self {
            cloud_cover_pct: resp.clouds.all.clamp(0.0, 100.0),
            temperature_c: resp.main.temp,
            humidity_pct: resp.main.humidity.clamp(0.0, 100.0),
            wind_speed_m_s: resp.wind.speed.max(0.0),
        }
    }
}

// ─── NREL utility rates wire types ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UtilityRatesResponse {
    #[serde(default)]
    pub outputs: Option<UtilityRatesOutputs>,
}

/// `residential` is usually a number, but the API answers `"no data"` for
/// locations outside its coverage, so it stays untyped here.
#[derive(Debug, Deserialize)]
pub struct UtilityRatesOutputs {
    #[serde(default)]
    pub residential: Option<serde_json::Value>,
}

// ─── TimeZoneDB wire types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TimeZoneResponse {
    #[serde(rename = "zoneName")]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::models::weather::{Location, WeatherObservation};

// ─── Estimator inputs ────────────────────────────────────────────────────────

/// One weather reading bound to a place and instant. Built per request.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub cloud_cover_pct: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

impl Observation {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>, weather: &WeatherObservation) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
            cloud_cover_pct: weather.cloud_cover_pct,
            temperature_c: weather.temperature_c,
            humidity_pct: weather.humidity_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PanelSpec {
    /// Panel surface (m²), > 0
    pub area_m2: f64,
    /// Conversion efficiency as a fraction, within (0, 1)
    pub efficiency: f64,
}

impl PanelSpec {
    pub fn new(area_m2: f64, efficiency: f64) -> Result<Self> {
        if !(area_m2 > 0.0) || !area_m2.is_finite() {
            return Err(AppError::InvalidInput(format!("panel area must be positive, got {area_m2}")));
        }
        if !(efficiency > 0.0 && efficiency < 1.0) {
            return Err(AppError::InvalidInput(format!(
                "panel efficiency must be within (0, 1), got {efficiency}"
            )));
        }
        Ok(Self { area_m2, efficiency })
    }

    // Dashboard bounds, enforced on request inputs and configured defaults
    pub const MIN_AREA_M2: f64 = 1.0;
    pub const MAX_AREA_M2: f64 = 1000.0;
    pub const MIN_EFFICIENCY_PCT: f64 = 10.0;
    pub const MAX_EFFICIENCY_PCT: f64 = 30.0;

    /// Builds a panel that also satisfies the dashboard bounds.
    /// `efficiency` is a fraction; bounds are compared in that unit so a
    /// configured 0.3 is not pushed past 30 % by rounding.
    pub fn within_dashboard_bounds(area_m2: f64, efficiency: f64) -> Result<Self> {
        if !(Self::MIN_AREA_M2..=Self::MAX_AREA_M2).contains(&area_m2) {
            return Err(AppError::InvalidInput(format!(
                "panel_area_m2 must be within {}..={}, got {area_m2}",
                Self::MIN_AREA_M2,
                Self::MAX_AREA_M2
            )));
        }
        let (min, max) = (Self::MIN_EFFICIENCY_PCT / 100.0, Self::MAX_EFFICIENCY_PCT / 100.0);
        if !(min..=max).contains(&efficiency) {
            return Err(AppError::InvalidInput(format!(
                "panel_efficiency_pct must be within {}..={}, got {}",
                Self::MIN_EFFICIENCY_PCT,
                Self::MAX_EFFICIENCY_PCT,
                efficiency * 100.0
            )));
        }
        Self::new(area_m2, efficiency)
    }
}

// ─── Prediction output ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceSource {
    /// Residential rate reported by the utility-rate provider
    Provider,
    /// Approximated from the user's monthly electricity bill
    MonthlyCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ElectricityPrice {
    pub price_per_kwh: f64,
    pub source: PriceSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HourlyPoint {
    /// Hour of day in the location's timezone
    pub hour: u32,
    pub timestamp: DateTime<FixedOffset>,
    /// Solar zenith angle (deg)
    pub zenith_deg: f64,
    /// Global horizontal irradiance (W/m²)
    pub ghi_w_m2: f64,
    /// Panel output (W)
    pub power_w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySummary {
    /// Energy over the selected hours (kWh)
    pub energy_kwh: f64,
    pub daily_savings: f64,
    /// `daily_savings` projected over 365 days
    pub annual_savings: f64,
    /// Avoided CO₂ (kg)
    pub carbon_offset_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Prediction {
    pub location: Location,
    pub date: NaiveDate,
    /// IANA zone the hours are expressed in
    pub timezone: String,
    pub weather: WeatherObservation,
    pub price: ElectricityPrice,
    pub panel: PanelSpec,
    pub hourly: Vec<HourlyPoint>,
    pub summary: DailySummary,
    /// Non-fatal problems, e.g. a provider fallback
    pub warnings: Vec<String>,
}

/// Validated input to `PredictionService::predict`.
#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub date: Option<NaiveDate>,
    pub start_hour: u32,
    pub end_hour: u32,
    pub panel: PanelSpec,
    pub monthly_cost: f64,
}

// ─── REST API response types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeatherResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub weather: WeatherObservation,
    /// Set when default values were substituted
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SliderBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DefaultsResponse {
    pub panel_area_m2: SliderBounds,
    pub panel_efficiency_pct: SliderBounds,
    pub start_hour: SliderBounds,
    pub end_hour: SliderBounds,
    pub monthly_cost: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub price_provider_configured: bool,
    pub timezone_provider_configured: bool,
}

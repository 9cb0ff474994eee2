use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::Result;
use crate::models::power::{
    DefaultsResponse, HealthStatus, PanelSpec, Prediction, PredictionRequest, SliderBounds, WeatherResponse,
};
use crate::models::weather::Location;
use crate::services::prediction_service::{DEFAULT_END_HOUR, DEFAULT_START_HOUR, MAX_HOUR, MIN_HOUR};
use crate::shared_state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text place name
    pub q: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoordinatesQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PredictionQuery {
    pub lat: f64,
    pub lon: f64,
    /// Day to predict, defaults to today in the location's timezone
    pub date: Option<NaiveDate>,
    /// First hour, 6..=18, default 8
    pub start_hour: Option<u32>,
    /// Last hour (inclusive), 6..=18, default 16
    pub end_hour: Option<u32>,
    /// Panel area (m²), at least 1.0
    pub panel_area_m2: Option<f64>,
    /// Panel efficiency (%), 10..=30
    pub panel_efficiency_pct: Option<f64>,
    /// Monthly electricity bill used when no utility rate is known
    pub monthly_cost: Option<f64>,
}

impl PredictionQuery {
    fn into_request(self, state: &AppState) -> Result<PredictionRequest> {
        let defaults = &state.config.panel;

        let area = self.panel_area_m2.unwrap_or(defaults.area_m2);
        let efficiency = self.panel_efficiency_pct.map_or(defaults.efficiency, |pct| pct / 100.0);
        let panel = PanelSpec::within_dashboard_bounds(area, efficiency)?;

        Ok(PredictionRequest {
            latitude: self.lat,
            longitude: self.lon,
            date: self.date,
            start_hour: self.start_hour.unwrap_or(DEFAULT_START_HOUR),
            end_hour: self.end_hour.unwrap_or(DEFAULT_END_HOUR),
            panel,
            monthly_cost: self
                .monthly_cost
                .unwrap_or_else(|| state.predictions.default_monthly_cost()),
        })
    }
}

/// GET /api/locations/search
/// Find a location by name
#[utoipa::path(
    get,
    path = "/api/locations/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "First matching location", body = Location),
        (status = 400, description = "Empty query"),
        (status = 404, description = "No location matches"),
        (status = 502, description = "Geocoding provider failed")
    )
)]
pub async fn search_location(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Location>> {
    let location = state.predictions.search_location(&query.q).await?;
    Ok(Json(location))
}

/// GET /api/locations/reverse
/// Name the place at the given coordinates
///
/// Falls back to a "Lat: …, Lon: …" label when the provider has no name.
#[utoipa::path(
    get,
    path = "/api/locations/reverse",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Location with name", body = Location),
        (status = 400, description = "Coordinates out of range")
    )
)]
pub async fn reverse_location(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<Location>> {
    let location = state.predictions.locate(query.lat, query.lon).await?;
    Ok(Json(location))
}

/// GET /api/weather
/// Current weather at the given coordinates
#[utoipa::path(
    get,
    path = "/api/weather",
    params(CoordinatesQuery),
    responses(
        (status = 200, description = "Current conditions, default values on provider failure", body = WeatherResponse),
        (status = 400, description = "Coordinates out of range")
    )
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<WeatherResponse>> {
    let (weather, warning) = state.predictions.current_weather(query.lat, query.lon).await?;
    Ok(Json(WeatherResponse {
        latitude: query.lat,
        longitude: query.lon,
        weather,
        warning,
    }))
}

/// GET /api/prediction
/// Hourly power prediction and daily savings
///
/// Combines current weather, utility rate and timezone for the location.
/// Provider failures are reported in `warnings` and never fail the request.
#[utoipa::path(
    get,
    path = "/api/prediction",
    params(PredictionQuery),
    responses(
        (status = 200, description = "Prediction for the selected hours", body = Prediction),
        (status = 400, description = "Invalid hour range, panel or coordinates")
    )
)]
pub async fn get_prediction(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> Result<Json<Prediction>> {
    let request = query.into_request(&state)?;
    let prediction = state.predictions.predict(request).await?;
    Ok(Json(prediction))
}

/// GET /api/defaults
/// Input bounds and defaults for the dashboard controls
#[utoipa::path(
    get,
    path = "/api/defaults",
    responses((status = 200, description = "Slider bounds and defaults", body = DefaultsResponse))
)]
pub async fn get_defaults(State(state): State<AppState>) -> Json<DefaultsResponse> {
    let panel = &state.config.panel;
    Json(DefaultsResponse {
        panel_area_m2: SliderBounds {
            min: PanelSpec::MIN_AREA_M2,
            max: PanelSpec::MAX_AREA_M2,
            default: panel.area_m2,
        },
        panel_efficiency_pct: SliderBounds {
            min: PanelSpec::MIN_EFFICIENCY_PCT,
            max: PanelSpec::MAX_EFFICIENCY_PCT,
            default: panel.efficiency * 100.0,
        },
        start_hour: SliderBounds {
            min: MIN_HOUR as f64,
            max: MAX_HOUR as f64,
            default: DEFAULT_START_HOUR as f64,
        },
        end_hour: SliderBounds {
            min: MIN_HOUR as f64,
            max: MAX_HOUR as f64,
            default: DEFAULT_END_HOUR as f64,
        },
        monthly_cost: state.predictions.default_monthly_cost(),
    })
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service status", body = HealthStatus))
)]
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    let providers = &state.config.providers;
    Json(HealthStatus {
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        price_provider_configured: providers.nrel.api_key.is_some(),
        timezone_provider_configured: providers.timezonedb.api_key.is_some(),
    })
}

use utoipa::OpenApi;
use crate::controllers::prediction_controller;
use crate::models::{power, weather};

#[derive(OpenApi)]
#[openapi(
    paths(
        prediction_controller::search_location,
        prediction_controller::reverse_location,
        prediction_controller::get_weather,
        prediction_controller::get_prediction,
        prediction_controller::get_defaults,
        prediction_controller::get_health
    ),
    components(
        schemas(
            power::Prediction,
            power::HourlyPoint,
            power::DailySummary,
            power::ElectricityPrice,
            power::PriceSource,
            power::PanelSpec,
            power::WeatherResponse,
            power::DefaultsResponse,
            power::SliderBounds,
            power::HealthStatus,
            weather::Location,
            weather::WeatherObservation
        )
    ),
    tags(
        (name = "solar-power-predictor", description = "Solar Power Prediction API")
    )
)]
pub struct ApiDoc;

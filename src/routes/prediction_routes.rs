use axum::{routing::get, Router};
use crate::controllers::prediction_controller::{
    // Locations & weather
    search_location, reverse_location, get_weather,
    // Prediction
    get_prediction,
    // Dashboard support
    get_defaults, get_health,
};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/locations/search",  get(search_location))
        .route("/locations/reverse", get(reverse_location))
        .route("/weather",           get(get_weather))
        .route("/prediction",        get(get_prediction))
        .route("/defaults",          get(get_defaults))
        .route("/health",            get(get_health))
        .with_state(state)
}

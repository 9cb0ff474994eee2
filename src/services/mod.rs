pub mod aggregation;
pub mod prediction_service;
pub mod pricing_service;
pub mod solar_algorithm;
pub mod timezone_service;
pub mod weather_service;

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{AppError, Result};

/// Shared reqwest client for the external providers.
pub fn http_client(timeout_s: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_s.max(1)))
        .build()?;
    Ok(client)
}

/// Turns a non-2xx response into `AppError::UpstreamStatus`.
fn ensure_success(provider: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::UpstreamStatus { provider, status: status.as_u16() });
    }
    Ok(response)
}

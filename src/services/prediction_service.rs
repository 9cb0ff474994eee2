use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::power::{
    ElectricityPrice, HourlyPoint, Observation, PanelSpec, Prediction, PredictionRequest, PriceSource,
};
use crate::models::weather::{Location, WeatherObservation};
use crate::services::aggregation::{price_from_monthly_cost, summarize_day};
use crate::services::pricing_service::PriceProvider;
use crate::services::solar_algorithm::{self, SunPosition};
use crate::services::timezone_service::TimezoneProvider;
use crate::services::weather_service::WeatherProvider;

/// Hour range offered by the dashboard slider (inclusive).
pub const MIN_HOUR: u32 = 6;
pub const MAX_HOUR: u32 = 18;
pub const DEFAULT_START_HOUR: u32 = 8;
pub const DEFAULT_END_HOUR: u32 = 16;

pub const WEATHER_FALLBACK_WARNING: &str = "Error fetching weather data. Using default values.";
pub const PRICE_FALLBACK_WARNING: &str = "Electricity price data unavailable for this location.";
pub const TIMEZONE_FALLBACK_WARNING: &str = "Timezone data not available. Defaulting to UTC.";

/// Orchestrates the providers and the estimator for one prediction.
/// Provider failures never abort a prediction; they become warnings.
pub struct PredictionService {
    weather: Arc<dyn WeatherProvider>,
    prices: Arc<dyn PriceProvider>,
    timezones: Arc<dyn TimezoneProvider>,
    sun: Arc<dyn SunPosition>,
    default_monthly_cost: f64,
}

impl PredictionService {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        prices: Arc<dyn PriceProvider>,
        timezones: Arc<dyn TimezoneProvider>,
        sun: Arc<dyn SunPosition>,
        config: &Config,
    ) -> Self {
        Self {
            weather,
            prices,
            timezones,
            sun,
            default_monthly_cost: config.pricing.default_monthly_cost,
        }
    }

    pub async fn search_location(&self, query: &str) -> Result<Location> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput("search query is empty".to_string()));
        }
        self.weather
            .search_location(query)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no location matches '{query}'")))
    }

    /// Location with a reverse-geocoded name, or a coordinate label when the
    /// provider has none.
    pub async fn locate(&self, lat: f64, lon: f64) -> Result<Location> {
        validate_coordinates(lat, lon)?;
        let name = match self.weather.reverse_geocode(lat, lon).await {
            Ok(Some(name)) => name,
            Ok(None) => Location::fallback_name(lat, lon),
            Err(e) => {
                warn!(error = %e, lat, lon, "reverse geocoding failed");
                Location::fallback_name(lat, lon)
            }
        };
        Ok(Location { latitude: lat, longitude: lon, name })
    }

    /// Current conditions, or the default observation plus a warning.
    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<(WeatherObservation, Option<String>)> {
        validate_coordinates(lat, lon)?;
        Ok(match self.weather.current_weather(lat, lon).await {
            Ok(obs) => (obs, None),
            Err(e) => {
                warn!(error = %e, lat, lon, "weather lookup failed, using defaults");
                (WeatherObservation::default(), Some(WEATHER_FALLBACK_WARNING.to_string()))
            }
        })
    }

    pub async fn predict(&self, req: PredictionRequest) -> Result<Prediction> {
        validate_coordinates(req.latitude, req.longitude)?;
        validate_hours(req.start_hour, req.end_hour)?;
        if !(req.monthly_cost >= 0.0) {
            return Err(AppError::InvalidInput("monthly_cost must not be negative".to_string()));
        }

        let (lat, lon) = (req.latitude, req.longitude);
        let mut warnings = Vec::new();

        let (location, weather, rate, zone) = tokio::join!(
            self.locate(lat, lon),
            self.current_weather(lat, lon),
            self.prices.residential_rate(lat, lon),
            self.timezones.timezone(lat, lon),
        );
        let location = location?;

        let (weather, weather_warning) = weather?;
        warnings.extend(weather_warning);

        let price = match rate {
            Ok(Some(rate)) => ElectricityPrice { price_per_kwh: rate, source: PriceSource::Provider },
            other => {
                if let Err(e) = other {
                    warn!(error = %e, "utility rate lookup failed");
                }
                warnings.push(PRICE_FALLBACK_WARNING.to_string());
                ElectricityPrice {
                    price_per_kwh: price_from_monthly_cost(req.monthly_cost),
                    source: PriceSource::MonthlyCost,
                }
            }
        };

        let tz = match zone {
            Ok(Some(tz)) => tz,
            Ok(None) => {
                warnings.push(TIMEZONE_FALLBACK_WARNING.to_string());
                Tz::UTC
            }
            Err(e) => {
                warn!(error = %e, "timezone lookup failed");
                warnings.push(format!("Could not fetch timezone: {e}. Defaulting to UTC."));
                Tz::UTC
            }
        };

        let date = req.date.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());
        let hours: Vec<u32> = (req.start_hour..=req.end_hour).collect();
        let (hourly, skipped) = hourly_series(self.sun.as_ref(), lat, lon, date, tz, &hours, &weather, &req.panel);
        for hour in skipped {
            warnings.push(format!("{hour}:00 does not exist on {date} in {tz}, skipped"));
        }

        let power: Vec<f64> = hourly.iter().map(|p| p.power_w).collect();
        let summary = summarize_day(&power, price.price_per_kwh);

        info!(
            location = %location.name,
            %date,
            energy_kwh = summary.energy_kwh,
            warnings = warnings.len(),
            "prediction computed"
        );

        Ok(Prediction {
            location,
            date,
            timezone: tz.name().to_string(),
            weather,
            price,
            panel: req.panel,
            hourly,
            summary,
            warnings,
        })
    }

    pub fn default_monthly_cost(&self) -> f64 {
        self.default_monthly_cost
    }
}

/// Irradiance and power for each whole hour of `date` in `tz`, all under the
/// same weather. Returns the points and the hours that fall into a DST gap.
#[allow(clippy::too_many_arguments)]
pub fn hourly_series(
    sun: &dyn SunPosition,
    lat: f64,
    lon: f64,
    date: NaiveDate,
    tz: Tz,
    hours: &[u32],
    weather: &WeatherObservation,
    panel: &PanelSpec,
) -> (Vec<HourlyPoint>, Vec<u32>) {
    let mut points = Vec::with_capacity(hours.len());
    let mut skipped = Vec::new();

    for &hour in hours {
        let Some(naive) = date.and_hms_opt(hour, 0, 0) else {
            skipped.push(hour);
            continue;
        };
        let Some(local) = tz.from_local_datetime(&naive).earliest() else {
            skipped.push(hour);
            continue;
        };

        let obs = Observation::new(lat, lon, local.with_timezone(&Utc), weather);
        let zenith = solar_algorithm::calculate_zenith_angle(sun, lat, lon, obs.timestamp);
        let ghi = solar_algorithm::ghi_from_zenith(zenith, obs.cloud_cover_pct, obs.temperature_c, obs.humidity_pct);

        points.push(HourlyPoint {
            hour,
            timestamp: local.fixed_offset(),
            zenith_deg: zenith,
            ghi_w_m2: ghi,
            power_w: solar_algorithm::panel_power_output(ghi, panel),
        });
    }

    (points, skipped)
}

fn validate_coordinates(lat: f64, lon: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::InvalidInput(format!("latitude {lat} out of range")));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::InvalidInput(format!("longitude {lon} out of range")));
    }
    Ok(())
}

fn validate_hours(start: u32, end: u32) -> Result<()> {
    if start < MIN_HOUR || end > MAX_HOUR {
        return Err(AppError::InvalidInput(format!(
            "hour range must lie within {MIN_HOUR}..={MAX_HOUR}, got {start}..={end}"
        )));
    }
    if start > end {
        return Err(AppError::InvalidInput(format!("start_hour {start} is after end_hour {end}")));
    }
    Ok(())
}

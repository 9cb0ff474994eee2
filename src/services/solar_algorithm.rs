//! ============================================================
//!  Irradiance & Power Estimation
//!
//!  Pipeline:
//!   1. Solar geometry  – sun altitude for (lat, lon, instant),
//!                        behind the `SunPosition` trait (NREL SPA)
//!   2. Zenith angle    – 90° − altitude, floored at 0°
//!   3. Irradiance      – simplified DNI / DHI split driven by cloud
//!                        cover, humidity scattering and a temperature
//!                        correction → GHI on the horizontal plane
//!   4. Power output    – P = GHI × area × efficiency
//! ============================================================

use chrono::{DateTime, Datelike, Timelike, Utc};
use solar_positioning::{spa, time::DeltaT, RefractionCorrection};
use std::f64::consts::PI;
use tracing::warn;

use crate::models::power::{Observation, PanelSpec};

// ─── Model constants ─────────────────────────────────────────
const DEG: f64 = PI / 180.0;
/// Clear-sky direct normal irradiance (W/m²)
const CLEAR_SKY_DNI: f64 = 1000.0;
/// Diffuse horizontal irradiance under full overcast (W/m²)
const OVERCAST_DHI: f64 = 100.0;
/// Relative change per °C away from the 25 °C reference
const TEMP_COEFFICIENT: f64 = 0.004;
const REFERENCE_TEMP_C: f64 = 25.0;

pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;
pub const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// Source of the sun's altitude above the horizon.
pub trait SunPosition: Send + Sync {
    /// Altitude in degrees; negative when the sun is below the horizon.
    fn altitude_deg(&self, lat_deg: f64, lon_deg: f64, at: DateTime<Utc>) -> f64;
}

/// NREL Solar Position Algorithm (Reda & Andreas, 2003) at sea level with
/// standard atmospheric refraction. ΔT is estimated from the date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaSunPosition;

impl SunPosition for SpaSunPosition {
    fn altitude_deg(&self, lat_deg: f64, lon_deg: f64, at: DateTime<Utc>) -> f64 {
        let position = DeltaT::estimate_from_date_like(at).and_then(|delta_t| {
            spa::solar_position(at, lat_deg, lon_deg, 0.0, delta_t, Some(RefractionCorrection::standard()))
        });
        match position {
            Ok(position) => position.elevation_angle(),
            Err(e) => {
                warn!(error = ?e, lat_deg, lon_deg, %at, "SPA rejected input, using Spencer geometry");
                SpencerSunPosition.altitude_deg(lat_deg, lon_deg, at)
            }
        }
    }
}

/// Spencer (1971) declination and equation of time with true local solar
/// time. Accurate to a fraction of a degree, no refraction correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpencerSunPosition;

impl SunPosition for SpencerSunPosition {
    fn altitude_deg(&self, lat_deg: f64, lon_deg: f64, at: DateTime<Utc>) -> f64 {
        let doy = at.ordinal() as f64;
        let ut_h = at.hour() as f64 + at.minute() as f64 / 60.0 + at.second() as f64 / 3600.0;

        let b = 2.0 * PI * (doy - 1.0) / 365.0;
        let decl = 0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin() - 0.006758 * (2.0 * b).cos()
            + 0.000907 * (2.0 * b).sin()
            - 0.002697 * (3.0 * b).cos()
            + 0.00148 * (3.0 * b).sin();

        let eot_min = 229.18
            * (0.000075 + 0.001868 * b.cos()
                - 0.032077 * b.sin()
                - 0.014615 * (2.0 * b).cos()
                - 0.04089 * (2.0 * b).sin());

        // True solar time (hours), hour angle negative before solar noon
        let tst_h = ut_h + lon_deg / 15.0 + eot_min / 60.0;
        let omega = 15.0 * (tst_h - 12.0) * DEG;

        let lat = lat_deg * DEG;
        let sin_alpha = lat.sin() * decl.sin() + lat.cos() * decl.cos() * omega.cos();
        sin_alpha.clamp(-1.0, 1.0).asin() / DEG
    }
}

/// Zenith angle in degrees, never negative.
pub fn calculate_zenith_angle(sun: &dyn SunPosition, lat_deg: f64, lon_deg: f64, at: DateTime<Utc>) -> f64 {
    (90.0 - sun.altitude_deg(lat_deg, lon_deg, at)).max(0.0)
}

/// Global horizontal irradiance (W/m²) for a known zenith angle.
///
/// * `cloud_cover_pct` – 0 (clear) … 100 (overcast)
/// * `temperature_c`   – ambient, 25 °C is neutral
/// * `humidity_pct`    – attenuates the direct beam only
pub fn ghi_from_zenith(zenith_deg: f64, cloud_cover_pct: f64, temperature_c: f64, humidity_pct: f64) -> f64 {
    let cloud = cloud_cover_pct / 100.0;

    let dni = CLEAR_SKY_DNI * (1.0 - cloud) * (1.0 - humidity_pct / 100.0);
    let dhi = OVERCAST_DHI * cloud;

    let temperature_factor = 1.0 - TEMP_COEFFICIENT * (temperature_c - REFERENCE_TEMP_C);

    ((dni * (zenith_deg * DEG).cos() + dhi) * temperature_factor).max(0.0)
}

/// GHI (W/m²) for an observation, with the sun placed by `sun`.
#[allow(dead_code)]
pub fn calculate_ghi(sun: &dyn SunPosition, obs: &Observation) -> f64 {
    let zenith = calculate_zenith_angle(sun, obs.latitude, obs.longitude, obs.timestamp);
    ghi_from_zenith(zenith, obs.cloud_cover_pct, obs.temperature_c, obs.humidity_pct)
}

/// Instantaneous panel output (W).
pub fn calculate_power_output(ghi_w_m2: f64, panel_area_m2: f64, panel_efficiency: f64) -> f64 {
    ghi_w_m2 * panel_area_m2 * panel_efficiency
}

pub fn panel_power_output(ghi_w_m2: f64, panel: &PanelSpec) -> f64 {
    calculate_power_output(ghi_w_m2, panel.area_m2, panel.efficiency)
}

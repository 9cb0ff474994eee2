use crate::models::power::DailySummary;

/// kg CO₂ avoided per kWh of solar generation.
pub const CO2_KG_PER_KWH: f64 = 0.85;
const DAYS_PER_YEAR: f64 = 365.0;

/// Rolls hourly power samples (W) into daily energy and money figures.
/// Each sample stands for one hour, so the sum in Wh divided by 1000 is kWh.
pub fn summarize_day(hourly_power_w: &[f64], price_per_kwh: f64) -> DailySummary {
    let energy_kwh = hourly_power_w.iter().sum::<f64>() / 1000.0;
    let daily_savings = energy_kwh * price_per_kwh;

    DailySummary {
        energy_kwh,
        daily_savings,
        annual_savings: daily_savings * DAYS_PER_YEAR,
        carbon_offset_kg: energy_kwh * CO2_KG_PER_KWH,
    }
}

/// Per-kWh rate derived from a monthly electricity bill when the utility
/// rate provider has nothing for the location.
// Divides by 30 twice, which assumes a 30 kWh daily consumption.
pub fn price_from_monthly_cost(monthly_cost: f64) -> f64 {
    (monthly_cost / 30.0) / 30.0
}

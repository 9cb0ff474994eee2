use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::power::PanelSpec;

pub const OPENWEATHER_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const NREL_KEY_VAR: &str = "NREL_API_KEY";
pub const TIMEZONE_KEY_VAR: &str = "TIMEZONE_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub panel: PanelDefaults,
    pub pricing: PricingConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory served for any path outside `/api` and `/scalar`.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080, static_dir: "static".to_string() }
    }
}

/// Standard panel assumptions used when a request leaves them out.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PanelDefaults {
    pub area_m2: f64,
    pub efficiency: f64,
}

impl Default for PanelDefaults {
    fn default() -> Self {
        Self { area_m2: 1.68, efficiency: 0.22 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    /// Monthly bill assumed when no utility rate is available and the
    /// request does not carry one.
    pub default_monthly_cost: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { default_monthly_cost: 100.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub timeout_s: u64,
    pub openweather: ProviderConfig,
    pub nrel: ProviderConfig,
    pub timezonedb: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_s: 10,
            openweather: ProviderConfig::with_url("http://api.openweathermap.org"),
            nrel: ProviderConfig::with_url("https://developer.nrel.gov"),
            timezonedb: ProviderConfig::with_url("http://api.timezonedb.com"),
        }
    }
}

impl ProvidersConfig {
    /// A provider section given without `base_url` keeps the public endpoint.
    pub fn fill_missing_urls(&mut self) {
        let defaults = ProvidersConfig::default();
        for (cfg, default) in [
            (&mut self.openweather, defaults.openweather),
            (&mut self.nrel, defaults.nrel),
            (&mut self.timezonedb, defaults.timezonedb),
        ] {
            if cfg.base_url.trim().is_empty() {
                cfg.base_url = default.base_url;
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    fn with_url(base_url: &str) -> Self {
        Self { base_url: base_url.to_string(), api_key: None }
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from the built-in defaults.
    /// API keys from the environment override whatever the file holds.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config: Config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Config::default()
        };

        config.providers.fill_missing_urls();
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let key = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(k) = key(OPENWEATHER_KEY_VAR) {
            self.providers.openweather.api_key = Some(k);
        }
        if let Some(k) = key(NREL_KEY_VAR) {
            self.providers.nrel.api_key = Some(k);
        }
        if let Some(k) = key(TIMEZONE_KEY_VAR) {
            self.providers.timezonedb.api_key = Some(k);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.providers.openweather.api_key.is_none() {
            return Err(AppError::Config(format!(
                "OpenWeather API key is missing, set {OPENWEATHER_KEY_VAR}"
            )));
        }
        if self.providers.nrel.api_key.is_none() {
            warn!("NREL API key is missing, electricity price will be derived from the monthly cost");
        }
        if self.providers.timezonedb.api_key.is_none() {
            warn!("TimeZoneDB API key is missing, predictions will use UTC");
        }
        // Defaults must be something the dashboard itself would accept
        PanelSpec::within_dashboard_bounds(self.panel.area_m2, self.panel.efficiency)
            .map_err(|e| AppError::Config(format!("panel defaults out of range: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.panel.area_m2, 1.68);
        assert_eq!(config.panel.efficiency, 0.22);
        assert_eq!(config.pricing.default_monthly_cost, 100.0);
        assert_eq!(config.providers.openweather.base_url, "http://api.openweathermap.org");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"server": {"port": 9000}, "providers": {"timeout_s": 3}}"#).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.static_dir, "static");
        assert_eq!(config.providers.timeout_s, 3);
        assert_eq!(config.providers.nrel.base_url, "https://developer.nrel.gov");
    }

    #[test]
    fn provider_section_without_url_keeps_public_endpoint() {
        let mut config: Config =
            serde_json::from_str(r#"{"providers": {"nrel": {"api_key": "k"}}}"#).unwrap();
        assert_eq!(config.providers.nrel.base_url, "");
        config.providers.fill_missing_urls();
        assert_eq!(config.providers.nrel.base_url, "https://developer.nrel.gov");
        assert_eq!(config.providers.nrel.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn env_keys_override_file_and_ignore_blanks() {
        let mut config = Config::default();
        config.providers.nrel.api_key = Some("from-file".to_string());
        config.apply_env(|name| match name {
            OPENWEATHER_KEY_VAR => Some("ow".to_string()),
            NREL_KEY_VAR => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.providers.openweather.api_key.as_deref(), Some("ow"));
        assert_eq!(config.providers.nrel.api_key.as_deref(), Some("from-file"));
        assert!(config.providers.timezonedb.api_key.is_none());
    }

    #[test]
    fn missing_openweather_key_is_fatal() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn optional_keys_may_be_missing() {
        let mut config = Config::default();
        config.providers.openweather.api_key = Some("ow".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn out_of_range_panel_defaults_are_rejected() {
        let mut config = Config::default();
        config.providers.openweather.api_key = Some("ow".to_string());
        config.panel.efficiency = 1.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn panel_defaults_must_fit_dashboard_bounds() {
        let mut config = Config::default();
        config.providers.openweather.api_key = Some("ow".to_string());

        config.panel.efficiency = 0.35;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.panel.efficiency = 0.22;
        config.panel.area_m2 = 0.5;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.panel.area_m2 = 1000.0;
        config.panel.efficiency = 0.3;
        assert!(config.validate().is_ok());
    }
}

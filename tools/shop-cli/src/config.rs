//! CLI configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use shop_commerce::cart::PricingPolicy;
use shop_commerce::money::{Currency, Money};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// REST API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local state settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Shipping, tax and currency.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Log level and format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// API root, without the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout. Unset leaves the HTTP client's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

/// Local state settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// State file, relative to the working directory unless absolute.
    #[serde(default = "default_storage_path")]
    pub path: String,

    /// Prefix for every storage key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_storage_path() -> String {
    ".shop/state.json".to_string()
}

fn default_namespace() -> String {
    "shop".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            namespace: default_namespace(),
        }
    }
}

/// Pricing settings, in major currency units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingConfig {
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Shipping is free strictly above this subtotal.
    #[serde(default = "default_threshold")]
    pub free_shipping_threshold: f64,

    #[serde(default = "default_shipping_fee")]
    pub flat_shipping_fee: f64,

    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: f64,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_threshold() -> f64 {
    500.0
}

fn default_shipping_fee() -> f64 {
    50.0
}

fn default_tax_rate() -> f64 {
    8.0
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            free_shipping_threshold: default_threshold(),
            flat_shipping_fee: default_shipping_fee(),
            tax_rate_percent: default_tax_rate(),
        }
    }
}

impl PricingConfig {
    pub fn currency(&self) -> Result<Currency> {
        match Currency::from_code(&self.currency) {
            Some(currency) => Ok(currency),
            None => bail!("Unsupported currency in [pricing]: {}", self.currency),
        }
    }

    /// Build the pricing policy.
    pub fn policy(&self) -> Result<PricingPolicy> {
        let currency = self.currency()?;
        if !(0.0..=100.0).contains(&self.tax_rate_percent) {
            bail!(
                "tax_rate_percent must be between 0 and 100, got {}",
                self.tax_rate_percent
            );
        }
        if self.free_shipping_threshold < 0.0 || self.flat_shipping_fee < 0.0 {
            bail!("Shipping amounts in [pricing] must not be negative");
        }

        Ok(PricingPolicy {
            free_shipping_threshold: Money::from_decimal(self.free_shipping_threshold, currency),
            flat_shipping_fee: Money::from_decimal(self.flat_shipping_fee, currency),
            tax_rate_bps: (self.tax_rate_percent * 100.0).round() as u32,
        })
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Generate a default shop.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storefront CLI configuration

[api]
base_url = "http://localhost:5000"
# timeout_secs = 30

[storage]
path = ".shop/state.json"
namespace = "shop"

[pricing]
currency = "USD"
free_shipping_threshold = 500.0
flat_shipping_fee = 50.0
tax_rate_percent = 8.0

[logging]
level = "info"
format = "compact"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_matches_defaults() {
        let parsed: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, CliConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: CliConfig = toml::from_str(
            r#"
            [pricing]
            currency = "inr"
            tax_rate_percent = 18.0

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.api.base_url, "http://localhost:5000");
        assert_eq!(parsed.logging.format, LogFormat::Json);

        let policy = parsed.pricing.policy().unwrap();
        assert_eq!(policy.currency(), Currency::INR);
        assert_eq!(policy.tax_rate_bps, 1800);
        assert_eq!(policy.free_shipping_threshold.amount_cents, 50_000);
    }

    #[test]
    fn test_default_policy_is_standard() {
        let policy = PricingConfig::default().policy().unwrap();
        assert_eq!(policy, PricingPolicy::standard(Currency::USD));
    }

    #[test]
    fn test_rejects_bad_pricing() {
        let mut pricing = PricingConfig {
            currency: "XYZ".to_string(),
            ..PricingConfig::default()
        };
        assert!(pricing.policy().is_err());

        pricing.currency = "USD".to_string();
        pricing.tax_rate_percent = 150.0;
        assert!(pricing.policy().is_err());
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");

        let mut config = CliConfig::default();
        config.api.timeout_secs = Some(10);
        config.save(&path).unwrap();

        assert_eq!(CliConfig::load(&path).unwrap(), config);
    }
}

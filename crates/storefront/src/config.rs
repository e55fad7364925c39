//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 0.0.0.0)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal in minor units at which shipping is
//!   free (default: 16600)
//! - `FLAT_SHIPPING_FEE` - Shipping below the threshold, minor units
//!   (default: 1245)
//! - `TAX_RATE_PERCENT` - Tax on the subtotal, e.g. `10` or `7.25`
//!   (default: 10)
//! - `STORE_CURRENCY` - ISO currency code (default: INR)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use lumiere_core::{CurrencyCode, Money, PricingPolicy};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL; `https` turns on `Secure` cookies
    pub base_url: Url,
    /// Shipping and tax rules applied to every cart
    pub pricing: PricingPolicy,
    pub currency: CurrencyCode,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = parse_base_url(
            &get_required_env("STOREFRONT_BASE_URL")?,
            "STOREFRONT_BASE_URL",
        )?;

        let pricing = pricing_policy(
            get_optional_env("FREE_SHIPPING_THRESHOLD").as_deref(),
            get_optional_env("FLAT_SHIPPING_FEE").as_deref(),
            get_optional_env("TAX_RATE_PERCENT").as_deref(),
        )?;
        let currency = get_env_or_default("STORE_CURRENCY", "INR")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("STORE_CURRENCY".to_string(), e))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            pricing,
            currency,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

/// Build the pricing policy, keeping defaults for unset values.
fn pricing_policy(
    threshold: Option<&str>,
    flat_fee: Option<&str>,
    tax_percent: Option<&str>,
) -> Result<PricingPolicy, ConfigError> {
    let mut policy = PricingPolicy::default();

    if let Some(value) = threshold {
        policy.free_shipping_threshold = parse_minor_units(value, "FREE_SHIPPING_THRESHOLD")?;
    }
    if let Some(value) = flat_fee {
        policy.flat_shipping_fee = parse_minor_units(value, "FLAT_SHIPPING_FEE")?;
    }
    if let Some(value) = tax_percent {
        let percent = Decimal::from_str(value.trim()).map_err(|e| {
            ConfigError::InvalidEnvVar("TAX_RATE_PERCENT".to_string(), e.to_string())
        })?;
        policy.tax_rate = percent / Decimal::ONE_HUNDRED;
    }

    policy
        .validate()
        .map_err(|e| ConfigError::InvalidEnvVar("pricing".to_string(), e.to_string()))?;
    Ok(policy)
}

fn parse_minor_units(value: &str, var_name: &str) -> Result<Money, ConfigError> {
    let minor = value
        .trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    Ok(Money::from_minor(minor))
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_base_url(value: &str, var_name: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_defaults() {
        let policy = pricing_policy(None, None, None).unwrap();
        assert_eq!(policy, PricingPolicy::default());
    }

    #[test]
    fn test_pricing_overrides() {
        let policy = pricing_policy(Some("50000"), Some(" 999 "), Some("7.25")).unwrap();
        assert_eq!(policy.free_shipping_threshold, Money::from_minor(50_000));
        assert_eq!(policy.flat_shipping_fee, Money::from_minor(999));
        assert_eq!(policy.tax_rate, Decimal::new(725, 4));
    }

    #[test]
    fn test_pricing_rejects_garbage_and_negatives() {
        assert!(matches!(
            pricing_policy(Some("lots"), None, None),
            Err(ConfigError::InvalidEnvVar(name, _)) if name == "FREE_SHIPPING_THRESHOLD"
        ));
        assert!(pricing_policy(None, Some("-1"), None).is_err());
        assert!(pricing_policy(None, None, Some("-5")).is_err());
    }

    #[test]
    fn test_parse_base_url() {
        assert!(parse_base_url("https://shop.lumiere.test", "X").is_ok());
        assert!(parse_base_url("ftp://shop.lumiere.test", "X").is_err());
        assert!(parse_base_url("not a url", "X").is_err());
    }

    #[test]
    fn test_socket_addr_and_secure() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.lumiere.test".parse().unwrap(),
            pricing: PricingPolicy::default(),
            currency: CurrencyCode::INR,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        };

        assert_eq!(config.socket_addr().port(), 3000);
        assert!(config.is_secure());
    }
}

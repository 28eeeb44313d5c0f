//! Application configuration

use std::env;

use common::error::{Error, Result};

use crate::api::AmountPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening address
    pub addr: String,
    /// Policy for charge amounts
    pub charge_policy: AmountPolicy,
    /// Policy for use amounts
    pub use_policy: AmountPolicy,
}

fn env_u64(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("{} must be an unsigned integer: {}", name, e))),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Create a new configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let charge = AmountPolicy::charge();
        let spend = AmountPolicy::spend();

        Ok(Self {
            addr: env::var("API_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            charge_policy: AmountPolicy::new(
                env_u64("CHARGE_MIN")?.unwrap_or(charge.min),
                env_u64("CHARGE_UNIT")?.unwrap_or(charge.unit),
            )?,
            use_policy: AmountPolicy::new(
                env_u64("USE_MIN")?.unwrap_or(spend.min),
                env_u64("USE_UNIT")?.unwrap_or(spend.unit),
            )?,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            charge_policy: AmountPolicy::charge(),
            use_policy: AmountPolicy::spend(),
        }
    }
}

//! Amount policies applied to request bodies before the point service is called

use common::error::{Error, Result};

use crate::error::ApiError;

/// Lower bound and granularity an amount must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountPolicy {
    /// Smallest accepted amount
    pub min: u64,
    /// Accepted amounts are multiples of this
    pub unit: u64,
}

impl AmountPolicy {
    /// Create a policy, rejecting a zero minimum or unit
    pub fn new(min: u64, unit: u64) -> Result<Self> {
        if min == 0 || unit == 0 {
            return Err(Error::ConfigurationError(format!(
                "amount policy needs a positive minimum and unit, got min={} unit={}",
                min, unit
            )));
        }
        Ok(Self { min, unit })
    }

    /// Default charge policy: at least 1000, in steps of 1000
    pub fn charge() -> Self {
        Self { min: 1000, unit: 1000 }
    }

    /// Default use policy: positive, in steps of 100
    pub fn spend() -> Self {
        Self { min: 1, unit: 100 }
    }

    /// Check a requested amount and convert it to the service's unsigned unit
    pub fn check(&self, amount: i64) -> std::result::Result<u64, ApiError> {
        let amount = u64::try_from(amount)
            .ok()
            .filter(|amount| *amount >= self.min)
            .ok_or_else(|| ApiError::Validation(format!("amount must be at least {}", self.min)))?;

        if amount % self.unit != 0 {
            return Err(ApiError::Validation(format!(
                "amount must be a multiple of {}",
                self.unit
            )));
        }

        Ok(amount)
    }
}

//! Error types for the point ledger
//!
//! A single error enum is shared by the point service and the HTTP gateway so
//! that business rejections, store failures and validation problems keep their
//! identity all the way to the response mapper.

use std::fmt::Display;
use thiserror::Error;

use crate::model::point::UserId;

/// Point ledger error type
#[derive(Debug, Error)]
pub enum Error {
    /// A use request asked for more points than the account holds
    #[error("Insufficient balance: user {user_id} has {balance} points, requested {amount}")]
    InsufficientBalance {
        user_id: UserId,
        balance: u64,
        amount: u64,
    },

    /// Malformed or out-of-policy amount
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Balance or history store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Waiting for an account lock exceeded the configured bound
    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is an expected business outcome rather than a fault
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InsufficientBalance { .. } | Error::ValidationError(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::ValidationError(msg) => Error::ValidationError(format!("{}: {}", context, msg)),
                Error::Store(msg) => Error::Store(format!("{}: {}", context, msg)),
                Error::LockTimeout(msg) => Error::LockTimeout(format!("{}: {}", context, msg)),
                Error::ConfigurationError(msg) => Error::ConfigurationError(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                // Structured variants carry their own context
                e @ Error::InsufficientBalance { .. } => e,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_prefixed_on_message_variants() {
        let result: Result<()> = Err(Error::Store("connection reset".to_string()));
        let err = result.with_context(|| "Failed to read points for user 7").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Store error: Failed to read points for user 7: connection reset"
        );
    }

    #[test]
    fn insufficient_balance_passes_through_context() {
        let result: Result<()> = Err(Error::InsufficientBalance {
            user_id: 1,
            balance: 500,
            amount: 1000,
        });
        let err = result.with_context(|| "ignored").unwrap_err();

        assert!(matches!(
            err,
            Error::InsufficientBalance { user_id: 1, balance: 500, amount: 1000 }
        ));
        assert!(err.is_rejection());
    }
}

//! Point balance and history models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Account identifier, also used as the lock key
pub type UserId = i64;

/// Current point balance of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct UserPoint {
    /// User ID
    pub id: UserId,
    /// Point balance
    pub point: u64,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserPoint {
    /// Balance of a user that has never been charged
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            point: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Kind of balance mutation recorded in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Points added
    Charge,
    /// Points spent
    Use,
}

impl TransactionType {
    /// Signed effect of `amount` on a balance
    pub fn signed(self, amount: u64) -> i128 {
        match self {
            TransactionType::Charge => amount as i128,
            TransactionType::Use => -(amount as i128),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Charge => write!(f, "CHARGE"),
            TransactionType::Use => write!(f, "USE"),
        }
    }
}

/// Immutable record of one successful balance mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
pub struct PointHistory {
    /// Monotonically increasing record ID
    pub id: u64,
    /// User whose balance changed
    pub user_id: UserId,
    /// Kind of mutation
    pub transaction_type: TransactionType,
    /// Amount charged or used
    pub amount: u64,
    /// Timestamp of the persisted balance this record documents
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_uses_upper_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&TransactionType::Charge).unwrap(), "\"CHARGE\"");
        assert_eq!(serde_json::to_string(&TransactionType::Use).unwrap(), "\"USE\"");
        assert_eq!(TransactionType::Use.to_string(), "USE");
    }

    #[test]
    fn signed_amounts() {
        assert_eq!(TransactionType::Charge.signed(1000), 1000);
        assert_eq!(TransactionType::Use.signed(300), -300);
    }

    #[test]
    fn empty_point_starts_at_zero() {
        let point = UserPoint::empty(42);
        assert_eq!(point.id, 42);
        assert_eq!(point.point, 0);
    }
}

//! Point service implementation

use std::sync::Arc;

use common::error::{Error, ErrorExt, Result};
use common::model::point::{PointHistory, TransactionType, UserId, UserPoint};
use tracing::{debug, info};

use crate::config::PointServiceConfig;
use crate::lock::KeyLockRegistry;
use crate::repository::{
    InMemoryPointHistoryRepository, InMemoryUserPointRepository, PointHistoryRepository,
    UserPointRepository,
};

/// Point service for charging, using and reading user points.
///
/// Every mutation runs read, validate, write and history append while holding
/// the user's lock from the [`KeyLockRegistry`], so mutations on one user are
/// serialized and mutations on different users run in parallel. Reads take no
/// lock and may miss a mutation that is still in flight.
pub struct PointService {
    /// Balance store
    points: Arc<dyn UserPointRepository>,
    /// History store
    histories: Arc<dyn PointHistoryRepository>,
    /// One lock per user
    locks: KeyLockRegistry<UserId>,
    /// Log every appended history record
    history_logging: bool,
}

impl PointService {
    /// Create a new point service backed by in-memory stores
    pub fn new() -> Self {
        Self::with_repositories(
            Arc::new(InMemoryUserPointRepository::new()),
            Arc::new(InMemoryPointHistoryRepository::new()),
        )
    }

    /// Create a new point service over the given stores
    pub fn with_repositories(
        points: Arc<dyn UserPointRepository>,
        histories: Arc<dyn PointHistoryRepository>,
    ) -> Self {
        Self {
            points,
            histories,
            locks: KeyLockRegistry::new(),
            history_logging: false,
        }
    }

    /// Create a new point service with in-memory stores shaped by a configuration
    pub fn with_config(config: &PointServiceConfig) -> Self {
        let latency = config.store_latency();
        let locks = match config.lock_timeout() {
            Some(timeout) => KeyLockRegistry::with_timeout(timeout),
            None => KeyLockRegistry::new(),
        };

        Self {
            points: Arc::new(InMemoryUserPointRepository::with_latency(latency)),
            histories: Arc::new(InMemoryPointHistoryRepository::with_latency(latency)),
            locks,
            history_logging: config.history_logging,
        }
    }

    /// Get a user's current balance
    pub async fn get_point(&self, user_id: UserId) -> Result<UserPoint> {
        self.points
            .get_point(user_id)
            .await
            .with_context(|| format!("Failed to read points for user {}", user_id))
    }

    /// Get a user's charge/use history in the order it happened
    pub async fn get_histories(&self, user_id: UserId) -> Result<Vec<PointHistory>> {
        self.histories
            .list_by_user(user_id)
            .await
            .with_context(|| format!("Failed to read point history for user {}", user_id))
    }

    /// Add `amount` points to a user's balance
    pub async fn charge_point(&self, user_id: UserId, amount: u64) -> Result<UserPoint> {
        info!("Charging {} points to user {}", amount, user_id);
        self.apply(user_id, amount, TransactionType::Charge).await
    }

    /// Spend `amount` points from a user's balance.
    ///
    /// Fails with [`Error::InsufficientBalance`] and changes nothing when the
    /// balance is smaller than `amount`.
    pub async fn use_point(&self, user_id: UserId, amount: u64) -> Result<UserPoint> {
        info!("Using {} points from user {}", amount, user_id);
        self.apply(user_id, amount, TransactionType::Use).await
    }

    /// Critical section shared by charge and use.
    ///
    /// Once the lock is held the section runs on its own task, so dropping the
    /// caller's future cannot stop it between the balance write and the
    /// history append. The guard moves into that task and is dropped on every
    /// return path, including `?` on store failures and the insufficient
    /// balance rejection.
    async fn apply(
        &self,
        user_id: UserId,
        amount: u64,
        transaction_type: TransactionType,
    ) -> Result<UserPoint> {
        let guard = self.locks.acquire(user_id).await?;

        let section = CriticalSection {
            points: self.points.clone(),
            histories: self.histories.clone(),
            history_logging: self.history_logging,
        };
        let handle = tokio::spawn(async move {
            let _guard = guard;
            section.run(user_id, amount, transaction_type).await
        });

        handle.await.map_err(|e| {
            Error::Internal(format!(
                "{} section for user {} did not complete: {}",
                transaction_type, user_id, e
            ))
        })?
    }

    /// Number of users that have had a lock created
    pub fn tracked_locks(&self) -> usize {
        self.locks.len()
    }
}

impl Default for PointService {
    fn default() -> Self {
        Self::new()
    }
}

/// Stores a critical section needs, owned so it can outlive the caller
struct CriticalSection {
    points: Arc<dyn UserPointRepository>,
    histories: Arc<dyn PointHistoryRepository>,
    history_logging: bool,
}

impl CriticalSection {
    /// Read, validate, write and append. Must only run while the user's lock is held.
    async fn run(
        self,
        user_id: UserId,
        amount: u64,
        transaction_type: TransactionType,
    ) -> Result<UserPoint> {
        let current = self
            .points
            .get_point(user_id)
            .await
            .with_context(|| format!("Failed to read points for user {}", user_id))?;

        let new_point = match transaction_type {
            TransactionType::Charge => current.point.checked_add(amount).ok_or_else(|| {
                Error::ValidationError(format!(
                    "Charging {} points would overflow the balance of user {}",
                    amount, user_id
                ))
            })?,
            TransactionType::Use => {
                if current.point < amount {
                    debug!(
                        "Rejecting use of {} points for user {} holding {}",
                        amount, user_id, current.point
                    );
                    return Err(Error::InsufficientBalance {
                        user_id,
                        balance: current.point,
                        amount,
                    });
                }
                current.point - amount
            }
        };

        let updated = self
            .points
            .set_point(user_id, new_point)
            .await
            .with_context(|| format!("Failed to store points for user {}", user_id))?;

        let history = self
            .histories
            .append(user_id, amount, transaction_type, updated.updated_at)
            .await
            .with_context(|| format!("Failed to append {} history for user {}", transaction_type, user_id))?;

        if self.history_logging {
            info!(
                "History #{}: user {} {} {} -> balance {}",
                history.id, user_id, transaction_type, amount, updated.point
            );
        }

        Ok(updated)
    }
}

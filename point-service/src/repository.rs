//! Repositories for point balances and point history

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::Result;
use common::model::point::{PointHistory, TransactionType, UserId, UserPoint};
use dashmap::DashMap;
use tracing::debug;

/// Balance store: current point balance per user
#[async_trait]
pub trait UserPointRepository: Send + Sync {
    /// Get a user's balance, a zero balance if the user has none yet
    async fn get_point(&self, user_id: UserId) -> Result<UserPoint>;

    /// Store a user's balance and return what was persisted
    async fn set_point(&self, user_id: UserId, point: u64) -> Result<UserPoint>;
}

/// History store: append-only mutation records per user
#[async_trait]
pub trait PointHistoryRepository: Send + Sync {
    /// Append a history record
    async fn append(
        &self,
        user_id: UserId,
        amount: u64,
        transaction_type: TransactionType,
        updated_at: DateTime<Utc>,
    ) -> Result<PointHistory>;

    /// All records of a user in insertion order
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PointHistory>>;
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

/// In-memory balance store
pub struct InMemoryUserPointRepository {
    /// Balances by user ID
    pub points: DashMap<UserId, UserPoint>,
    /// Artificial delay applied to every call
    latency: Duration,
}

impl InMemoryUserPointRepository {
    /// Create a new in-memory balance store
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Create a store that sleeps for `latency` on every call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            points: DashMap::new(),
            latency,
        }
    }
}

impl Default for InMemoryUserPointRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserPointRepository for InMemoryUserPointRepository {
    async fn get_point(&self, user_id: UserId) -> Result<UserPoint> {
        simulate_latency(self.latency).await;
        Ok(self
            .points
            .get(&user_id)
            .map(|p| p.clone())
            .unwrap_or_else(|| UserPoint::empty(user_id)))
    }

    async fn set_point(&self, user_id: UserId, point: u64) -> Result<UserPoint> {
        simulate_latency(self.latency).await;
        let user_point = UserPoint {
            id: user_id,
            point,
            updated_at: Utc::now(),
        };
        self.points.insert(user_id, user_point.clone());
        debug!("Stored balance {} for user {}", point, user_id);
        Ok(user_point)
    }
}

/// In-memory history store
pub struct InMemoryPointHistoryRepository {
    /// Records by user ID, each list in insertion order
    pub histories: DashMap<UserId, Vec<PointHistory>>,
    /// Next record ID
    cursor: AtomicU64,
    /// Artificial delay applied to every call
    latency: Duration,
}

impl InMemoryPointHistoryRepository {
    /// Create a new in-memory history store
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Create a store that sleeps for `latency` on every call
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            histories: DashMap::new(),
            cursor: AtomicU64::new(1),
            latency,
        }
    }
}

impl Default for InMemoryPointHistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PointHistoryRepository for InMemoryPointHistoryRepository {
    async fn append(
        &self,
        user_id: UserId,
        amount: u64,
        transaction_type: TransactionType,
        updated_at: DateTime<Utc>,
    ) -> Result<PointHistory> {
        simulate_latency(self.latency).await;

        // ID assignment and push happen under the shard lock so that
        // per-user order matches ID order
        let mut records = self.histories.entry(user_id).or_default();
        let history = PointHistory {
            id: self.cursor.fetch_add(1, Ordering::SeqCst),
            user_id,
            transaction_type,
            amount,
            updated_at,
        };
        records.push(history.clone());

        Ok(history)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<PointHistory>> {
        simulate_latency(self.latency).await;
        Ok(self
            .histories
            .get(&user_id)
            .map(|records| records.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_balance_reads_as_zero() {
        let repo = InMemoryUserPointRepository::new();

        let point = repo.get_point(3).await.unwrap();

        assert_eq!(point.id, 3);
        assert_eq!(point.point, 0);
        assert!(repo.points.is_empty());
    }

    #[tokio::test]
    async fn set_is_visible_to_next_get() {
        let repo = InMemoryUserPointRepository::new();

        let stored = repo.set_point(1, 1500).await.unwrap();
        let read = repo.get_point(1).await.unwrap();

        assert_eq!(read, stored);
    }

    #[tokio::test]
    async fn history_keeps_insertion_order_per_user() {
        let repo = InMemoryPointHistoryRepository::new();
        let now = Utc::now();

        repo.append(1, 1000, TransactionType::Charge, now).await.unwrap();
        repo.append(2, 2000, TransactionType::Charge, now).await.unwrap();
        repo.append(1, 300, TransactionType::Use, now).await.unwrap();

        let records = repo.list_by_user(1).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].transaction_type, TransactionType::Charge);
        assert_eq!(records[1].transaction_type, TransactionType::Use);
        assert!(records[0].id < records[1].id);
        assert!(repo.list_by_user(99).await.unwrap().is_empty());
    }
}

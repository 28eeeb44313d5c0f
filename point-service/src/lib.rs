//! Point service for managing user point balances and their history

pub mod config;
pub mod lock;
pub mod repository;
pub mod service;

pub use config::PointServiceConfig;
pub use lock::{KeyLockGuard, KeyLockRegistry};
pub use repository::{
    InMemoryPointHistoryRepository, InMemoryUserPointRepository, PointHistoryRepository,
    UserPointRepository,
};
pub use service::PointService;

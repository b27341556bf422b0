//! Persistence port for users and coupons.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{domain::UserId, Result};

mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub display_name: Option<String>,
    /// Consecutive tic-tac-toe wins since the last coupon.
    pub win_streak: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CouponRecord {
    pub id: i64,
    pub user_id: UserId,
    pub coupon: String,
    pub issued_at: DateTime<Utc>,
}

/// Hexagonal port for the persistent user/coupon store.
///
/// Every write has completed (or failed) when the returned future resolves.
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Create the user with a zero streak unless it already exists.
    async fn upsert_user(&self, user_id: UserId, display_name: Option<&str>) -> Result<()>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>>;

    /// Increment the streak (creating the user if absent) and return the new value.
    async fn increment_wins(&self, user_id: UserId) -> Result<u32>;

    async fn reset_wins(&self, user_id: UserId) -> Result<()>;

    async fn append_coupon(
        &self,
        user_id: UserId,
        coupon: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<CouponRecord>;

    /// Append a coupon and zero the streak as one atomic write.
    async fn redeem_streak(
        &self,
        user_id: UserId,
        coupon: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<CouponRecord>;

    /// All coupons of a user in insertion order.
    async fn list_coupons(&self, user_id: UserId) -> Result<Vec<CouponRecord>>;
}

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::info;

use crate::{
    coupons::CouponCatalog,
    domain::UserId,
    random::SharedRng,
    store::{CouponRecord, RewardStore, UserRecord},
    Result,
};

/// Win streaks and coupon issuance on top of a `RewardStore`.
///
/// The ledger never applies the coupon threshold itself; the orchestrator
/// decides when a streak turns into a coupon.
#[derive(Clone)]
pub struct RewardLedger {
    store: Arc<dyn RewardStore>,
    catalog: CouponCatalog,
    rng: SharedRng,
}

impl RewardLedger {
    pub fn new(store: Arc<dyn RewardStore>, catalog: CouponCatalog, rng: SharedRng) -> Self {
        Self {
            store,
            catalog,
            rng,
        }
    }

    pub async fn ensure_user(&self, user_id: UserId, display_name: Option<&str>) -> Result<()> {
        self.store.upsert_user(user_id, display_name).await
    }

    pub async fn user(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        self.store.get_user(user_id).await
    }

    /// Count one more tic-tac-toe win and return the new streak.
    pub async fn record_win(&self, user_id: UserId) -> Result<u32> {
        self.store.increment_wins(user_id).await
    }

    pub async fn reset_wins(&self, user_id: UserId) -> Result<()> {
        self.store.reset_wins(user_id).await
    }

    /// Draw a coupon from the catalog and append it to the user's records.
    pub async fn issue_coupon(&self, user_id: UserId) -> Result<CouponRecord> {
        let record = self
            .store
            .append_coupon(user_id, &self.draw(), Utc::now().trunc_subsecs(0))
            .await?;
        info!(user_id = user_id.0, coupon_id = record.id, "coupon issued");
        Ok(record)
    }

    /// Turn a completed streak into a coupon: the coupon is stored and the
    /// streak zeroed together, or neither happens.
    pub async fn redeem_streak(&self, user_id: UserId) -> Result<CouponRecord> {
        let record = self
            .store
            .redeem_streak(user_id, &self.draw(), Utc::now().trunc_subsecs(0))
            .await?;
        info!(user_id = user_id.0, coupon_id = record.id, "streak redeemed for coupon");
        Ok(record)
    }

    fn draw(&self) -> String {
        self.rng.with(|rng| self.catalog.draw(rng).to_string())
    }

    pub async fn list_coupons(&self, user_id: UserId) -> Result<Vec<CouponRecord>> {
        self.store.list_coupons(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::store::SqliteStore;

    use super::*;

    fn ledger() -> RewardLedger {
        RewardLedger::new(
            Arc::new(SqliteStore::open_in_memory().unwrap()),
            CouponCatalog::default(),
            SharedRng::seeded(1),
        )
    }

    #[tokio::test]
    async fn record_win_counts_from_one() {
        let ledger = ledger();
        let u = UserId(1);
        let streak: Vec<u32> = {
            let mut out = Vec::new();
            for _ in 0..5 {
                out.push(ledger.record_win(u).await.unwrap());
            }
            out
        };
        assert_eq!(streak, vec![1, 2, 3, 4, 5]);
        // The ledger does not reset on its own.
        assert_eq!(ledger.record_win(u).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn reset_brings_streak_back_to_zero() {
        let ledger = ledger();
        let u = UserId(2);
        ledger.ensure_user(u, Some("bob")).await.unwrap();
        ledger.record_win(u).await.unwrap();
        ledger.reset_wins(u).await.unwrap();
        assert_eq!(ledger.user(u).await.unwrap().unwrap().win_streak, 0);
    }

    #[tokio::test]
    async fn issued_coupons_come_from_the_catalog_and_are_listed() {
        let ledger = ledger();
        let u = UserId(3);
        let a = ledger.issue_coupon(u).await.unwrap();
        let b = ledger.issue_coupon(u).await.unwrap();

        let catalog = CouponCatalog::default();
        for record in [&a, &b] {
            assert!(catalog.entries().contains(&record.coupon));
            assert_eq!(record.user_id, u);
        }

        let listed = ledger.list_coupons(u).await.unwrap();
        assert_eq!(listed, vec![a, b]);
        assert!(ledger.list_coupons(UserId(4)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn redeeming_a_streak_issues_one_coupon_and_resets() {
        let ledger = ledger();
        let u = UserId(5);
        for _ in 0..5 {
            ledger.record_win(u).await.unwrap();
        }
        let coupon = ledger.redeem_streak(u).await.unwrap();
        assert!(CouponCatalog::default().entries().contains(&coupon.coupon));
        assert_eq!(ledger.user(u).await.unwrap().unwrap().win_streak, 0);
        assert_eq!(ledger.list_coupons(u).await.unwrap(), vec![coupon]);
    }
}

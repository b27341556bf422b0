use std::sync::Arc;

use prizebot_core::{
    config::Config,
    coupons::CouponCatalog,
    ledger::RewardLedger,
    orchestrator::Orchestrator,
    random::SharedRng,
    registry::{MinesweeperSettings, SessionRegistry},
    store::SqliteStore,
};

#[tokio::main]
async fn main() -> Result<(), prizebot_core::Error> {
    prizebot_core::logging::init("prizebot")?;

    let cfg = Arc::new(Config::load()?);
    let store = Arc::new(SqliteStore::open(&cfg.db_path)?);
    if cfg.rng_seed.is_some() {
        tracing::warn!("RNG_SEED is set; opponent moves, mines and coupons are deterministic");
    }
    let rng = SharedRng::new(cfg.rng_seed);

    let registry = SessionRegistry::new(
        rng.clone(),
        MinesweeperSettings {
            size: cfg.mines_board_size,
            mines: cfg.mines_count,
        },
    );
    let ledger = RewardLedger::new(store, CouponCatalog::default(), rng);
    let orchestrator = Arc::new(Orchestrator::new(
        registry,
        ledger,
        cfg.coupon_win_threshold,
    ));

    prizebot_telegram::router::run_polling(cfg, orchestrator)
        .await
        .map_err(|e| prizebot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{CouponRecord, RewardStore, UserRecord};
use crate::{domain::UserId, errors::Error, Result};

// Same layout as the bot_data.db files written by earlier deployments, so an
// existing database can be reused as is.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY,
        username TEXT,
        ttt_wins INTEGER DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS coupons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER,
        coupon TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_coupons_user ON coupons(user_id, id);
";

/// `RewardStore` backed by a single SQLite file.
///
/// rusqlite is blocking, so every call runs on tokio's blocking pool behind
/// one connection mutex.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::Storage("connection mutex poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::Storage(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl RewardStore for SqliteStore {
    async fn upsert_user(&self, user_id: UserId, display_name: Option<&str>) -> Result<()> {
        let name = display_name.map(str::to_string);
        self.run(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (user_id, username, ttt_wins) VALUES (?1, ?2, 0)",
                params![user_id.0, name],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        self.run(move |conn| {
            let row = conn
                .query_row(
                    "SELECT username, COALESCE(ttt_wins, 0) FROM users WHERE user_id = ?1",
                    params![user_id.0],
                    |row| Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;
            row.map(|(display_name, wins)| {
                Ok(UserRecord {
                    user_id,
                    display_name,
                    win_streak: to_streak(wins)?,
                })
            })
            .transpose()
        })
        .await
    }

    async fn increment_wins(&self, user_id: UserId) -> Result<u32> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT OR IGNORE INTO users (user_id, ttt_wins) VALUES (?1, 0)",
                params![user_id.0],
            )?;
            let wins: i64 = tx.query_row(
                "UPDATE users SET ttt_wins = COALESCE(ttt_wins, 0) + 1 WHERE user_id = ?1 \
                 RETURNING ttt_wins",
                params![user_id.0],
                |row| row.get(0),
            )?;
            tx.commit()?;
            to_streak(wins)
        })
        .await
    }

    async fn reset_wins(&self, user_id: UserId) -> Result<()> {
        self.run(move |conn| {
            conn.execute(
                "UPDATE users SET ttt_wins = 0 WHERE user_id = ?1",
                params![user_id.0],
            )?;
            Ok(())
        })
        .await
    }

    async fn append_coupon(
        &self,
        user_id: UserId,
        coupon: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<CouponRecord> {
        let coupon = coupon.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO coupons (user_id, coupon, created_at) VALUES (?1, ?2, ?3)",
                params![user_id.0, coupon, format_timestamp(issued_at)],
            )?;
            Ok(CouponRecord {
                id: conn.last_insert_rowid(),
                user_id,
                coupon,
                issued_at,
            })
        })
        .await
    }

    async fn redeem_streak(
        &self,
        user_id: UserId,
        coupon: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<CouponRecord> {
        let coupon = coupon.to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO coupons (user_id, coupon, created_at) VALUES (?1, ?2, ?3)",
                params![user_id.0, coupon, format_timestamp(issued_at)],
            )?;
            let id = tx.last_insert_rowid();
            tx.execute(
                "UPDATE users SET ttt_wins = 0 WHERE user_id = ?1",
                params![user_id.0],
            )?;
            tx.commit()?;
            Ok(CouponRecord {
                id,
                user_id,
                coupon,
                issued_at,
            })
        })
        .await
    }

    async fn list_coupons(&self, user_id: UserId) -> Result<Vec<CouponRecord>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, COALESCE(coupon, ''), created_at FROM coupons \
                 WHERE user_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![user_id.0], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(id, coupon, created_at)| {
                    Ok(CouponRecord {
                        id,
                        user_id,
                        coupon,
                        issued_at: parse_timestamp(&created_at)?,
                    })
                })
                .collect()
        })
        .await
    }
}

fn to_streak(wins: i64) -> Result<u32> {
    u32::try_from(wins).map_err(|_| Error::Storage(format!("invalid win counter: {wins}")))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Accepts SQLite's `CURRENT_TIMESTAMP` format (UTC) and RFC 3339.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Storage(format!("invalid timestamp {raw:?}: {e}")))
}

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Telegram renders at most 8 inline buttons per row.
pub const MAX_BOARD_SIZE: usize = 8;

/// Typed configuration for the bot process.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,
    pub db_path: PathBuf,

    // Games
    pub mines_board_size: usize,
    pub mines_count: usize,

    // Rewards
    pub coupon_win_threshold: u32,

    /// Fixed seed for every random draw (opponent moves, mines, coupons).
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("BOT_TOKEN")
            .and_then(non_empty)
            .or_else(|| lookup("TELEGRAM_BOT_TOKEN").and_then(non_empty))
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let db_path = PathBuf::from(
            lookup("DB_PATH")
                .and_then(non_empty)
                .unwrap_or_else(|| "bot_data.db".to_string()),
        );

        let mines_board_size = parse_or("MINES_BOARD_SIZE", &lookup, 5usize)?;
        if !(2..=MAX_BOARD_SIZE).contains(&mines_board_size) {
            return Err(Error::Config(format!(
                "MINES_BOARD_SIZE must be between 2 and {MAX_BOARD_SIZE}, got {mines_board_size}"
            )));
        }

        let mines_count = parse_or("MINES_COUNT", &lookup, 5usize)?;
        let cells = mines_board_size * mines_board_size;
        if mines_count == 0 || mines_count >= cells {
            return Err(Error::Config(format!(
                "MINES_COUNT must be between 1 and {}, got {mines_count}",
                cells - 1
            )));
        }

        let coupon_win_threshold = parse_or("COUPON_WIN_THRESHOLD", &lookup, 5u32)?;
        if coupon_win_threshold == 0 {
            return Err(Error::Config(
                "COUPON_WIN_THRESHOLD must be at least 1".to_string(),
            ));
        }

        let rng_seed = match lookup("RNG_SEED").and_then(non_empty) {
            Some(raw) => Some(parse_value("RNG_SEED", &raw)?),
            None => None,
        };

        Ok(Self {
            telegram_bot_token,
            db_path,
            mines_board_size,
            mines_count,
            coupon_win_threshold,
            rng_seed,
        })
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match lookup(key).and_then(non_empty) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| Error::Config(format!("{key} has an invalid value: {raw:?}")))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

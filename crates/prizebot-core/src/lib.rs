//! Core game and reward logic for the prize bot.
//!
//! This crate is transport-agnostic. Telegram lives behind the messaging port
//! in the adapter crate; persistence lives behind the `RewardStore` port.

pub mod callback;
pub mod config;
pub mod coupons;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod games;
pub mod ledger;
pub mod logging;
pub mod messaging;
pub mod orchestrator;
pub mod random;
pub mod registry;
pub mod render;
pub mod store;

pub use errors::{Error, Result};

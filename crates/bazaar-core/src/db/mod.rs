//! Database layer for Bazaar

mod connection;
mod migrations;

pub use connection::{Database, SyncConfig, DEFAULT_SYNC_INTERVAL};

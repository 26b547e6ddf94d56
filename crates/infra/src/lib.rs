//! Infrastructure layer: configuration, SQLite persistence and search.

pub mod config;
pub mod db;
pub mod fts;
pub mod sqlite;
pub mod store;


pub use config::AppConfig;
pub use sqlite::SqliteInventoryStore;
pub use store::{InventoryStore, ItemQuery, StoreError, StoreResult};

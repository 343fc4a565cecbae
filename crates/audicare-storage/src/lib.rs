//! AudiCare storage crate - SQLite key-value persistence and local accounts.
//!
//! Provides a WAL-mode SQLite database with migrations, a small
//! key-value store abstraction with SQLite and in-memory backends, and the
//! account service used by the login and register commands.

pub mod account;
pub mod db;
pub mod kv;
pub mod migrations;

pub use account::{AccountService, AuthError, REGISTERED_NOTICE};
pub use db::Database;
pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore};

//! User profile storage for the air quality service.
//!
//! Request handlers only ever see the [`ProfileStore`] capability: look a
//! profile up by user id, apply a validated patch, or delete it. Two
//! implementations are provided:
//!
//! - [`MemoryProfileStore`] - a process-local map, used by tests and when no
//!   database path is configured
//! - [`Database`] - SQLite via `rusqlite`, in memory or backed by a file
//!
//! # Usage
//!
//! ```rust
//! use aq_db::{Database, ProfileStore};
//! use aq_db::models::ProfilePatch;
//!
//! let db = Database::new().unwrap();
//! let patch = ProfilePatch::from_json(&serde_json::json!({ "name": "Ada" })).unwrap();
//! let profile = db.upsert_profile("user-1", patch).unwrap();
//! assert_eq!(profile.name, "Ada");
//! assert!(db.get_profile("user-1").unwrap().is_some());
//! ```

pub mod models;
pub mod schema;
pub mod validation;
mod memory;
mod queries;

pub use memory::MemoryProfileStore;

use models::{ProfilePatch, UserProfile};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Keyed access to user profiles.
pub trait ProfileStore: Send + Sync {
    fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>>;

    /// Apply `patch` to the stored profile, creating a default one first if
    /// the user has none. Returns the profile as stored.
    fn upsert_profile(&self, user_id: &str, patch: ProfilePatch) -> anyhow::Result<UserProfile>;

    /// Returns whether a profile existed.
    fn delete_profile(&self, user_id: &str) -> anyhow::Result<bool>;
}

/// SQLite-backed profile store.
///
/// Cheaply cloneable; clones share one connection behind a mutex.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the schema applied.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open (or create) a database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("[AQ Debug] opening profile database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("profile database lock poisoned"))
    }
}

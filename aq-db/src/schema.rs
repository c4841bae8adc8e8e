//! SQL schema for the profile database.
//!
//! The schema is applied as a single batch when the database is opened,
//! so opening an existing file is a no-op.

/// Returns the full SQL schema as a single batch string.
///
/// - `profiles` - one row per user. The nested `healthData` and
///   `preferences` sections are stored as JSON text.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        user_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT,
        health_data TEXT NOT NULL,
        preferences TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#
}

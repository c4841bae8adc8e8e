//! [`ProfileStore`] implementation for the SQLite [`Database`].

use crate::models::{ProfilePatch, UserProfile};
use crate::{Database, ProfileStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

fn select_profile(conn: &Connection, user_id: &str) -> anyhow::Result<Option<UserProfile>> {
    let row = conn
        .query_row(
            "SELECT user_id, name, email, health_data, preferences, updated_at
             FROM profiles
             WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, email, health_data, preferences, updated_at)) = row else {
        return Ok(None);
    };
    Ok(Some(UserProfile {
        id,
        name,
        email,
        health_data: serde_json::from_str(&health_data)?,
        preferences: serde_json::from_str(&preferences)?,
        updated_at: DateTime::parse_from_rfc3339(&updated_at)?.with_timezone(&Utc),
    }))
}

impl ProfileStore for Database {
    fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>> {
        let conn = self.lock()?;
        let profile = select_profile(&conn, user_id)?;
        log::debug!(
            "[AQ Debug] query: get_profile({}) found={}",
            user_id,
            profile.is_some()
        );
        Ok(profile)
    }

    fn upsert_profile(&self, user_id: &str, patch: ProfilePatch) -> anyhow::Result<UserProfile> {
        let conn = self.lock()?;
        let mut profile =
            select_profile(&conn, user_id)?.unwrap_or_else(|| UserProfile::new(user_id));
        profile.apply(patch);

        conn.execute(
            "INSERT OR REPLACE INTO profiles
                 (user_id, name, email, health_data, preferences, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile.id,
                profile.name,
                profile.email,
                serde_json::to_string(&profile.health_data)?,
                serde_json::to_string(&profile.preferences)?,
                profile.updated_at.to_rfc3339(),
            ],
        )?;
        log::debug!("[AQ Debug] query: upsert_profile({})", user_id);
        Ok(profile)
    }

    fn delete_profile(&self, user_id: &str) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM profiles WHERE user_id = ?1", params![user_id])?;
        log::debug!("[AQ Debug] query: delete_profile({}) removed {} rows", user_id, deleted);
        Ok(deleted > 0)
    }
}

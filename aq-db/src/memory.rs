use crate::models::{ProfilePatch, UserProfile};
use crate::ProfileStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// Profiles held in a process-local map.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `profiles`, keyed by their ids.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let profiles = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();
        MemoryProfileStore {
            profiles: RwLock::new(profiles),
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>> {
        let profiles = self
            .profiles
            .read()
            .map_err(|_| anyhow::anyhow!("profile store lock poisoned"))?;
        Ok(profiles.get(user_id).cloned())
    }

    fn upsert_profile(&self, user_id: &str, patch: ProfilePatch) -> anyhow::Result<UserProfile> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| anyhow::anyhow!("profile store lock poisoned"))?;
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id));
        profile.apply(patch);
        Ok(profile.clone())
    }

    fn delete_profile(&self, user_id: &str) -> anyhow::Result<bool> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| anyhow::anyhow!("profile store lock poisoned"))?;
        Ok(profiles.remove(user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sensitivity;

    #[test]
    fn test_seeded_profiles_are_found() {
        let mut profile = UserProfile::new("u1");
        profile.health_data.sensitivity = Sensitivity::High;
        let store = MemoryProfileStore::with_profiles([profile]);
        let found = store.get_profile("u1").unwrap().unwrap();
        assert_eq!(found.health_data.sensitivity, Sensitivity::High);
        assert!(store.get_profile("u2").unwrap().is_none());
    }

    #[test]
    fn test_upsert_and_delete() {
        let store = MemoryProfileStore::new();
        let patch = ProfilePatch {
            name: Some("Grace".to_string()),
            ..ProfilePatch::default()
        };
        assert_eq!(store.upsert_profile("u1", patch).unwrap().name, "Grace");
        assert_eq!(store.get_profile("u1").unwrap().unwrap().name, "Grace");
        assert!(store.delete_profile("u1").unwrap());
        assert!(!store.delete_profile("u1").unwrap());
    }
}

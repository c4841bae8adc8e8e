//! User profile model structs.
//!
//! Field names serialize in camelCase, the shape the profile endpoints
//! accept and return.

use aq_core::measurement::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Asthma,
    Copd,
    HeartDisease,
    Diabetes,
    Allergies,
    Other,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

/// The index level at which a user wants to be alerted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertThreshold {
    Moderate,
    #[default]
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AlertThreshold {
    /// Lowest index value of the band this threshold names.
    pub fn floor(&self) -> u16 {
        match self {
            AlertThreshold::Moderate => 51,
            AlertThreshold::UnhealthySensitive => 101,
            AlertThreshold::Unhealthy => 151,
            AlertThreshold::VeryUnhealthy => 201,
            AlertThreshold::Hazardous => 301,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HealthData {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 120, message = "Age must be between 0 and 120"))]
    pub age: Option<u8>,
    pub conditions: Vec<Condition>,
    pub sensitivity: Sensitivity,
}

impl HealthData {
    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = -90.0, max = 90.0, message = "Invalid latitude"))]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = -180.0, max = 180.0, message = "Invalid longitude"))]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ProfileLocation {
    /// The stored coordinate, when both halves are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub alerts_enabled: bool,
    pub alert_threshold: AlertThreshold,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub location: Option<ProfileLocation>,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            alerts_enabled: true,
            alert_threshold: AlertThreshold::default(),
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub health_data: HealthData,
    #[serde(default)]
    pub preferences: Preferences,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// An empty profile with default health data and preferences.
    pub fn new(id: impl Into<String>) -> Self {
        UserProfile {
            id: id.into(),
            name: String::new(),
            email: None,
            health_data: HealthData::default(),
            preferences: Preferences::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.preferences
            .location
            .as_ref()
            .and_then(ProfileLocation::coordinate)
    }

    /// Apply a validated patch. Each present section replaces the stored one whole.
    pub fn apply(&mut self, patch: ProfilePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(health_data) = patch.health_data {
            self.health_data = health_data;
        }
        if let Some(preferences) = patch.preferences {
            self.preferences = preferences;
        }
        self.updated_at = Utc::now();
    }
}

/// The patchable part of a profile. Built by `ProfilePatch::from_json`,
/// which validates the request body first.
#[derive(Debug, Default, Clone, PartialEq, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: Option<String>,
    #[validate(nested)]
    pub health_data: Option<HealthData>,
    #[validate(nested)]
    pub preferences: Option<Preferences>,
}

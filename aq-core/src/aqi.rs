//! AQI calculation and EPA category/color bands.

use crate::breakpoint::{range_for, PM25_BREAKPOINTS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// EPA AQI severity bands, in ascending order of severity.
///
/// `Unknown` sorts below every real band and is only produced when the
/// input concentration is missing.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiCategory {
    Unknown,
    Good,
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Unknown => "Unknown",
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::VeryUnhealthy => "Very Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    /// Fixed health message for the band.
    pub fn description(&self) -> &'static str {
        match self {
            AqiCategory::Unknown => "No data",
            AqiCategory::Good => "Air quality is satisfactory and poses little or no risk",
            AqiCategory::Moderate => "Acceptable; some pollutants may be a concern for a few",
            AqiCategory::UnhealthyForSensitiveGroups => {
                "Members of sensitive groups may experience health effects"
            }
            AqiCategory::Unhealthy => "Everyone may begin to experience health effects",
            AqiCategory::VeryUnhealthy => {
                "Health alert: everyone may experience more serious effects"
            }
            AqiCategory::Hazardous => {
                "Emergency conditions. The entire population is likely to be affected"
            }
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A derived index value with its category and description.
///
/// `value` is `None` exactly when the input concentration was missing.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AqiResult {
    pub value: Option<u16>,
    pub category: AqiCategory,
    pub description: String,
}

impl AqiResult {
    pub fn unknown() -> Self {
        AqiResult {
            value: None,
            category: AqiCategory::Unknown,
            description: AqiCategory::Unknown.description().to_string(),
        }
    }

    fn from_index(value: u16, category: AqiCategory) -> Self {
        AqiResult {
            value: Some(value),
            category,
            description: category.description().to_string(),
        }
    }
}

/// Calculate the AQI for a PM2.5 concentration in µg/m³.
///
/// `None` or NaN means the provider had no reading and yields
/// [`AqiResult::unknown`]. Negative input clamps to 0 / Good, input above the
/// top of the table clamps to 500 / Hazardous. Never panics.
///
/// ```
/// use aq_core::aqi::{compute_aqi, AqiCategory};
///
/// let result = compute_aqi(Some(35.5));
/// assert_eq!(result.value, Some(101));
/// assert_eq!(result.category, AqiCategory::UnhealthyForSensitiveGroups);
/// ```
pub fn compute_aqi(concentration: Option<f64>) -> AqiResult {
    let concentration = match concentration {
        Some(c) if !c.is_nan() => c,
        _ => return AqiResult::unknown(),
    };
    if concentration <= 0.0 {
        return AqiResult::from_index(0, AqiCategory::Good);
    }
    let range = range_for(concentration);
    AqiResult::from_index(range.interpolate(concentration), range.category)
}

/// Category for an index value, using the same bands as the breakpoint table.
pub fn category_for_index(aqi: u16) -> AqiCategory {
    PM25_BREAKPOINTS
        .iter()
        .find(|r| aqi <= r.i_high)
        .map(|r| r.category)
        .unwrap_or(AqiCategory::Hazardous)
}

/// Display color for an index value.
pub fn color_for_aqi(aqi: u16) -> &'static str {
    match aqi {
        0..=50 => "#00E400",
        51..=100 => "#FFFF00",
        101..=150 => "#FF8C00",
        151..=200 => "#FF0000",
        201..=300 => "#8F3F97",
        _ => "#7E0023",
    }
}

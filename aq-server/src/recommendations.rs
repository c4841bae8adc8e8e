use aq_db::models::{Condition, HealthData, Sensitivity};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'static str,
    pub severity: &'static str,
}

/// Health warnings for a user's profile at the given index. An unknown
/// index counts as 0.
pub fn personalized_recommendations(
    health: Option<&HealthData>,
    aqi: Option<u16>,
) -> Vec<Recommendation> {
    let Some(health) = health else {
        return Vec::new();
    };
    let aqi = aqi.unwrap_or(0);
    let mut recommendations = Vec::new();

    let sensitive =
        health.sensitivity == Sensitivity::High || health.has_condition(Condition::Asthma);
    if sensitive && aqi > 50 {
        recommendations.push(Recommendation {
            kind: "health_warning",
            message: "High sensitivity detected: consider limiting outdoor exposure",
            severity: "high",
        });
    }
    if health.has_condition(Condition::Copd) && aqi > 100 {
        recommendations.push(Recommendation {
            kind: "health_warning",
            message: "COPD: Avoid outdoor activities due to poor air quality",
            severity: "critical",
        });
    }
    recommendations
}

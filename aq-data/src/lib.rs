//! Aggregation of raw pollutant measurements.
//!
//! This crate turns the flat, newest-first measurement lists a
//! [`PollutantSource`](aq_core::source::PollutantSource) returns into the
//! shapes the endpoints serve: one map point per site, and one latest
//! value per pollutant for the current reading.

/// Grouping of measurements into map points.
pub mod aggregation {
    use aq_core::aqi::{category_for_index, color_for_aqi, compute_aqi};
    use aq_core::location::LocationPoint;
    use aq_core::measurement::{Coordinate, Measurement};
    use aq_core::parameter::Parameter;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    /// Multiplier of the PM10 placeholder approximation. Not EPA-accurate.
    pub const PM10_APPROXIMATION_FACTOR: f64 = 0.5;
    /// Cap of the PM10 placeholder approximation.
    pub const PM10_APPROXIMATION_CAP: u16 = 200;

    /// How measurements are assigned to a site.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GroupingPolicy {
        /// Exact `lat,lng` string equality.
        #[default]
        Coordinate,
        /// Provider site id when the record has one, else exact coordinate.
        SiteThenCoordinate,
    }

    impl GroupingPolicy {
        fn key_for(&self, measurement: &Measurement, coordinate: Coordinate) -> String {
            match (self, &measurement.site_id) {
                (GroupingPolicy::SiteThenCoordinate, Some(site)) => format!("site:{}", site),
                _ => coordinate.to_string(),
            }
        }
    }

    /// Placeholder index from a PM10 concentration: `min(round(pm10 * 0.5), 200)`.
    pub fn approximate_aqi_from_pm10(pm10: f64) -> u16 {
        if !pm10.is_finite() || pm10 <= 0.0 {
            return 0;
        }
        let approx = (pm10 * PM10_APPROXIMATION_FACTOR).round();
        approx.min(PM10_APPROXIMATION_CAP as f64) as u16
    }

    /// Index for a site: PM2.5 when it yields a non-zero index, else the
    /// PM10 placeholder, else 0.
    pub fn site_aqi(pm25: Option<f64>, pm10: Option<f64>) -> u16 {
        match compute_aqi(pm25).value {
            Some(aqi) if aqi > 0 => aqi,
            _ => pm10.map(approximate_aqi_from_pm10).unwrap_or(0),
        }
    }

    #[derive(Debug)]
    struct SiteGroup {
        coordinate: Coordinate,
        site_id: Option<String>,
        latest: HashMap<Parameter, f64>,
    }

    impl SiteGroup {
        fn into_point(self) -> LocationPoint {
            let pm25 = self.latest.get(&Parameter::Pm25).copied();
            let pm10 = self.latest.get(&Parameter::Pm10).copied();
            let aqi = site_aqi(pm25, pm10);
            LocationPoint {
                site_id: self.site_id,
                name: None,
                latitude: self.coordinate.latitude,
                longitude: self.coordinate.longitude,
                aqi,
                category: category_for_index(aqi),
                color: color_for_aqi(aqi).to_string(),
                pm25,
                pm10,
            }
        }
    }

    /// Aggregate with the default exact-coordinate grouping.
    pub fn aggregate(measurements: &[Measurement]) -> Vec<LocationPoint> {
        aggregate_with(measurements, GroupingPolicy::default())
    }

    /// Group measurements by site and build one map point per site.
    ///
    /// Input must be ordered newest first: the first value seen for a
    /// parameter in a group is kept and later ones are ignored. Timestamps
    /// are not compared. Measurements without a coordinate are skipped.
    /// Points come out in order of first appearance.
    pub fn aggregate_with(
        measurements: &[Measurement],
        policy: GroupingPolicy,
    ) -> Vec<LocationPoint> {
        let mut groups: Vec<SiteGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for measurement in measurements {
            let Some(coordinate) = measurement.coordinate else {
                continue;
            };
            let key = policy.key_for(measurement, coordinate);
            let slot = *index.entry(key).or_insert_with(|| {
                groups.push(SiteGroup {
                    coordinate,
                    site_id: measurement.site_id.clone(),
                    latest: HashMap::new(),
                });
                groups.len() - 1
            });
            groups[slot]
                .latest
                .entry(measurement.parameter)
                .or_insert(measurement.value);
        }

        log::debug!(
            "[AQ Debug] aggregated {} measurements into {} points",
            measurements.len(),
            groups.len()
        );
        groups.into_iter().map(SiteGroup::into_point).collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use aq_core::aqi::AqiCategory;
        use chrono::{TimeZone, Utc};

        fn m(parameter: Parameter, value: f64, lat: f64, lng: f64, hour: u32) -> Measurement {
            Measurement {
                parameter,
                value,
                unit: "µg/m³".to_string(),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()),
                coordinate: Some(Coordinate::new(lat, lng)),
                site_id: None,
            }
        }

        #[test]
        fn test_first_seen_wins_within_a_site() {
            let measurements = vec![
                m(Parameter::Pm25, 40.0, 40.7, -74.0, 12),
                m(Parameter::Pm25, 5.0, 40.7, -74.0, 11),
                m(Parameter::Pm10, 30.0, 40.7, -74.0, 12),
            ];
            let points = aggregate(&measurements);
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].pm25, Some(40.0));
            assert_eq!(points[0].pm10, Some(30.0));
            assert_eq!(points[0].aqi, 112);
            assert_eq!(points[0].category, AqiCategory::UnhealthyForSensitiveGroups);
            assert_eq!(points[0].color, "#FF8C00");
        }

        #[test]
        fn test_reaggregation_is_idempotent() {
            let measurements = vec![
                m(Parameter::Pm25, 12.0, 40.7, -74.0, 12),
                m(Parameter::Pm25, 20.0, 40.8, -73.9, 12),
                m(Parameter::Pm25, 99.0, 40.7, -74.0, 10),
            ];
            let first = aggregate(&measurements);

            let deduplicated: Vec<Measurement> = first
                .iter()
                .map(|p| m(Parameter::Pm25, p.pm25.unwrap(), p.latitude, p.longitude, 12))
                .collect();
            assert_eq!(aggregate(&deduplicated), first);
        }

        #[test]
        fn test_points_keep_first_appearance_order() {
            let measurements = vec![
                m(Parameter::Pm25, 1.0, 2.0, 2.0, 12),
                m(Parameter::Pm25, 1.0, 1.0, 1.0, 12),
                m(Parameter::Pm10, 1.0, 2.0, 2.0, 12),
            ];
            let points = aggregate(&measurements);
            let lats: Vec<f64> = points.iter().map(|p| p.latitude).collect();
            assert_eq!(lats, vec![2.0, 1.0]);
        }

        #[test]
        fn test_pm10_approximation_when_pm25_missing_or_zero() {
            let only_pm10 = aggregate(&[m(Parameter::Pm10, 85.0, 1.0, 1.0, 12)]);
            assert_eq!(only_pm10[0].aqi, 43);
            assert_eq!(only_pm10[0].pm25, None);

            let zero_pm25 = aggregate(&[
                m(Parameter::Pm25, 0.0, 1.0, 1.0, 12),
                m(Parameter::Pm10, 900.0, 1.0, 1.0, 12),
            ]);
            assert_eq!(zero_pm25[0].aqi, 200);
            assert_eq!(zero_pm25[0].category, AqiCategory::Unhealthy);
        }

        #[test]
        fn test_no_particulates_is_zero() {
            let points = aggregate(&[m(Parameter::O3, 80.0, 1.0, 1.0, 12)]);
            assert_eq!(points[0].aqi, 0);
            assert_eq!(points[0].category, AqiCategory::Good);
            assert_eq!(points[0].color, "#00E400");
        }

        #[test]
        fn test_measurements_without_coordinates_are_skipped() {
            let mut reading = m(Parameter::Pm25, 10.0, 1.0, 1.0, 12);
            reading.coordinate = None;
            assert!(aggregate(&[reading]).is_empty());
            assert!(aggregate(&[]).is_empty());
        }

        #[test]
        fn test_nearby_coordinates_are_not_merged() {
            let points = aggregate(&[
                m(Parameter::Pm25, 10.0, 40.7128, -74.006, 12),
                m(Parameter::Pm25, 10.0, 40.71280001, -74.006, 12),
            ]);
            assert_eq!(points.len(), 2);
        }

        #[test]
        fn test_site_policy_merges_moved_coordinates() {
            let mut a = m(Parameter::Pm25, 10.0, 40.7128, -74.006, 12);
            a.site_id = Some("42".to_string());
            let mut b = m(Parameter::Pm10, 20.0, 40.71281, -74.006, 12);
            b.site_id = Some("42".to_string());
            let c = m(Parameter::Pm25, 30.0, 40.71281, -74.006, 12);

            let points = aggregate_with(
                &[a.clone(), b.clone(), c.clone()],
                GroupingPolicy::SiteThenCoordinate,
            );
            assert_eq!(points.len(), 2);
            assert_eq!(points[0].site_id.as_deref(), Some("42"));
            assert_eq!(points[0].pm10, Some(20.0));
            assert_eq!(points[0].latitude, 40.7128);

            assert_eq!(aggregate(&[a, b, c]).len(), 2);
        }

        #[test]
        fn test_approximate_aqi_from_pm10() {
            assert_eq!(approximate_aqi_from_pm10(0.0), 0);
            assert_eq!(approximate_aqi_from_pm10(-3.0), 0);
            assert_eq!(approximate_aqi_from_pm10(f64::NAN), 0);
            assert_eq!(approximate_aqi_from_pm10(3.0), 2);
            assert_eq!(approximate_aqi_from_pm10(400.0), 200);
            assert_eq!(approximate_aqi_from_pm10(401.0), 200);
        }
    }
}

/// Latest value per pollutant for the current reading.
pub mod current {
    use aq_core::aqi::{compute_aqi, AqiResult};
    use aq_core::measurement::Measurement;
    use aq_core::parameter::{Parameter, DEFAULT_UNIT};
    use aq_core::sample::{PollutantReading, SampleDataset};
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;

    /// First-seen measurement per parameter across all sites.
    pub fn latest_by_parameter(measurements: &[Measurement]) -> BTreeMap<Parameter, &Measurement> {
        let mut latest = BTreeMap::new();
        for measurement in measurements {
            latest.entry(measurement.parameter).or_insert(measurement);
        }
        latest
    }

    /// A current reading: every supported pollutant, `null` when unreported.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CurrentReading {
        pub aqi: AqiResult,
        pub pollutants: BTreeMap<Parameter, PollutantReading>,
        pub timestamp: Option<DateTime<Utc>>,
    }

    fn readings_from<F>(value_of: F) -> BTreeMap<Parameter, PollutantReading>
    where
        F: Fn(Parameter) -> (Option<f64>, String),
    {
        Parameter::ALL
            .iter()
            .map(|&parameter| {
                let (value, unit) = value_of(parameter);
                (
                    parameter,
                    PollutantReading {
                        value,
                        unit,
                        description: parameter.description().to_string(),
                    },
                )
            })
            .collect()
    }

    impl CurrentReading {
        /// Reading from live measurements. The timestamp is that of the PM2.5 value.
        pub fn from_measurements(measurements: &[Measurement]) -> Self {
            let latest = latest_by_parameter(measurements);
            let pm25 = latest.get(&Parameter::Pm25);
            CurrentReading {
                aqi: compute_aqi(pm25.map(|m| m.value)),
                timestamp: pm25.and_then(|m| m.timestamp),
                pollutants: readings_from(|parameter| match latest.get(&parameter) {
                    Some(m) => (Some(m.value), m.unit.clone()),
                    None => (None, DEFAULT_UNIT.to_string()),
                }),
            }
        }

        /// Reading from the sample dataset's current data.
        pub fn from_sample(sample: &SampleDataset) -> Self {
            CurrentReading {
                aqi: compute_aqi(sample.pollutant_value(Parameter::Pm25)),
                timestamp: None,
                pollutants: readings_from(|parameter| {
                    match sample.current_data.pollutants.get(&parameter) {
                        Some(reading) => (reading.value, reading.unit.clone()),
                        None => (None, DEFAULT_UNIT.to_string()),
                    }
                }),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use aq_core::aqi::AqiCategory;
        use aq_core::measurement::Coordinate;
        use chrono::TimeZone;

        fn m(parameter: Parameter, value: f64, lat: f64, hour: u32) -> Measurement {
            Measurement {
                parameter,
                value,
                unit: "µg/m³".to_string(),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()),
                coordinate: Some(Coordinate::new(lat, -74.0)),
                site_id: None,
            }
        }

        #[test]
        fn test_latest_ignores_site() {
            let measurements = vec![
                m(Parameter::Pm25, 30.0, 40.1, 12),
                m(Parameter::Pm25, 3.0, 40.2, 12),
                m(Parameter::O3, 50.0, 40.2, 11),
            ];
            let latest = latest_by_parameter(&measurements);
            assert_eq!(latest.len(), 2);
            assert_eq!(latest[&Parameter::Pm25].value, 30.0);
        }

        #[test]
        fn test_reading_from_measurements() {
            let measurements = vec![
                m(Parameter::O3, 50.0, 40.2, 13),
                m(Parameter::Pm25, 35.5, 40.1, 12),
            ];
            let reading = CurrentReading::from_measurements(&measurements);
            assert_eq!(reading.aqi.value, Some(101));
            assert_eq!(reading.pollutants.len(), 6);
            assert_eq!(reading.pollutants[&Parameter::O3].value, Some(50.0));
            assert_eq!(reading.pollutants[&Parameter::Co].value, None);
            assert_eq!(reading.pollutants[&Parameter::Co].description, "Carbon Monoxide");
            assert_eq!(
                reading.timestamp,
                Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
            );
        }

        #[test]
        fn test_reading_without_pm25_is_unknown() {
            let reading = CurrentReading::from_measurements(&[m(Parameter::No2, 20.0, 40.0, 9)]);
            assert_eq!(reading.aqi.value, None);
            assert_eq!(reading.aqi.category, AqiCategory::Unknown);
            assert_eq!(reading.timestamp, None);
        }

        #[test]
        fn test_reading_from_sample() {
            let reading = CurrentReading::from_sample(SampleDataset::bundled());
            assert_eq!(reading.pollutants[&Parameter::Pm25].value, Some(18.5));
            assert_eq!(reading.aqi.value, compute_aqi(Some(18.5)).value);
            assert_eq!(reading.aqi.category, AqiCategory::Moderate);
        }
    }
}

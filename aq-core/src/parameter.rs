use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit used for particulate and gas concentrations unless a provider says otherwise.
pub const DEFAULT_UNIT: &str = "µg/m³";

/// Unit attached to values that are already index values rather than concentrations.
pub const INDEX_UNIT: &str = "AQI";

/// A pollutant parameter reported by an upstream provider.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Pm25,
    Pm10,
    O3,
    No2,
    So2,
    Co,
}

/// Returned when a provider names a parameter we do not track.
#[derive(Debug, PartialEq, Clone, Error)]
#[error("unknown pollutant parameter: {0}")]
pub struct UnknownParameter(pub String);

impl Parameter {
    /// Every tracked parameter, in the order responses list them.
    pub const ALL: [Parameter; 6] = [
        Parameter::Pm25,
        Parameter::Pm10,
        Parameter::O3,
        Parameter::No2,
        Parameter::So2,
        Parameter::Co,
    ];

    /// The lowercase key used in JSON responses (`pm25`, `o3`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            Parameter::Pm25 => "pm25",
            Parameter::Pm10 => "pm10",
            Parameter::O3 => "o3",
            Parameter::No2 => "no2",
            Parameter::So2 => "so2",
            Parameter::Co => "co",
        }
    }

    /// Human readable description shown next to the value.
    pub fn description(&self) -> &'static str {
        match self {
            Parameter::Pm25 => "Particulate Matter <2.5µm",
            Parameter::Pm10 => "Particulate Matter <10µm",
            Parameter::O3 => "Ozone",
            Parameter::No2 => "Nitrogen Dioxide",
            Parameter::So2 => "Sulfur Dioxide",
            Parameter::Co => "Carbon Monoxide",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Parameter {
    type Err = UnknownParameter;

    /// Accepts the spellings used by OpenAQ (`pm25`) and AirNow (`PM2.5`, `OZONE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '.' | '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pm25" => Ok(Parameter::Pm25),
            "pm10" => Ok(Parameter::Pm10),
            "o3" | "ozone" => Ok(Parameter::O3),
            "no2" => Ok(Parameter::No2),
            "so2" => Ok(Parameter::So2),
            "co" => Ok(Parameter::Co),
            _ => Err(UnknownParameter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_spellings() {
        assert_eq!("pm25".parse::<Parameter>(), Ok(Parameter::Pm25));
        assert_eq!("PM2.5".parse::<Parameter>(), Ok(Parameter::Pm25));
        assert_eq!("pm2_5".parse::<Parameter>(), Ok(Parameter::Pm25));
        assert_eq!("PM10".parse::<Parameter>(), Ok(Parameter::Pm10));
        assert_eq!("OZONE".parse::<Parameter>(), Ok(Parameter::O3));
        assert_eq!(" no2 ".parse::<Parameter>(), Ok(Parameter::No2));
        assert_eq!("CO".parse::<Parameter>(), Ok(Parameter::Co));
    }

    #[test]
    fn rejects_untracked_parameters() {
        assert!("bc".parse::<Parameter>().is_err());
        assert!("temperature".parse::<Parameter>().is_err());
        assert!("".parse::<Parameter>().is_err());
    }

    #[test]
    fn unknown_parameter_names_the_input() {
        let err = "bc".parse::<Parameter>().unwrap_err();
        assert_eq!(err, UnknownParameter("bc".to_string()));
        assert_eq!(err.to_string(), "unknown pollutant parameter: bc");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn serializes_as_response_key() {
        for parameter in Parameter::ALL {
            let json = serde_json::to_string(&parameter).unwrap();
            assert_eq!(json, format!("\"{}\"", parameter.key()));
        }
    }
}

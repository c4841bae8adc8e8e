//! EPA PM2.5 breakpoint table.
//!
//! Each range maps a concentration sub-range (µg/m³) linearly onto an index
//! sub-range. Adjacent rows leave a 0.1 µg/m³ step between them; a raw
//! concentration inside such a step belongs to the lower row.
//!
//! Values follow the EPA "Technical Assistance Document for the Reporting of
//! Daily Air Quality", published on document.airnow.gov.

use crate::aqi::AqiCategory;

/// Upper bound of the highest tabulated PM2.5 range.
pub const PM25_MAX_CONCENTRATION: f64 = 500.4;

/// Highest index value the scale reports.
pub const MAX_INDEX: u16 = 500;

const EPSILON: f64 = 1e-9;

/// A concentration range `[c_low, c_high]` mapped to an index range `[i_low, i_high]`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct BreakpointRange {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: u16,
    pub i_high: u16,
    pub category: AqiCategory,
}

/// PM2.5 breakpoints, ordered by ascending concentration.
pub static PM25_BREAKPOINTS: [BreakpointRange; 6] = [
    BreakpointRange {
        c_low: 0.0,
        c_high: 12.0,
        i_low: 0,
        i_high: 50,
        category: AqiCategory::Good,
    },
    BreakpointRange {
        c_low: 12.1,
        c_high: 35.4,
        i_low: 51,
        i_high: 100,
        category: AqiCategory::Moderate,
    },
    BreakpointRange {
        c_low: 35.5,
        c_high: 55.4,
        i_low: 101,
        i_high: 150,
        category: AqiCategory::UnhealthyForSensitiveGroups,
    },
    BreakpointRange {
        c_low: 55.5,
        c_high: 150.4,
        i_low: 151,
        i_high: 200,
        category: AqiCategory::Unhealthy,
    },
    BreakpointRange {
        c_low: 150.5,
        c_high: 250.4,
        i_low: 201,
        i_high: 300,
        category: AqiCategory::VeryUnhealthy,
    },
    BreakpointRange {
        c_low: 250.5,
        c_high: 500.4,
        i_low: 301,
        i_high: 500,
        category: AqiCategory::Hazardous,
    },
];

impl BreakpointRange {
    /// Inclusive on both ends.
    pub fn contains(&self, concentration: f64) -> bool {
        concentration >= self.c_low - EPSILON && concentration <= self.c_high + EPSILON
    }

    pub fn contains_index(&self, index: u16) -> bool {
        (self.i_low..=self.i_high).contains(&index)
    }

    /// Linear interpolation of a concentration inside this range onto the index range.
    ///
    /// AQI = ((IHigh - ILow) / (CHigh - CLow)) * (C - CLow) + ILow
    pub fn interpolate(&self, concentration: f64) -> u16 {
        let slope = (self.i_high - self.i_low) as f64 / (self.c_high - self.c_low);
        let index = slope * (concentration - self.c_low) + self.i_low as f64;
        index.round().clamp(self.i_low as f64, self.i_high as f64) as u16
    }

    /// Inverse of [`interpolate`](Self::interpolate), rounded to one decimal place.
    pub fn concentration_for(&self, index: u16) -> f64 {
        let slope = (self.c_high - self.c_low) / (self.i_high - self.i_low) as f64;
        let concentration = slope * (index as f64 - self.i_low as f64) + self.c_low;
        (concentration * 10.0).round() / 10.0
    }
}

/// The row a non-negative concentration is interpolated in: the highest row
/// whose lower bound it reaches. Values between two rows land in the lower
/// one, values past the table in the top one.
pub fn range_for(concentration: f64) -> &'static BreakpointRange {
    PM25_BREAKPOINTS
        .iter()
        .rev()
        .find(|r| concentration >= r.c_low - EPSILON)
        .unwrap_or(&PM25_BREAKPOINTS[0])
}

/// PM2.5 concentration (µg/m³) that produces the given index value.
///
/// Index values above the scale map to the top of the table.
pub fn concentration_for_index(index: u16) -> f64 {
    let index = index.min(MAX_INDEX);
    PM25_BREAKPOINTS
        .iter()
        .find(|r| r.contains_index(index))
        .map(|r| r.concentration_for(index))
        .unwrap_or(PM25_MAX_CONCENTRATION)
}

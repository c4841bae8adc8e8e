//! Core types for air quality data.
//!
//! Converts raw pollutant concentrations into EPA-style Air Quality Index
//! values, and defines the contract every upstream pollutant provider is
//! normalized into. The HTTP provider clients are only compiled with the
//! `api` feature.

pub mod aqi;
pub mod breakpoint;
pub mod location;
pub mod measurement;
pub mod parameter;
pub mod sample;
pub mod source;

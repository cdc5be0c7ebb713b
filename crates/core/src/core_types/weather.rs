//! Hourly fire-weather records
//!
//! One record per row of the weather table. Moisture codes and indices follow
//! the Canadian Forest Fire Weather Index (FWI) System (Van Wagner 1987).

use serde::{Deserialize, Serialize};

/// A single fire-weather observation or forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Scenario label as written in the table
    pub scenario: String,
    /// Raw datetime text
    pub datetime: Option<String>,
    /// Julian day derived from `datetime`, when it parses
    pub julian_day: Option<u16>,
    /// Accumulated precipitation (mm)
    pub precipitation: f64,
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub relative_humidity: f64,
    /// 10 m open wind speed (km/h)
    pub wind_speed: f64,
    /// Direction the wind blows from (degrees clockwise from north)
    pub wind_direction: f64,
    /// Fine Fuel Moisture Code
    pub ffmc: f64,
    /// Duff Moisture Code
    pub dmc: f64,
    /// Drought Code
    pub dc: f64,
    /// Initial Spread Index as reported by the FWI system
    pub isi: f64,
    /// Buildup Index
    pub bui: f64,
    /// Fire Weather Index
    pub fwi: f64,
}

impl WeatherRecord {
    /// Direction the wind blows towards (degrees clockwise from north)
    #[inline]
    pub fn wind_azimuth(&self) -> f64 {
        (self.wind_direction + 180.0).rem_euclid(360.0)
    }

    /// Record with the given fire-danger inputs and neutral everything else
    ///
    /// Convenience for tests and synthetic scenarios.
    pub fn with_indices(ffmc: f64, bui: f64, wind_speed: f64, wind_direction: f64) -> Self {
        Self {
            scenario: "0".to_string(),
            datetime: None,
            julian_day: None,
            precipitation: 0.0,
            temperature: 20.0,
            relative_humidity: 40.0,
            wind_speed,
            wind_direction,
            ffmc,
            dmc: 30.0,
            dc: 200.0,
            isi: 0.0,
            bui,
            fwi: 0.0,
        }
    }
}

//! Slope effect and net effective wind
//!
//! The FBP system converts ground slope into an equivalent wind speed (WSE)
//! acting up-slope, then adds it vectorially to the observed wind to obtain
//! the net effective wind speed (WSV) and the spread azimuth (RAZ).
//!
//! # Scientific References
//! - Forestry Canada Fire Danger Group (1992). ST-X-3, equations 39-50.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). GLC-X-10, equation 44b-e.

use super::fuel_moisture::ISI_COEFFICIENT;
use super::spread_rate::SpreadCurves;

/// Slope (%) at and above which the slope factor saturates
const MAX_SLOPE_PERCENT: f64 = 70.0;

/// Net wind acting on a fire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetWind {
    /// Net effective wind speed (km/h)
    pub speed: f64,
    /// Spread azimuth (degrees clockwise from north)
    pub azimuth: f64,
}

/// Spread factor due to slope (FBP eq. 39)
///
/// # Formula
/// ```text
/// SF = e^(3.533 (GS/100)^1.2)     GS < 70 %
/// SF = 10                         GS ≥ 70 %
/// ```
#[inline]
pub fn slope_factor(slope_percent: f64) -> f64 {
    if slope_percent >= MAX_SLOPE_PERCENT {
        10.0
    } else {
        (3.533 * (slope_percent / 100.0).powf(1.2)).exp()
    }
}

/// Wind speed equivalent to a slope-adjusted ISI (FBP eqs 43-44)
///
/// Above 40 km/h the 2009 high-wind form of the wind function is inverted
/// instead. Results are limited to the range the inversion is defined on.
pub fn slope_equivalent_wind(slope_isi: f64, fine_fuel: f64) -> f64 {
    if slope_isi <= 0.0 || fine_fuel <= 0.0 {
        return 0.0;
    }
    let low_wind = (slope_isi / (ISI_COEFFICIENT * fine_fuel)).ln() / 0.05039;
    if low_wind <= 40.0 {
        return low_wind.max(0.0);
    }
    let ratio = slope_isi / (2.496 * fine_fuel);
    if ratio >= 0.999 {
        // Inversion undefined at the asymptote
        return 112.45;
    }
    28.0 - (1.0 - ratio).ln() / 0.0818
}

/// Combine observed wind and slope into the net effective wind (FBP eqs 47-50)
///
/// # Arguments
/// * `wind_speed` - Observed 10 m wind speed (km/h)
/// * `wind_azimuth` - Direction the wind blows towards (degrees)
/// * `slope_percent` - Ground slope (%)
/// * `slope_azimuth` - Up-slope direction (degrees)
/// * `curves` - Spread curves of the fuel at the cell
/// * `fine_fuel` - Fine fuel moisture function `f(F)`
pub fn net_effective_wind(
    wind_speed: f64,
    wind_azimuth: f64,
    slope_percent: f64,
    slope_azimuth: f64,
    curves: &SpreadCurves,
    fine_fuel: f64,
) -> NetWind {
    if slope_percent <= 0.0 {
        return NetWind {
            speed: wind_speed,
            azimuth: wind_azimuth,
        };
    }

    let zero_wind_isi = ISI_COEFFICIENT * fine_fuel;
    let isf = curves.slope_isi(zero_wind_isi, slope_factor(slope_percent));
    let wse = slope_equivalent_wind(isf, fine_fuel);

    let (waz_sin, waz_cos) = wind_azimuth.to_radians().sin_cos();
    let (saz_sin, saz_cos) = slope_azimuth.to_radians().sin_cos();
    let east = wind_speed * waz_sin + wse * saz_sin;
    let north = wind_speed * waz_cos + wse * saz_cos;

    NetWind {
        speed: east.hypot(north),
        azimuth: east.atan2(north).to_degrees().rem_euclid(360.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{CellAttributes, FuelType};
    use crate::physics::fuel_moisture::{fine_fuel_function, fine_fuel_moisture};
    use approx::assert_relative_eq;

    fn c2_curves() -> SpreadCurves {
        SpreadCurves::for_fuel(FuelType::C2, &CellAttributes::default())
    }

    #[test]
    fn test_slope_factor() {
        assert_relative_eq!(slope_factor(0.0), 1.0);
        assert_relative_eq!(slope_factor(30.0), 2.30, epsilon = 0.01);
        assert_eq!(slope_factor(70.0), 10.0);
        assert_eq!(slope_factor(150.0), 10.0);
    }

    #[test]
    fn test_flat_ground_keeps_observed_wind() {
        let ff = fine_fuel_function(fine_fuel_moisture(90.0));
        let net = net_effective_wind(15.0, 45.0, 0.0, 200.0, &c2_curves(), ff);
        assert_eq!(net.speed, 15.0);
        assert_eq!(net.azimuth, 45.0);
    }

    #[test]
    fn test_calm_wind_spreads_upslope() {
        let ff = fine_fuel_function(fine_fuel_moisture(90.0));
        let net = net_effective_wind(0.0, 0.0, 40.0, 135.0, &c2_curves(), ff);
        assert!(net.speed > 0.0);
        assert_relative_eq!(net.azimuth, 135.0, epsilon = 1e-9);
    }

    #[test]
    fn test_aligned_slope_adds_to_wind() {
        let ff = fine_fuel_function(fine_fuel_moisture(90.0));
        let upslope = net_effective_wind(10.0, 90.0, 40.0, 90.0, &c2_curves(), ff);
        let downslope = net_effective_wind(10.0, 90.0, 40.0, 270.0, &c2_curves(), ff);
        assert!(upslope.speed > 10.0);
        assert!(downslope.speed < upslope.speed);
        assert_relative_eq!(upslope.azimuth, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_equivalent_wind_inverts_isi() {
        let ff = fine_fuel_function(fine_fuel_moisture(88.0));
        let isi = crate::physics::fuel_moisture::initial_spread_index(25.0, ff);
        assert_relative_eq!(slope_equivalent_wind(isi, ff), 25.0, epsilon = 1e-9);
        assert_eq!(slope_equivalent_wind(0.0, ff), 0.0);
    }
}

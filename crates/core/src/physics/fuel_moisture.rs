//! Fine fuel and foliar moisture for the FBP system
//!
//! Implements the moisture-related parts of the FBP system:
//! - Fine fuel moisture content from FFMC (Van Wagner 1987, 1999 scale)
//! - Fine fuel and wind functions of the Initial Spread Index
//! - Foliar moisture content from latitude, longitude, elevation and date
//!
//! # Scientific References
//! - Van Wagner, C.E. (1987). "Development and structure of the Canadian Forest
//!   Fire Weather Index System." Forestry Technical Report 35.
//! - Forestry Canada Fire Danger Group (1992). ST-X-3, equations 1-4 and 45-53.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). GLC-X-10, equation 53a.

use crate::core_types::cell::CellAttributes;

/// FFMC scale constant introduced with the 1999 FFMC revision
const FFMC_SCALE: f64 = 147.27723;

/// ISI constant relating the fine fuel and wind functions
pub const ISI_COEFFICIENT: f64 = 0.208;

/// Fine fuel moisture content (%) from the Fine Fuel Moisture Code
///
/// # Formula
/// ```text
/// m = 147.27723 × (101 - FFMC) / (59.5 + FFMC)
/// ```
#[inline]
pub fn fine_fuel_moisture(ffmc: f64) -> f64 {
    FFMC_SCALE * (101.0 - ffmc) / (59.5 + ffmc)
}

/// Fine fuel moisture function `f(F)` of the ISI
///
/// # Formula
/// ```text
/// f(F) = 91.9 × e^(-0.1386 m) × (1 + m^5.31 / 4.93e7)
/// ```
#[inline]
pub fn fine_fuel_function(moisture: f64) -> f64 {
    91.9 * (-0.1386 * moisture).exp() * (1.0 + moisture.powf(5.31) / 4.93e7)
}

/// Wind function `f(W)` of the ISI for a wind speed in km/h
///
/// Uses the 2009 high-wind correction above 40 km/h.
#[inline]
pub fn wind_function(wind_speed: f64) -> f64 {
    if wind_speed > 40.0 {
        12.0 * (1.0 - (-0.0818 * (wind_speed - 28.0)).exp())
    } else {
        (0.05039 * wind_speed).exp()
    }
}

/// Initial Spread Index from a wind speed and the fine fuel function
#[inline]
pub fn initial_spread_index(wind_speed: f64, fine_fuel: f64) -> f64 {
    ISI_COEFFICIENT * wind_function(wind_speed) * fine_fuel
}

/// Backing-fire ISI (wind acting against the spread direction)
#[inline]
pub fn back_spread_index(wind_speed: f64, fine_fuel: f64) -> f64 {
    ISI_COEFFICIENT * (-0.05039 * wind_speed).exp() * fine_fuel
}

/// Day of year of minimum foliar moisture (FBP eqs 1-4)
///
/// # Arguments
/// * `latitude` - Latitude (degrees)
/// * `longitude` - Longitude (degrees, negative west)
/// * `elevation` - Elevation (m) when known
pub fn minimum_fmc_day(latitude: f64, longitude: f64, elevation: Option<f64>) -> f64 {
    let lon = longitude.abs();
    match elevation {
        Some(elev) if elev > 0.0 => {
            let normalised = 43.0 + 33.7 * (-0.0351 * (150.0 - lon)).exp();
            142.1 * (latitude / normalised) + 0.0172 * elev
        }
        _ => {
            let normalised = 46.0 + 23.4 * (-0.0360 * (150.0 - lon)).exp();
            151.0 * (latitude / normalised)
        }
    }
}

/// Foliar moisture content (%) for a given day number difference (FBP eqs 5-7)
pub fn foliar_moisture_for_offset(days_from_minimum: f64) -> f64 {
    let nd = days_from_minimum.abs();
    if nd < 30.0 {
        85.0 + 0.0189 * nd * nd
    } else if nd < 50.0 {
        32.9 + 3.17 * nd - 0.0288 * nd * nd
    } else {
        120.0
    }
}

/// Resolve the Julian day used for foliar moisture
///
/// Priority: cell `jd`, the weather record's date, the cell's month (15th),
/// otherwise `None`.
pub fn resolve_julian_day(attributes: &CellAttributes, weather_day: Option<u16>) -> Option<u16> {
    attributes
        .julian_day
        .or(weather_day)
        .or_else(|| attributes.month.map(mid_month_day))
}

/// Julian day of the 15th of `month` in a non-leap year
fn mid_month_day(month: u8) -> u16 {
    const CUMULATIVE: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    let index = usize::from(month.clamp(1, 12) - 1);
    CUMULATIVE[index] + 15
}

/// Foliar moisture content (%) of a cell on a given Julian day
///
/// When no day can be resolved the day of minimum FMC is used, which gives
/// the driest foliage of the season (85 %).
pub fn foliar_moisture(attributes: &CellAttributes, julian_day: Option<u16>) -> f64 {
    let d0 = attributes.julian_day_min.map_or_else(
        || {
            minimum_fmc_day(
                attributes.latitude,
                attributes.longitude,
                attributes.elevation,
            )
            .round()
        },
        f64::from,
    );
    let day = julian_day.map_or(d0, f64::from);
    foliar_moisture_for_offset(day - d0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fine_fuel_moisture_reference_points() {
        // FFMC 85 is the classic "moderate" reference moisture (~16%)
        assert_relative_eq!(fine_fuel_moisture(85.0), 16.31, epsilon = 0.01);
        assert_relative_eq!(fine_fuel_moisture(101.0), 0.0, epsilon = 1e-12);
        assert!(fine_fuel_moisture(95.0) < fine_fuel_moisture(85.0));
    }

    #[test]
    fn test_isi_matches_fwi_tables() {
        // FFMC 90: ISI ≈ 4.3 in calm air and ≈ 11.7 at 20 km/h
        let ff = fine_fuel_function(fine_fuel_moisture(90.0));
        assert!((initial_spread_index(0.0, ff) - 4.28).abs() < 0.02);
        let isi = initial_spread_index(20.0, ff);
        assert!((isi - 11.74).abs() < 0.05, "ISI was {isi}");
    }

    #[test]
    fn test_wind_function_continuous_at_40() {
        let below = wind_function(40.0);
        let above = wind_function(40.0001);
        assert!((below - above).abs() < 0.05, "{below} vs {above}");
    }

    #[test]
    fn test_back_isi_below_head_isi() {
        let ff = fine_fuel_function(fine_fuel_moisture(90.0));
        assert!(back_spread_index(20.0, ff) < initial_spread_index(0.0, ff));
        assert_relative_eq!(
            back_spread_index(0.0, ff),
            initial_spread_index(0.0, ff),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_foliar_moisture_curve() {
        assert_relative_eq!(foliar_moisture_for_offset(0.0), 85.0);
        assert_relative_eq!(foliar_moisture_for_offset(-20.0), 92.56, epsilon = 1e-9);
        assert_relative_eq!(foliar_moisture_for_offset(60.0), 120.0);
    }

    #[test]
    fn test_foliar_moisture_uses_override_day() {
        let attributes = CellAttributes {
            julian_day_min: Some(150),
            ..CellAttributes::default()
        };
        assert_relative_eq!(foliar_moisture(&attributes, Some(150)), 85.0);
        assert_relative_eq!(foliar_moisture(&attributes, Some(250)), 120.0);
        assert_relative_eq!(foliar_moisture(&attributes, None), 85.0);
    }

    #[test]
    fn test_julian_day_resolution_order() {
        let mut attributes = CellAttributes {
            month: Some(7),
            ..CellAttributes::default()
        };
        assert_eq!(resolve_julian_day(&attributes, None), Some(196));
        assert_eq!(resolve_julian_day(&attributes, Some(200)), Some(200));
        attributes.julian_day = Some(10);
        assert_eq!(resolve_julian_day(&attributes, Some(200)), Some(10));
    }
}

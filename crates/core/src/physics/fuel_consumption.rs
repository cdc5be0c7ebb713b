//! Surface and crown fuel consumption (kg/m²)
//!
//! # Scientific References
//! - Forestry Canada Fire Danger Group (1992). ST-X-3, equations 9-25.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). GLC-X-10, equations 9a-9b, 10-12.

use crate::core_types::cell::CellAttributes;
use crate::core_types::fuel::FuelType;

#[inline]
fn saturating(scale: f64, rate: f64, bui: f64) -> f64 {
    scale * (1.0 - (-rate * bui).exp())
}

/// Surface fuel consumption of a fuel type (kg/m²)
///
/// Mixedwood consumption is the conifer-weighted blend of C2 and D1;
/// grass consumes its whole fuel load.
pub fn surface_fuel_consumption(
    fuel: FuelType,
    ffmc: f64,
    bui: f64,
    attributes: &CellAttributes,
) -> f64 {
    match fuel {
        FuelType::C1 => {
            let offset = ffmc - 84.0;
            if offset > 0.0 {
                0.75 + 0.75 * (1.0 - (-0.23 * offset).exp()).sqrt()
            } else {
                0.75 - 0.75 * (1.0 - (0.23 * offset).exp()).sqrt()
            }
        }
        FuelType::C2 | FuelType::M3 | FuelType::M4 => saturating(5.0, 0.0115, bui),
        FuelType::C3 | FuelType::C4 => 5.0 * (1.0 - (-0.0164 * bui).exp()).powf(2.24),
        FuelType::C5 | FuelType::C6 => 5.0 * (1.0 - (-0.0149 * bui).exp()).powf(2.48),
        FuelType::C7 => {
            let forest_floor = if ffmc > 70.0 {
                2.0 * (1.0 - (-0.104 * (ffmc - 70.0)).exp())
            } else {
                0.0
            };
            forest_floor + saturating(1.5, 0.0201, bui)
        }
        FuelType::D1 => saturating(1.5, 0.0183, bui),
        FuelType::M1 | FuelType::M2 => {
            let pc = attributes.percent_conifer / 100.0;
            pc * saturating(5.0, 0.0115, bui) + (1.0 - pc) * saturating(1.5, 0.0183, bui)
        }
        FuelType::S1 => saturating(4.0, 0.025, bui) + saturating(4.0, 0.034, bui),
        FuelType::S2 => saturating(10.0, 0.013, bui) + saturating(6.0, 0.060, bui),
        FuelType::S3 => saturating(12.0, 0.0166, bui) + saturating(20.0, 0.0210, bui),
        FuelType::O1a | FuelType::O1b => attributes.grass_fuel_load,
    }
}

/// Crown fuel load available to a crown fire (kg/m²)
///
/// Mixedwoods only carry crown fuel in their conifer (M1/M2) or
/// dead-fir (M3/M4) share.
pub fn crown_fuel_load(fuel: FuelType, attributes: &CellAttributes) -> f64 {
    let cfl = fuel.parameters().cfl;
    match fuel {
        FuelType::M1 | FuelType::M2 => cfl * attributes.percent_conifer / 100.0,
        FuelType::M3 | FuelType::M4 => cfl * attributes.percent_dead_fir / 100.0,
        _ => cfl,
    }
}

//! Elliptical fire shape and directional spread rates
//!
//! The FBP system assumes a point-source fire grows as an ellipse whose
//! ignition point sits on the major axis behind the centre. With head rate
//! `H`, back rate `B`, flank rate `F` and ellipse factor `E`:
//!
//! ```text
//! a = (H + B) / 2          semi-major axis (per minute)
//! c = E (H - B) / 2        offset of the ignition point from the centre
//! b = F                    semi-minor axis
//! ```
//!
//! The ignition point is not the geometric focus `sqrt(a² - b²)`. With
//! `E = 1` it sits where the head and back distances are exactly `H` and `B`,
//! so rates do not fall monotonically from head to back: a point just off
//! the back direction can be closer than the back itself.
//!
//! The spread rate towards a direction is the distance from the ignition
//! point to the ellipse boundary along that direction. It is only defined
//! while the ignition point lies inside the ellipse (`|c| <= a`); see
//! [`ignition_inside`].
//!
//! # Scientific References
//! - Forestry Canada Fire Danger Group (1992). ST-X-3, equations 79-90.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). GLC-X-10, equation 80a.

use crate::core_types::fuel::FuelType;

/// Length-to-breadth ratio of the fire ellipse
///
/// # Formula
/// ```text
/// LB = 1 + 8.729 (1 - e^(-0.030 WSV))^2.155     forest and slash fuels
/// LB = 1.1 WSV^0.464                            grass, WSV ≥ 1 km/h
/// ```
#[inline]
pub fn length_to_breadth(fuel: FuelType, net_wind: f64) -> f64 {
    if fuel.is_grass() {
        if net_wind < 1.0 {
            1.0
        } else {
            1.1 * net_wind.powf(0.464)
        }
    } else {
        1.0 + 8.729 * (1.0 - (-0.030 * net_wind).exp()).powf(2.155)
    }
}

/// Flank fire spread rate (m/min)
#[inline]
pub fn flank_rate(head: f64, back: f64, length_to_breadth: f64) -> f64 {
    (head + back) / (2.0 * length_to_breadth)
}

/// True when the ignition point lies inside (or on) the fire ellipse
#[inline]
pub fn ignition_inside(head: f64, back: f64, eccentricity: f64) -> bool {
    (eccentricity * 0.5 * (head - back)).abs() <= 0.5 * (head + back)
}

/// Spread rate from the ignition point towards `angle` radians off the head direction
///
/// The ignition point must lie inside the ellipse ([`ignition_inside`]);
/// [`crate::physics::FbpModel::predict`] rejects predictions where it does
/// not. An ellipse without area (zero semi-axis) reaches no neighbour and
/// yields 0.
pub fn directional_rate(head: f64, flank: f64, back: f64, eccentricity: f64, angle: f64) -> f64 {
    let a = 0.5 * (head + back);
    let b = flank;
    if a <= 0.0 || b <= 0.0 {
        return 0.0;
    }
    let c = eccentricity * 0.5 * (head - back);
    debug_assert!(c.abs() <= a, "ignition point outside the fire ellipse");
    let (sin, cos) = angle.sin_cos();

    // Ray from the ignition point at (-c, 0): ((t cos - c)/a)² + (t sin/b)² = 1.
    // With |c| <= a the constant term is <= 0, so the larger root is >= 0.
    let a2 = a * a;
    let qa = cos * cos / a2 + sin * sin / (b * b);
    let qb = -2.0 * c * cos / a2;
    let qc = c * c / a2 - 1.0;
    let discriminant = qb * qb - 4.0 * qa * qc;
    (-qb + discriminant.sqrt()) / (2.0 * qa)
}

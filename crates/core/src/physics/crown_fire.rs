//! Van Wagner crown fire initiation as used by the FBP system
//!
//! - Critical surface intensity for crown fire initiation
//! - Critical surface spread rate
//! - Crown fraction burned
//! - C6 crown spread rate with the foliar moisture effect
//!
//! # Scientific References
//! - Van Wagner, C.E. (1977). "Conditions for the start and spread of crown fire"
//!   Canadian Journal of Forest Research, 7(1), 23-34
//! - Forestry Canada Fire Danger Group (1992). ST-X-3, equations 56-64.

/// Crown fire class by crown fraction burned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrownFireType {
    /// CFB < 0.1
    Surface,
    /// Intermittent torching, 0.1 ≤ CFB < 0.9
    Passive,
    /// Continuous crowning, CFB ≥ 0.9
    Active,
}

impl CrownFireType {
    /// Classify a crown fraction burned
    pub fn from_fraction(cfb: f64) -> Self {
        if cfb < 0.1 {
            CrownFireType::Surface
        } else if cfb < 0.9 {
            CrownFireType::Passive
        } else {
            CrownFireType::Active
        }
    }
}

/// Critical surface fire intensity for crown fire initiation (kW/m, FBP eq. 56)
///
/// # Formula
/// ```text
/// CSI = 0.001 × CBH^1.5 × (460 + 25.9 FMC)^1.5
/// ```
#[inline]
pub fn critical_surface_intensity(crown_base_height: f64, foliar_moisture: f64) -> f64 {
    0.001 * crown_base_height.powf(1.5) * (460.0 + 25.9 * foliar_moisture).powf(1.5)
}

/// Critical surface spread rate (m/min, FBP eq. 57)
///
/// Infinite when there is no surface consumption to carry the fire up.
#[inline]
pub fn critical_spread_rate(csi: f64, surface_consumption: f64) -> f64 {
    if surface_consumption > 0.0 {
        csi / (300.0 * surface_consumption)
    } else {
        f64::INFINITY
    }
}

/// Crown fraction burned (FBP eq. 58)
#[inline]
pub fn crown_fraction_burned(ros: f64, critical_ros: f64) -> f64 {
    if ros > critical_ros {
        1.0 - (-0.23 * (ros - critical_ros)).exp()
    } else {
        0.0
    }
}

/// Foliar moisture effect on C6 crown spread (FBP eqs 61-62)
#[inline]
pub fn foliar_moisture_effect(foliar_moisture: f64) -> f64 {
    1000.0 * (1.5 - 0.00275 * foliar_moisture).powi(4) / (460.0 + 25.9 * foliar_moisture)
}

/// C6 crown fire spread rate (m/min, FBP eq. 64)
#[inline]
pub fn c6_crown_spread_rate(isi: f64, foliar_moisture: f64) -> f64 {
    60.0 * (1.0 - (-0.0497 * isi).exp()) * foliar_moisture_effect(foliar_moisture) / 0.778
}

//! Fuel-specific initial spread rate and buildup effect
//!
//! Every FBP fuel is expressed as (at most) two weighted spread curves so the
//! hot path evaluates the same arithmetic for pure and mixed fuel types:
//!
//! ```text
//! RSI = w₁ · a₁(1 - e^(-b₁ ISI))^c₁ + w₂ · a₂(1 - e^(-b₂ ISI))^c₂
//! ```
//!
//! Pure fuels carry a zero second weight. Mixedwoods (M1-M4) blend their
//! conifer or dead-fir curve with D1; grasses scale by the curing factor.
//! The slope-equivalent ISI uses separate weights (FBP eqs 42a-42c).
//!
//! # References
//! - Forestry Canada Fire Danger Group (1992). ST-X-3, equations 26-41.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). GLC-X-10, equation 35b.

use crate::core_types::cell::CellAttributes;
use crate::core_types::fuel::{FuelParameters, FuelType, SpreadCurve};

/// One weighted spread curve of a fuel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadComponent {
    pub curve: SpreadCurve,
    /// Weight applied to the curve's RSI
    pub rsi_weight: f64,
    /// Weight applied to the curve's slope-equivalent ISI
    pub isf_weight: f64,
}

/// Weighted spread curves of a fuel at a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadCurves {
    components: [SpreadComponent; 2],
}

impl SpreadCurves {
    /// Build the curves for `fuel` using the cell's mixture and curing inputs
    pub fn for_fuel(fuel: FuelType, attributes: &CellAttributes) -> Self {
        let params = fuel.parameters();
        let deciduous = FuelType::deciduous_curve();
        let single = |rsi_weight: f64| SpreadCurves {
            components: [
                SpreadComponent {
                    curve: params.curve,
                    rsi_weight,
                    isf_weight: 1.0,
                },
                SpreadComponent {
                    curve: params.curve,
                    rsi_weight: 0.0,
                    isf_weight: 0.0,
                },
            ],
        };
        let mixed = |share: f64, deciduous_scale: f64| SpreadCurves {
            components: [
                SpreadComponent {
                    curve: params.curve,
                    rsi_weight: share,
                    isf_weight: share,
                },
                SpreadComponent {
                    curve: deciduous,
                    rsi_weight: deciduous_scale * (1.0 - share),
                    isf_weight: 1.0 - share,
                },
            ],
        };

        match fuel {
            FuelType::M1 => mixed(attributes.percent_conifer / 100.0, 1.0),
            FuelType::M2 => mixed(attributes.percent_conifer / 100.0, 0.2),
            FuelType::M3 => mixed(attributes.percent_dead_fir / 100.0, 1.0),
            FuelType::M4 => mixed(attributes.percent_dead_fir / 100.0, 0.2),
            FuelType::O1a | FuelType::O1b => single(curing_factor(attributes.curing)),
            _ => single(1.0),
        }
    }

    /// Initial spread rate (m/min) before the buildup effect
    #[inline]
    pub fn rsi(&self, isi: f64) -> f64 {
        let [first, second] = &self.components;
        first.rsi_weight * first.curve.rsi(isi) + second.rsi_weight * second.curve.rsi(isi)
    }

    /// Slope-equivalent ISI for a slope factor (FBP eqs 40-42)
    ///
    /// Each curve is pushed along by the slope factor and inverted on its own
    /// before the weighted sum.
    #[inline]
    pub fn slope_isi(&self, zero_wind_isi: f64, slope_factor: f64) -> f64 {
        let [first, second] = &self.components;
        let isf = |c: &SpreadComponent| {
            c.curve
                .isi_for(c.curve.rsi(zero_wind_isi) * slope_factor)
        };
        first.isf_weight * isf(first) + second.isf_weight * isf(second)
    }
}

/// Grass curing factor (Wotton et al. 2009, eq. 35b)
///
/// # Formula
/// ```text
/// CF = 0.005 (e^(0.061 C) - 1)        C < 58.8
/// CF = 0.176 + 0.02 (C - 58.8)        C ≥ 58.8
/// ```
#[inline]
pub fn curing_factor(curing: f64) -> f64 {
    if curing < 58.8 {
        0.005 * ((0.061 * curing).exp() - 1.0)
    } else {
        0.176 + 0.02 * (curing - 58.8)
    }
}

/// Buildup effect on spread rate (FBP eq. 54)
///
/// # Formula
/// ```text
/// BE = exp(50 ln(q) (1/BUI - 1/BUI₀))     BUI > 0
/// BE = 1                                  BUI = 0
/// ```
#[inline]
pub fn buildup_effect(params: &FuelParameters, bui: f64) -> f64 {
    if bui > 0.0 && params.bui0 > 0.0 {
        (50.0 * params.q.ln() * (1.0 / bui - 1.0 / params.bui0)).exp()
    } else {
        1.0
    }
}

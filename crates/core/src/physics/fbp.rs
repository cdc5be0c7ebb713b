//! Canadian Forest Fire Behavior Prediction (FBP) model
//!
//! Maps a cell, a weather record and directional factors to head, flank and
//! back spread rates, head fire intensity and the spread direction. The
//! model is stateless: every evaluation is independent, so the spread engine
//! can evaluate a whole fire front in parallel.
//!
//! # Pipeline
//! 1. Fine fuel moisture and foliar moisture
//! 2. Slope-equivalent wind and net effective wind
//! 3. ISI, fuel-specific RSI, buildup effect
//! 4. Surface consumption, crown fraction burned, C6 crown spread
//! 5. Back and flank rates, length-to-breadth ratio, intensity
//! 6. Directional factors and log-normal spread variability
//!
//! # Scientific References
//! - Forestry Canada Fire Danger Group (1992). ST-X-3.
//! - Wotton, B.M., Alexander, M.E., Taylor, S.W. (2009). GLC-X-10.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::crown_fire::{
    c6_crown_spread_rate, critical_spread_rate, critical_surface_intensity,
    crown_fraction_burned, CrownFireType,
};
use super::ellipse::{directional_rate, flank_rate, ignition_inside, length_to_breadth};
use super::fuel_consumption::{crown_fuel_load, surface_fuel_consumption};
use super::fuel_moisture::{
    back_spread_index, fine_fuel_function, fine_fuel_moisture, foliar_moisture,
    initial_spread_index, resolve_julian_day,
};
use super::spread_rate::{buildup_effect, SpreadCurves};
use super::terrain_physics::net_effective_wind;
use crate::core_types::{Cell, FuelType, WeatherRecord};
use crate::error::{SimError, SimResult};

/// Multipliers applied to the three spread rates and the ellipse offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpreadFactors {
    pub head: f64,
    pub flank: f64,
    pub back: f64,
    /// Scales the offset of the ignition point from the ellipse centre
    pub eccentricity: f64,
}

impl Default for SpreadFactors {
    fn default() -> Self {
        Self {
            head: 1.0,
            flank: 1.0,
            back: 1.0,
            eccentricity: 1.0,
        }
    }
}

impl SpreadFactors {
    /// Element-wise product, used to layer per-fuel tuning over global factors
    pub fn combined(&self, other: &SpreadFactors) -> SpreadFactors {
        SpreadFactors {
            head: self.head * other.head,
            flank: self.flank * other.flank,
            back: self.back * other.back,
            eccentricity: self.eccentricity * other.eccentricity,
        }
    }

    /// Check that every factor is finite and non-negative
    pub fn validate(&self) -> SimResult<()> {
        for (name, value) in [
            ("head factor", self.head),
            ("flank factor", self.flank),
            ("back factor", self.back),
            ("ellipse factor", self.eccentricity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::configuration(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Fire behaviour predicted for one burning cell in one period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePrediction {
    /// Head fire spread rate (m/min)
    pub ros_head: f64,
    /// Flank fire spread rate (m/min)
    pub ros_flank: f64,
    /// Back fire spread rate (m/min)
    pub ros_back: f64,
    /// Head fire intensity (kW/m)
    pub hfi: f64,
    /// Spread azimuth (degrees clockwise from north)
    pub raz: f64,
    /// Length-to-breadth ratio
    pub lb: f64,
    /// Crown fraction burned
    pub cfb: f64,
    /// Ellipse offset factor the rates were produced with
    pub eccentricity: f64,
    /// True when the fire can carry to neighbours this period
    pub is_spreading: bool,
}

impl FirePrediction {
    /// Crown fire class of the head fire
    pub fn crown_fire_type(&self) -> CrownFireType {
        CrownFireType::from_fraction(self.cfb)
    }

    /// Spread rate towards `azimuth` (degrees clockwise from north)
    ///
    /// Predictions returned by [`FbpModel::predict`] always keep the ignition
    /// point inside the fire ellipse.
    #[inline]
    pub fn ros_toward(&self, azimuth: f64) -> f64 {
        let angle = (azimuth - self.raz).to_radians();
        directional_rate(
            self.ros_head,
            self.ros_flank,
            self.ros_back,
            self.eccentricity,
            angle,
        )
    }
}

/// Stateless FBP evaluator with the run's spread thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FbpModel {
    ros_threshold: f64,
    hfi_threshold: f64,
    /// Log-normal parameters `(mu, sigma)` when variability is enabled
    variability: Option<(f64, f64)>,
}

impl FbpModel {
    /// Build a model from the spread thresholds and ROS coefficient of variation
    pub fn new(ros_threshold: f64, hfi_threshold: f64, ros_cv: f64) -> SimResult<Self> {
        for (name, value) in [
            ("ROS threshold", ros_threshold),
            ("HFI threshold", hfi_threshold),
            ("ROS coefficient of variation", ros_cv),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::configuration(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        // Mean-one log-normal: sigma² = ln(1 + cv²), mu = -sigma²/2
        let variability = (ros_cv > 0.0).then(|| {
            let variance = ros_cv.mul_add(ros_cv, 1.0).ln();
            (-0.5 * variance, variance.sqrt())
        });
        Ok(Self {
            ros_threshold,
            hfi_threshold,
            variability,
        })
    }

    pub fn ros_threshold(&self) -> f64 {
        self.ros_threshold
    }

    pub fn hfi_threshold(&self) -> f64 {
        self.hfi_threshold
    }

    /// True when predictions draw a random spread multiplier
    pub fn is_stochastic(&self) -> bool {
        self.variability.is_some()
    }

    /// Predict fire behaviour for a burning cell
    ///
    /// # Arguments
    /// * `cell` - Burning cell (non-fuel cells yield a non-spreading prediction)
    /// * `weather` - Weather record of the current period
    /// * `factors` - Directional factors, already combined with fuel tuning
    /// * `period` - Global period, for error reporting
    /// * `rng` - Source of the spread multiplier when variability is enabled
    pub fn predict<R: Rng>(
        &self,
        cell: &Cell,
        weather: &WeatherRecord,
        factors: &SpreadFactors,
        period: u32,
        rng: &mut R,
    ) -> SimResult<FirePrediction> {
        let Some(fuel) = cell.fuel else {
            return Ok(FirePrediction {
                ros_head: 0.0,
                ros_flank: 0.0,
                ros_back: 0.0,
                hfi: 0.0,
                raz: 0.0,
                lb: 1.0,
                cfb: 0.0,
                eccentricity: factors.eccentricity,
                is_spreading: false,
            });
        };
        check_inputs(cell, weather, period)?;

        let attributes = &cell.attributes;
        let ffmc = weather.ffmc;
        let bui = weather.bui;
        let fine_fuel = fine_fuel_function(fine_fuel_moisture(ffmc));
        let fmc = foliar_moisture(attributes, resolve_julian_day(attributes, weather.julian_day));

        let curves = SpreadCurves::for_fuel(fuel, attributes);
        let wind = net_effective_wind(
            weather.wind_speed,
            weather.wind_azimuth(),
            attributes.slope_percent,
            attributes.slope_azimuth,
            &curves,
            fine_fuel,
        );

        let params = fuel.parameters();
        let be = buildup_effect(&params, bui);
        let isi = initial_spread_index(wind.speed, fine_fuel);
        let back_isi = back_spread_index(wind.speed, fine_fuel);
        let sfc = surface_fuel_consumption(fuel, ffmc, bui, attributes);

        let crown = |surface_ros: f64, isi: f64| -> (f64, f64) {
            if !fuel.has_canopy() {
                return (surface_ros, 0.0);
            }
            let csi = critical_surface_intensity(params.cbh, fmc);
            let cfb = crown_fraction_burned(surface_ros, critical_spread_rate(csi, sfc));
            if fuel == FuelType::C6 {
                let rsc = c6_crown_spread_rate(isi, fmc);
                (surface_ros + cfb * (rsc - surface_ros), cfb)
            } else {
                (surface_ros, cfb)
            }
        };

        let (head, cfb) = crown(curves.rsi(isi) * be, isi);
        let (back, _) = crown(curves.rsi(back_isi) * be, back_isi);
        let lb = length_to_breadth(fuel, wind.speed);
        let flank = flank_rate(head, back, lb);
        let tfc = sfc + cfb * crown_fuel_load(fuel, attributes);

        let multiplier = match self.variability {
            Some((mu, sigma)) => sigma.mul_add(standard_normal(rng), mu).exp(),
            None => 1.0,
        };
        let ros_head = head * factors.head * multiplier;
        let ros_flank = flank * factors.flank * multiplier;
        let ros_back = back * factors.back * multiplier;
        let hfi = 300.0 * tfc * ros_head;

        for (quantity, value) in [
            ("head ROS", ros_head),
            ("flank ROS", ros_flank),
            ("back ROS", ros_back),
            ("HFI", hfi),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::model(
                    cell.id,
                    period,
                    format!("{quantity} evaluated to {value} for fuel {fuel}"),
                ));
            }
        }
        if !ignition_inside(ros_head, ros_back, factors.eccentricity) {
            return Err(SimError::model(
                cell.id,
                period,
                format!(
                    "ellipse factor {} puts the ignition point outside the fire ellipse \
                     (head ROS {ros_head}, back ROS {ros_back})",
                    factors.eccentricity
                ),
            ));
        }

        Ok(FirePrediction {
            ros_head,
            ros_flank,
            ros_back,
            hfi,
            raz: wind.azimuth,
            lb,
            cfb,
            eccentricity: factors.eccentricity,
            is_spreading: ros_head >= self.ros_threshold && hfi >= self.hfi_threshold,
        })
    }
}

fn check_inputs(cell: &Cell, weather: &WeatherRecord, period: u32) -> SimResult<()> {
    let out_of_domain = |quantity: &str, value: f64, range: &str| {
        Err(SimError::model(
            cell.id,
            period,
            format!("{quantity} {value} outside {range}"),
        ))
    };
    if !(0.0..=101.0).contains(&weather.ffmc) {
        return out_of_domain("FFMC", weather.ffmc, "[0, 101]");
    }
    if !weather.bui.is_finite() || weather.bui < 0.0 {
        return out_of_domain("BUI", weather.bui, "[0, inf)");
    }
    if !weather.wind_speed.is_finite() || weather.wind_speed < 0.0 {
        return out_of_domain("wind speed", weather.wind_speed, "[0, inf)");
    }
    if !weather.wind_direction.is_finite() {
        return out_of_domain("wind direction", weather.wind_direction, "[0, 360]");
    }
    let attributes = &cell.attributes;
    if !attributes.slope_percent.is_finite() || attributes.slope_percent < 0.0 {
        return out_of_domain("slope", attributes.slope_percent, "[0, inf)");
    }
    Ok(())
}

/// Standard normal deviate via the Box-Muller transform
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

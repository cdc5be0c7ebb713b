//! Grid cells and their per-period state

use super::fuel::FuelType;
use serde::{Deserialize, Serialize};

/// Dynamic state of a cell
///
/// Stored as a flat `Vec<CellState>` indexed by cell id. The discriminants are
/// the codes used in snapshot and message output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum CellState {
    /// Unburnt fuel that can ignite
    #[default]
    Available = 0,
    /// Actively burning
    Burning = 1,
    /// Burnt out (terminal)
    Burnt = 2,
    /// No fuel (terminal, static)
    NonFuel = 3,
    /// Fuel removed by the harvest plan (terminal)
    Harvested = 4,
}

impl CellState {
    /// Numeric code written to message logs
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name
    pub const fn name(self) -> &'static str {
        match self {
            CellState::Available => "Available",
            CellState::Burning => "Burning",
            CellState::Burnt => "Burnt",
            CellState::NonFuel => "NonFuel",
            CellState::Harvested => "Harvested",
        }
    }

    /// True when the cell has been touched by fire
    #[inline]
    pub const fn is_fire_affected(self) -> bool {
        matches!(self, CellState::Burning | CellState::Burnt)
    }

    /// Whether `self -> next` is a transition the spread engine may perform
    ///
    /// Available cells can ignite, be harvested or (at initialisation) be
    /// marked non-fuel; burning cells can only burn out.
    pub const fn can_transition_to(self, next: CellState) -> bool {
        matches!(
            (self, next),
            (
                CellState::Available,
                CellState::Burning | CellState::Harvested | CellState::NonFuel
            ) | (CellState::Burning, CellState::Burnt)
        )
    }
}

impl std::fmt::Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static per-cell inputs to the FBP model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Degree of curing of grass fuels (%)
    pub curing: f64,
    /// Ground slope (%)
    pub slope_percent: f64,
    /// Up-slope direction (degrees clockwise from north)
    pub slope_azimuth: f64,
    /// Conifer content of mixedwood fuels (%)
    pub percent_conifer: f64,
    /// Dead balsam fir content of M3/M4 fuels (%)
    pub percent_dead_fir: f64,
    /// Grass fuel load (kg/m²)
    pub grass_fuel_load: f64,
    /// Elevation above sea level (m), if known
    pub elevation: Option<f64>,
    /// Latitude (degrees)
    pub latitude: f64,
    /// Longitude (degrees, negative west)
    pub longitude: f64,
    /// Julian day override
    pub julian_day: Option<u16>,
    /// Day of minimum foliar moisture override
    pub julian_day_min: Option<u16>,
    /// Month (1-12), used only to estimate the Julian day
    pub month: Option<u8>,
    /// Burn pattern label, carried through unchanged
    pub pattern: Option<String>,
}

impl Default for CellAttributes {
    fn default() -> Self {
        Self {
            curing: 60.0,
            slope_percent: 0.0,
            slope_azimuth: 0.0,
            percent_conifer: 50.0,
            percent_dead_fir: 35.0,
            grass_fuel_load: 0.35,
            elevation: None,
            latitude: 51.621244,
            longitude: -115.608378,
            julian_day: None,
            julian_day_min: None,
            month: None,
            pattern: None,
        }
    }
}

/// A grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// 0-based id (row-major index)
    pub id: usize,
    /// Row, 0 at the northern edge
    pub row: usize,
    /// Column, 0 at the western edge
    pub col: usize,
    /// Fuel type, `None` for non-fuel cells
    pub fuel: Option<FuelType>,
    /// Static FBP inputs
    pub attributes: CellAttributes,
}

impl Cell {
    /// 1-based id as used in every input and output file
    #[inline]
    pub const fn ncell(&self) -> usize {
        self.id + 1
    }

    /// True when the cell carries burnable fuel
    #[inline]
    pub const fn is_burnable(&self) -> bool {
        self.fuel.is_some()
    }
}

//! Fuel code mapping for raster fuel grids
//!
//! Maps the integer codes of a `Forest.asc` raster to FBP fuel labels.
//!
//! # Default Canadian codes
//!
//! - 1-7: C-1 to C-7
//! - 11: D-1
//! - 21-23: S-1 to S-3
//! - 31, 32: O-1a, O-1b
//! - 101-106: non-fuel, water, rock, urban...
//! - 4xx / 5xx: M-1 / M-2 with `xx` % conifer
//! - 6xx / 7xx: M-3 / M-4 with `xx` % dead fir
//!
//! A `fbp_lookup_table.csv` with `grid_value` and `fuel_type` columns
//! replaces the defaults entirely.

use std::path::Path;

use rustc_hash::FxHashMap;

use crate::core_types::fuel::{FuelLabel, FuelType};
use crate::error::{SimError, SimResult};
use crate::io::Table;

/// Fuel type mapping configuration
///
/// Maps raster grid codes to fuel labels.
#[derive(Debug, Clone)]
pub struct FuelMapping {
    mappings: FxHashMap<i64, FuelLabel>,
    source_name: String,
}

impl FuelMapping {
    /// The built-in Canadian FBP code table
    pub fn canadian_default() -> Self {
        let fuel = |fuel, percent| FuelLabel::Fuel { fuel, percent };
        let mut mappings = FxHashMap::default();

        let simple = [
            (1, FuelType::C1),
            (2, FuelType::C2),
            (3, FuelType::C3),
            (4, FuelType::C4),
            (5, FuelType::C5),
            (6, FuelType::C6),
            (7, FuelType::C7),
            (11, FuelType::D1),
            (21, FuelType::S1),
            (22, FuelType::S2),
            (23, FuelType::S3),
            (31, FuelType::O1a),
            (32, FuelType::O1b),
        ];
        for (code, fuel_type) in simple {
            mappings.insert(code, fuel(fuel_type, None));
        }
        for code in 101..=106 {
            mappings.insert(code, FuelLabel::NonFuel);
        }
        for (base, fuel_type) in [
            (400, FuelType::M1),
            (500, FuelType::M2),
            (600, FuelType::M3),
            (700, FuelType::M4),
        ] {
            for percent in 0..=100 {
                mappings.insert(base + percent, fuel(fuel_type, Some(percent as f64)));
            }
        }

        Self {
            mappings,
            source_name: "built-in fuel table".to_string(),
        }
    }

    /// Load a `grid_value,fuel_type` lookup table
    pub fn from_file(path: &Path) -> SimResult<Self> {
        Self::from_table(&Table::read(path)?)
    }

    pub fn from_table(table: &Table) -> SimResult<Self> {
        let code_col = table.column("grid_value")?;
        let label_col = table.column("fuel_type")?;
        let mut mappings = FxHashMap::default();
        for row in table.rows() {
            let code = table.integer(row, code_col)?;
            let label = row
                .text(label_col)
                .parse::<FuelLabel>()
                .map_err(|e| table.error_at(row, label_col, e))?;
            mappings.insert(code, label);
        }
        Ok(Self {
            mappings,
            source_name: table.source_name().to_string(),
        })
    }

    /// Label for a grid code
    pub fn get_fuel(&self, code: i64) -> SimResult<FuelLabel> {
        self.mappings.get(&code).copied().ok_or_else(|| {
            SimError::data(
                &self.source_name,
                format!("grid code {code} has no fuel type"),
            )
        })
    }

    /// Set or replace the label of a code
    pub fn set_fuel(&mut self, code: i64, label: FuelLabel) {
        self.mappings.insert(code, label);
    }
}

impl Default for FuelMapping {
    fn default() -> Self {
        Self::canadian_default()
    }
}

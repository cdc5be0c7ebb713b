//! Per-fuel-type spread factor tuning
//!
//! Read from a `fueltype,hfactor,ffactor,bfactor,efactor` table. In tuned
//! mode each cell's factors are the global factors multiplied by the row of
//! its fuel type; fuel types without a row use the global factors alone.

use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::core_types::{FuelLabel, FuelType};
use crate::error::SimResult;
use crate::io::Table;
use crate::physics::SpreadFactors;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuelTuning {
    factors: FxHashMap<FuelType, SpreadFactors>,
}

impl FuelTuning {
    pub fn load(path: &Path) -> SimResult<Self> {
        Self::from_table(&Table::read(path)?)
    }

    pub fn from_table(table: &Table) -> SimResult<Self> {
        let fuel_col = table.column("fueltype")?;
        let columns = [
            table.column("hfactor")?,
            table.column("ffactor")?,
            table.column("bfactor")?,
            table.column("efactor")?,
        ];

        let mut factors = FxHashMap::default();
        for row in table.rows() {
            let fuel = match row.text(fuel_col).parse::<FuelLabel>() {
                Ok(FuelLabel::Fuel { fuel, .. }) => fuel,
                Ok(FuelLabel::NonFuel) => {
                    return Err(table.error_at(row, fuel_col, "non-fuel types cannot be tuned"))
                }
                Err(err) => return Err(table.error_at(row, fuel_col, err)),
            };
            let mut values = [0.0; 4];
            for (value, &column) in values.iter_mut().zip(&columns) {
                let parsed = table.number(row, column)?;
                if parsed < 0.0 {
                    return Err(table.error_at(row, column, format!("factor {parsed} must be >= 0")));
                }
                *value = parsed;
            }
            let [head, flank, back, eccentricity] = values;
            if factors
                .insert(
                    fuel,
                    SpreadFactors {
                        head,
                        flank,
                        back,
                        eccentricity,
                    },
                )
                .is_some()
            {
                return Err(table.error_at(row, fuel_col, format!("duplicate row for {fuel}")));
            }
        }
        debug!(source = table.source_name(), fuels = factors.len(), "Fuel tuning loaded");
        Ok(Self { factors })
    }

    pub fn set(&mut self, fuel: FuelType, factors: SpreadFactors) {
        self.factors.insert(fuel, factors);
    }

    pub fn get(&self, fuel: FuelType) -> Option<&SpreadFactors> {
        self.factors.get(&fuel)
    }

    /// Global factors layered with the fuel's tuning row
    pub fn apply(&self, global: &SpreadFactors, fuel: Option<FuelType>) -> SpreadFactors {
        fuel.and_then(|f| self.get(f))
            .map_or(*global, |tuned| global.combined(tuned))
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_layers_over_global() {
        let table = Table::parse(
            "tuning.csv",
            "fueltype,hfactor,ffactor,bfactor,efactor\nC-2,2.0,1.5,0.5,1.0\nO-1a,1,1,1,0.8\n",
        )
        .unwrap();
        let tuning = FuelTuning::from_table(&table).unwrap();
        assert_eq!(tuning.len(), 2);

        let global = SpreadFactors {
            head: 0.5,
            ..SpreadFactors::default()
        };
        let c2 = tuning.apply(&global, Some(FuelType::C2));
        assert!((c2.head - 1.0).abs() < 1e-12);
        assert!((c2.flank - 1.5).abs() < 1e-12);
        assert_eq!(tuning.apply(&global, Some(FuelType::D1)), global);
        assert_eq!(tuning.apply(&global, None), global);
    }

    #[test]
    fn test_bad_rows_rejected() {
        for text in [
            "fueltype,hfactor,ffactor,bfactor,efactor\nZ9,1,1,1,1\n",
            "fueltype,hfactor,ffactor,bfactor,efactor\nNF,1,1,1,1\n",
            "fueltype,hfactor,ffactor,bfactor,efactor\nC2,-1,1,1,1\n",
            "fueltype,hfactor,ffactor,bfactor,efactor\nC2,1,1,1,1\nC-2,1,1,1,1\n",
            "fueltype,hfactor,ffactor,bfactor\nC2,1,1,1\n",
        ] {
            let table = Table::parse("tuning.csv", text).unwrap();
            assert!(FuelTuning::from_table(&table).is_err(), "{text}");
        }
    }
}

//! Grid construction from a fuel raster and a per-cell attribute table
//!
//! `Forest.asc` supplies the geometry and a fuel code per cell; `Data.csv`
//! supplies the static FBP inputs, one row per cell in row-major order.

use std::path::Path;

use tracing::debug;

use super::cell_grid::{Grid, GridGeometry};
use super::fuel_loader::FuelMapping;
use crate::core_types::fuel::{FuelLabel, FuelType};
use crate::core_types::{Cell, CellAttributes};
use crate::error::{SimError, SimResult};
use crate::io::{AsciiRaster, Table, TableRow};

/// Columns every attribute table must carry
pub const ATTRIBUTE_COLUMNS: [&str; 20] = [
    "fueltype", "mon", "jd", "M", "jd_min", "lat", "lon", "elev", "ffmc", "ws", "waz", "bui",
    "ps", "saz", "pc", "pdf", "gfl", "cur", "time", "pattern",
];

/// Builds [`Grid`]s from raster and attribute inputs
#[derive(Debug, Clone)]
pub struct GridLoader<'a> {
    mapping: &'a FuelMapping,
}

/// Column indices of the attribute table
struct Columns {
    fueltype: usize,
    mon: usize,
    jd: usize,
    jd_min: usize,
    lat: usize,
    lon: usize,
    elev: usize,
    ps: usize,
    saz: usize,
    pc: usize,
    pdf: usize,
    gfl: usize,
    cur: usize,
    pattern: usize,
}

impl<'a> GridLoader<'a> {
    pub fn new(mapping: &'a FuelMapping) -> Self {
        Self { mapping }
    }

    /// Load `forest` (ESRI ASCII) and `data` (attribute CSV) into a grid
    pub fn load(&self, forest: &Path, data: &Path) -> SimResult<Grid> {
        let raster = AsciiRaster::read(forest)?;
        let table = Table::read(data)?;
        self.build(&raster, &table)
    }

    /// Combine an already parsed raster and attribute table
    pub fn build(&self, raster: &AsciiRaster, table: &Table) -> SimResult<Grid> {
        table.require_columns(&ATTRIBUTE_COLUMNS)?;
        let expected = raster.nrows * raster.ncols;
        if table.len() != expected {
            return Err(SimError::data(
                table.source_name(),
                format!(
                    "{} attribute rows for a {}x{} raster ({} cells)",
                    table.len(),
                    raster.nrows,
                    raster.ncols,
                    expected
                ),
            ));
        }

        let columns = Columns {
            fueltype: table.column("fueltype")?,
            mon: table.column("mon")?,
            jd: table.column("jd")?,
            jd_min: table.column("jd_min")?,
            lat: table.column("lat")?,
            lon: table.column("lon")?,
            elev: table.column("elev")?,
            ps: table.column("ps")?,
            saz: table.column("saz")?,
            pc: table.column("pc")?,
            pdf: table.column("pdf")?,
            gfl: table.column("gfl")?,
            cur: table.column("cur")?,
            pattern: table.column("pattern")?,
        };

        let cells = table
            .rows()
            .iter()
            .zip(&raster.values)
            .enumerate()
            .map(|(id, (row, &code))| self.build_cell(id, raster, code, table, row, &columns))
            .collect::<SimResult<Vec<_>>>()?;

        let burnable = cells.iter().filter(|c| c.is_burnable()).count();
        debug!(
            rows = raster.nrows,
            cols = raster.ncols,
            burnable,
            "Grid loaded"
        );

        Grid::new(
            GridGeometry {
                rows: raster.nrows,
                cols: raster.ncols,
                cell_size: raster.cell_size,
                xll: raster.xll,
                yll: raster.yll,
            },
            cells,
        )
    }

    fn build_cell(
        &self,
        id: usize,
        raster: &AsciiRaster,
        code: f64,
        table: &Table,
        row: &TableRow,
        columns: &Columns,
    ) -> SimResult<Cell> {
        let raster_label = if raster.is_nodata(code) {
            FuelLabel::NonFuel
        } else {
            self.mapping.get_fuel(code.round() as i64)?
        };

        let label = match raster_label {
            FuelLabel::NonFuel => FuelLabel::NonFuel,
            fuel @ FuelLabel::Fuel { .. } => {
                let text = row.text(columns.fueltype);
                if text.is_empty() {
                    fuel
                } else {
                    text.parse::<FuelLabel>()
                        .map_err(|e| table.error_at(row, columns.fueltype, e))?
                }
            }
        };

        let mut attributes = read_attributes(table, row, columns)?;
        let fuel = match label {
            FuelLabel::NonFuel => None,
            FuelLabel::Fuel { fuel, percent } => {
                if let Some(percent) = percent {
                    match fuel {
                        FuelType::M1 | FuelType::M2
                            if row.text(columns.pc).is_empty() =>
                        {
                            attributes.percent_conifer = percent;
                        }
                        FuelType::M3 | FuelType::M4
                            if row.text(columns.pdf).is_empty() =>
                        {
                            attributes.percent_dead_fir = percent;
                        }
                        _ => {}
                    }
                }
                Some(fuel)
            }
        };

        Ok(Cell {
            id,
            row: id / raster.ncols,
            col: id % raster.ncols,
            fuel,
            attributes,
        })
    }
}

fn read_attributes(table: &Table, row: &TableRow, columns: &Columns) -> SimResult<CellAttributes> {
    let defaults = CellAttributes::default();
    let ranged = |column: usize, default: f64, min: f64, max: f64| -> SimResult<f64> {
        let value = table.optional_number(row, column)?.unwrap_or(default);
        if value < min || value > max {
            return Err(table.error_at(
                row,
                column,
                format!("value {value} outside [{min}, {max}]"),
            ));
        }
        Ok(value)
    };
    let day = |column: usize| -> SimResult<Option<u16>> {
        match table.optional_number(row, column)? {
            None => Ok(None),
            Some(value) if value.fract() == 0.0 && (1.0..=366.0).contains(&value) => {
                Ok(Some(value as u16))
            }
            Some(value) => Err(table.error_at(
                row,
                column,
                format!("day of year {value} outside 1..=366"),
            )),
        }
    };

    let month = match table.optional_number(row, columns.mon)? {
        None => None,
        Some(value) if value.fract() == 0.0 && (1.0..=12.0).contains(&value) => Some(value as u8),
        Some(value) => {
            return Err(table.error_at(row, columns.mon, format!("month {value} outside 1..=12")))
        }
    };
    let pattern = Some(row.text(columns.pattern))
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Ok(CellAttributes {
        curing: ranged(columns.cur, defaults.curing, 0.0, 100.0)?,
        slope_percent: ranged(columns.ps, defaults.slope_percent, 0.0, f64::MAX)?,
        slope_azimuth: ranged(columns.saz, defaults.slope_azimuth, 0.0, 360.0)?,
        percent_conifer: ranged(columns.pc, defaults.percent_conifer, 0.0, 100.0)?,
        percent_dead_fir: ranged(columns.pdf, defaults.percent_dead_fir, 0.0, 100.0)?,
        grass_fuel_load: ranged(columns.gfl, defaults.grass_fuel_load, 0.0, f64::MAX)?,
        elevation: table.optional_number(row, columns.elev)?,
        latitude: ranged(columns.lat, defaults.latitude, -90.0, 90.0)?,
        longitude: ranged(columns.lon, defaults.longitude, -180.0, 180.0)?,
        julian_day: day(columns.jd)?,
        julian_day_min: day(columns.jd_min)?,
        month,
        pattern,
    })
}

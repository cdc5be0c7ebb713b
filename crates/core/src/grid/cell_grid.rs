//! Immutable cell graph shared by every replication
//!
//! Cells are stored in row-major order (row 0 at the northern edge). The
//! 8-connected neighbourhood is implicit in the raster geometry, so no
//! adjacency lists are stored: neighbour queries walk a fixed offset table.

use serde::{Deserialize, Serialize};

use crate::core_types::{Cell, CellAttributes, FuelType};
use crate::error::{SimError, SimResult};

/// Row/column offsets of the 8 neighbours and their azimuths (degrees from north)
const NEIGHBOUR_OFFSETS: [(isize, isize, f64); 8] = [
    (-1, 0, 0.0),
    (-1, 1, 45.0),
    (0, 1, 90.0),
    (1, 1, 135.0),
    (1, 0, 180.0),
    (1, -1, 225.0),
    (0, -1, 270.0),
    (-1, -1, 315.0),
];

/// Raster geometry of a grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub rows: usize,
    pub cols: usize,
    /// Cell edge length (m)
    pub cell_size: f64,
    pub xll: f64,
    pub yll: f64,
}

/// The landscape: ordered cells plus raster geometry
#[derive(Debug, Clone)]
pub struct Grid {
    geometry: GridGeometry,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major cells
    pub fn new(geometry: GridGeometry, cells: Vec<Cell>) -> SimResult<Self> {
        if cells.len() != geometry.rows * geometry.cols {
            return Err(SimError::data(
                "grid",
                format!(
                    "{} cells supplied for a {}x{} grid",
                    cells.len(),
                    geometry.rows,
                    geometry.cols
                ),
            ));
        }
        Ok(Self { geometry, cells })
    }

    /// A grid where every cell carries the same fuel and attributes
    pub fn uniform(
        rows: usize,
        cols: usize,
        cell_size: f64,
        fuel: Option<FuelType>,
        attributes: &CellAttributes,
    ) -> Self {
        let cells = (0..rows * cols)
            .map(|id| Cell {
                id,
                row: id / cols,
                col: id % cols,
                fuel,
                attributes: attributes.clone(),
            })
            .collect();
        Self {
            geometry: GridGeometry {
                rows,
                cols,
                cell_size,
                xll: 0.0,
                yll: 0.0,
            },
            cells,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.geometry.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.geometry.cols
    }

    /// Number of cells
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    /// Cell id of a row/column pair
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.geometry.cols + col
    }

    /// Convert a 1-based cell number from an input file to a cell id
    pub fn cell_id(&self, ncell: i64, source_name: &str) -> SimResult<usize> {
        match usize::try_from(ncell) {
            Ok(n) if (1..=self.cells.len()).contains(&n) => Ok(n - 1),
            _ => Err(SimError::data(
                source_name,
                format!(
                    "cell {ncell} does not exist (grid has cells 1..={})",
                    self.cells.len()
                ),
            )),
        }
    }

    /// The 8-connected neighbours of a cell with the azimuth towards each
    pub fn neighbours(&self, id: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let row = id / self.geometry.cols;
        let col = id % self.geometry.cols;
        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(move |&(dr, dc, azimuth)| {
                let r = row.checked_add_signed(dr)?;
                let c = col.checked_add_signed(dc)?;
                (r < self.geometry.rows && c < self.geometry.cols)
                    .then(|| (self.index(r, c), azimuth))
            })
    }

    /// All cells within Chebyshev distance `radius` of a cell, in id order
    ///
    /// Radius 0 yields the cell itself.
    pub fn cells_within(&self, id: usize, radius: usize) -> Vec<usize> {
        let row = id / self.geometry.cols;
        let col = id % self.geometry.cols;
        let row_range = row.saturating_sub(radius)..=(row + radius).min(self.geometry.rows - 1);
        let col_range = col.saturating_sub(radius)..=(col + radius).min(self.geometry.cols - 1);
        row_range
            .flat_map(|r| col_range.clone().map(move |c| (r, c)))
            .map(|(r, c)| self.index(r, c))
            .collect()
    }
}

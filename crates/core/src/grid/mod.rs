//! Landscape grid: geometry, fuel mapping and loading

pub mod cell_grid;
pub mod fuel_loader;
pub mod loader;

pub use cell_grid::{Grid, GridGeometry};
pub use fuel_loader::FuelMapping;
pub use loader::GridLoader;

//! Input file readers

pub mod raster;
pub mod table;

pub use raster::AsciiRaster;
pub use table::{Table, TableRow};

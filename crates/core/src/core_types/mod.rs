//! Core types and utilities

pub mod cell;
pub mod fuel;
pub mod weather;

// Re-export
pub use cell::*;
pub use fuel::*;
pub use weather::*;

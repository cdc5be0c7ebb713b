//! FBP fire behaviour physics
//!
//! Each submodule covers one group of FBP equations; [`fbp`] composes them
//! into the per-cell [`FbpModel`].

pub mod crown_fire;
pub mod ellipse;
pub mod fbp;
pub mod fuel_consumption;
pub mod fuel_moisture;
pub mod spread_rate;
pub mod terrain_physics;

pub use crown_fire::CrownFireType;
pub use fbp::{FbpModel, FirePrediction, SpreadFactors};

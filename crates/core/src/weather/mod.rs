//! Fire weather inputs

pub mod timeline;

pub use timeline::{TimelineSettings, WeatherMode, WeatherScenario, WeatherTimeline};

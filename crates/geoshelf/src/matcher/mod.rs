pub mod engine;
pub mod rules;

pub use engine::MatchEngine;
pub use rules::{ConfigId, ConfigLibrary, FreeformRule, SatelliteConfig};

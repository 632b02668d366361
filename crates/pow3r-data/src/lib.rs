//! Data-driven scenario loading for the Pow3r solver.
//!
//! Supports RON, JSON, and TOML formats. A scenario names its networks and
//! attaches supplies, loads and batteries to them by name; loading resolves
//! those names into a linked `PowerState` plus simulation settings.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let scenario = pow3r_data::load_scenario(Path::new("scenarios/bridge.ron")).unwrap();
//! let mut sim = scenario.into_simulation();
//! sim.advance(0.5);
//! ```

pub mod loader;
pub mod scenario;
pub mod schema;

pub use loader::DataLoadError;
pub use scenario::{Scenario, ScenarioNames, load_scenario, load_scenario_from_dir};

//! Serde data file structs for scenario definitions.
//!
//! A scenario file declares named networks and the supplies, loads and
//! batteries attached to them, plus simulation settings. It is deserialized
//! from RON, JSON, or TOML and then resolved into a `PowerState` by the
//! loader. Omitted fields take the same defaults as the model types.

use pow3r_core::state::{DEFAULT_RAMP_RATE, DEFAULT_RAMP_TOLERANCE};
use pow3r_solver::SolverKind;
use pow3r_solver::sim::DEFAULT_TICKS_PER_SECOND;
use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

fn default_ramp_rate() -> f32 {
    DEFAULT_RAMP_RATE
}

fn default_ramp_tolerance() -> f32 {
    DEFAULT_RAMP_TOLERANCE
}

fn default_ticks_per_second() -> u32 {
    DEFAULT_TICKS_PER_SECOND
}

// ===========================================================================
// Scenario
// ===========================================================================

/// A complete scenario file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioData {
    #[serde(default)]
    pub sim: SimData,
    #[serde(default)]
    pub networks: Vec<NetworkData>,
    #[serde(default)]
    pub supplies: Vec<SupplyData>,
    #[serde(default)]
    pub loads: Vec<LoadData>,
    #[serde(default)]
    pub batteries: Vec<BatteryData>,
}

/// Simulation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SimData {
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    #[serde(default)]
    pub solver: SolverKind,
}

impl Default for SimData {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            solver: SolverKind::default(),
        }
    }
}

// ===========================================================================
// Entities
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkData {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplyData {
    pub name: String,
    pub network: String,
    pub max_supply: f32,
    #[serde(default)]
    pub ramp_position: f32,
    #[serde(default = "default_ramp_rate")]
    pub ramp_rate: f32,
    #[serde(default = "default_ramp_tolerance")]
    pub ramp_tolerance: f32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoadData {
    pub name: String,
    pub network: String,
    pub desired_power: f32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A battery. Either port may be omitted to leave it unconnected.
#[derive(Debug, Clone, Deserialize)]
pub struct BatteryData {
    pub name: String,
    #[serde(default)]
    pub charging: Option<String>,
    #[serde(default)]
    pub discharging: Option<String>,
    pub capacity: f32,
    /// Initial stored energy in joules.
    #[serde(default)]
    pub storage: f32,
    #[serde(default)]
    pub max_charge_rate: f32,
    #[serde(default)]
    pub max_supply: f32,
    #[serde(default)]
    pub ramp_position: f32,
    #[serde(default = "default_ramp_rate")]
    pub ramp_rate: f32,
    #[serde(default = "default_ramp_tolerance")]
    pub ramp_tolerance: f32,
    #[serde(default = "default_one")]
    pub efficiency: f32,
    #[serde(default = "default_true")]
    pub can_charge: bool,
    #[serde(default = "default_true")]
    pub can_discharge: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_from_ron() {
        let ron = r#"
            (
                sim: (ticks_per_second: 20, solver: graph_walk),
                networks: [(name: "grid"), (name: "backup")],
                supplies: [(name: "turbine", network: "grid", max_supply: 500.0)],
                loads: [(name: "lathe", network: "backup", desired_power: 40.0)],
                batteries: [
                    (
                        name: "smes",
                        charging: Some("grid"),
                        discharging: Some("backup"),
                        capacity: 1000.0,
                        efficiency: 0.9,
                    ),
                ],
            )
        "#;
        let data: ScenarioData = ron::from_str(ron).unwrap();
        assert_eq!(data.sim.ticks_per_second, 20);
        assert_eq!(data.sim.solver, SolverKind::GraphWalk);
        assert_eq!(data.networks.len(), 2);
        assert_eq!(data.supplies[0].ramp_rate, DEFAULT_RAMP_RATE);
        assert!(data.supplies[0].enabled);
        assert_eq!(data.batteries[0].charging.as_deref(), Some("grid"));
        assert!((data.batteries[0].efficiency - 0.9).abs() < f32::EPSILON);
        assert!(data.batteries[0].can_discharge);
    }

    #[test]
    fn scenario_from_toml() {
        let toml_str = r#"
            [sim]
            solver = "no_op"

            [[networks]]
            name = "grid"

            [[loads]]
            name = "lights"
            network = "grid"
            desired_power = 15.0
            enabled = false
        "#;
        let data: ScenarioData = toml::from_str(toml_str).unwrap();
        assert_eq!(data.sim.solver, SolverKind::NoOp);
        assert_eq!(data.sim.ticks_per_second, DEFAULT_TICKS_PER_SECOND);
        assert_eq!(data.loads.len(), 1);
        assert!(!data.loads[0].enabled);
        assert!(data.batteries.is_empty());
    }

    #[test]
    fn scenario_from_json_with_defaults() {
        let json = r#"{
            "networks": [{"name": "grid"}],
            "batteries": [{"name": "cell", "capacity": 10.0}]
        }"#;
        let data: ScenarioData = serde_json::from_str(json).unwrap();
        assert_eq!(data.sim.solver, SolverKind::BatteryRampPeg);
        let battery = &data.batteries[0];
        assert_eq!(battery.efficiency, 1.0);
        assert_eq!(battery.charging, None);
        assert_eq!(battery.ramp_tolerance, DEFAULT_RAMP_TOLERANCE);
    }

    #[test]
    fn missing_required_field_fails() {
        let json = r#"{ "supplies": [{"name": "gen", "network": "grid"}] }"#;
        assert!(serde_json::from_str::<ScenarioData>(json).is_err());
    }
}

//! Resolve a [`ScenarioData`] file into a linked [`PowerState`].
//!
//! Networks are created first so every entity can look its network up by
//! name. Entity names are unique per kind; the maps in [`ScenarioNames`]
//! let callers find the generated ids afterwards.

use crate::loader::{
    DataLoadError, check_duplicate, deserialize_file, require_data_file, resolve_name,
};
use crate::schema::{BatteryData, LoadData, ScenarioData, SimData, SupplyData};
use pow3r_core::id::{BatteryId, LoadId, NetworkId, SupplyId};
use pow3r_core::state::{Battery, Load, PowerState, Supply};
use pow3r_solver::PowerSimulation;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Name-to-id lookups for everything a scenario declared.
#[derive(Debug, Clone, Default)]
pub struct ScenarioNames {
    pub networks: HashMap<String, NetworkId>,
    pub supplies: HashMap<String, SupplyId>,
    pub loads: HashMap<String, LoadId>,
    pub batteries: HashMap<String, BatteryId>,
}

/// A loaded scenario, ready to simulate.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub state: PowerState,
    pub names: ScenarioNames,
    pub sim: SimData,
}

impl Scenario {
    /// Build a simulation from the scenario's graph and settings.
    pub fn into_simulation(self) -> PowerSimulation {
        PowerSimulation::new(self.state, self.sim.solver.build())
            .with_tick_rate(self.sim.ticks_per_second)
    }

    pub fn network(&self, name: &str) -> Option<NetworkId> {
        self.names.networks.get(name).copied()
    }

    pub fn supply(&self, name: &str) -> Option<SupplyId> {
        self.names.supplies.get(name).copied()
    }

    pub fn load(&self, name: &str) -> Option<LoadId> {
        self.names.loads.get(name).copied()
    }

    pub fn battery(&self, name: &str) -> Option<BatteryId> {
        self.names.batteries.get(name).copied()
    }
}

/// Load a scenario from a single RON, TOML or JSON file.
pub fn load_scenario(path: &Path) -> Result<Scenario, DataLoadError> {
    let data: ScenarioData = deserialize_file(path)?;
    let scenario = build_scenario(data, path)?;
    debug!(
        file = %path.display(),
        networks = scenario.state.networks.len(),
        entities = scenario.state.len(),
        "scenario loaded"
    );
    Ok(scenario)
}

/// Load `scenario.{ron,toml,json}` from a directory.
pub fn load_scenario_from_dir(dir: &Path) -> Result<Scenario, DataLoadError> {
    let path = require_data_file(dir, "scenario")?;
    load_scenario(&path)
}

/// Resolve names and build the graph. `file` is only used in error messages.
pub fn build_scenario(data: ScenarioData, file: &Path) -> Result<Scenario, DataLoadError> {
    let mut state = PowerState::new();
    let mut names = ScenarioNames::default();

    for net in &data.networks {
        check_duplicate(&names.networks, &net.name, file)?;
        let id = state.add_network();
        names.networks.insert(net.name.clone(), id);
    }

    for entry in &data.supplies {
        check_duplicate(&names.supplies, &entry.name, file)?;
        let network = *resolve_name(&names.networks, &entry.network, file, "network")?;
        let id = state.add_supply(supply_from(entry));
        state.link_supply(id, network);
        names.supplies.insert(entry.name.clone(), id);
    }

    for entry in &data.loads {
        check_duplicate(&names.loads, &entry.name, file)?;
        let network = *resolve_name(&names.networks, &entry.network, file, "network")?;
        let id = state.add_load(load_from(entry));
        state.link_load(id, network);
        names.loads.insert(entry.name.clone(), id);
    }

    for entry in &data.batteries {
        check_duplicate(&names.batteries, &entry.name, file)?;
        let charging = entry
            .charging
            .as_deref()
            .map(|name| resolve_name(&names.networks, name, file, "network").copied())
            .transpose()?;
        let discharging = entry
            .discharging
            .as_deref()
            .map(|name| resolve_name(&names.networks, name, file, "network").copied())
            .transpose()?;

        let id = state.add_battery(battery_from(entry));
        if let Some(network) = charging {
            state.link_battery_charging(id, network);
        }
        if let Some(network) = discharging {
            state.link_battery_discharging(id, network);
        }
        names.batteries.insert(entry.name.clone(), id);
    }

    Ok(Scenario {
        state,
        names,
        sim: data.sim,
    })
}

fn supply_from(data: &SupplyData) -> Supply {
    Supply {
        enabled: data.enabled,
        supply_ramp_rate: data.ramp_rate,
        supply_ramp_tolerance: data.ramp_tolerance,
        ..Supply::new(data.max_supply).with_ramp_position(data.ramp_position)
    }
}

fn load_from(data: &LoadData) -> Load {
    Load {
        enabled: data.enabled,
        ..Load::new(data.desired_power)
    }
}

fn battery_from(data: &BatteryData) -> Battery {
    let capacity = data.capacity.max(0.0);
    Battery {
        enabled: data.enabled,
        can_charge: data.can_charge,
        can_discharge: data.can_discharge,
        current_storage: data.storage.clamp(0.0, capacity),
        max_charge_rate: data.max_charge_rate,
        max_supply: data.max_supply,
        supply_ramp_position: data.ramp_position,
        supply_ramp_rate: data.ramp_rate,
        supply_ramp_tolerance: data.ramp_tolerance,
        efficiency: data.efficiency,
        ..Battery::new(capacity)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

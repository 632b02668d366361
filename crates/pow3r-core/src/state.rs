//! The power graph: supplies, loads, batteries and the networks joining them.
//!
//! Every collection is a generational [`SlotMap`], so ids are small, `Copy`,
//! and go stale when their slot is freed. Networks reference members by id
//! and members reference their network by id; nothing owns anything else.
//!
//! Fields fall in three groups:
//!
//! - **Static parameters** are written by the graph builder (`enabled`,
//!   `max_supply`, `desired_power`, ...).
//! - **Runtime outputs** are written by a solver each tick and read by
//!   whoever renders them (`current_supply`, `receiving_power`, ...).
//! - **Persistent state** survives between ticks and snapshots
//!   (`supply_ramp_position`, `current_storage`).
//!
//! Per-tick scratch values that only matter inside a solver pass are marked
//! `#[serde(skip)]`.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::{BatteryId, LoadId, NetworkId, SupplyId};

/// Default ramp rate for supplies and batteries, in watts per second.
pub const DEFAULT_RAMP_RATE: f32 = 5000.0;

/// Default ramp tolerance for supplies and batteries, in watts.
pub const DEFAULT_RAMP_TOLERANCE: f32 = 5000.0;

// ---------------------------------------------------------------------------
// Supply
// ---------------------------------------------------------------------------

/// A power source feeding one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    pub enabled: bool,
    /// Paused entities are frozen: the solver neither reads nor resets them.
    pub paused: bool,
    /// Nameplate output in watts.
    pub max_supply: f32,
    /// How fast the ramp position may move, in watts per second.
    pub supply_ramp_rate: f32,
    /// Output available instantly on top of the ramp position, in watts.
    pub supply_ramp_tolerance: f32,

    /// Power actually supplied during the last tick.
    pub current_supply: f32,
    /// Where the ramp position is heading. Recomputed every tick.
    #[serde(skip)]
    pub supply_ramp_target: f32,
    /// Current ramp position. Kept in `[0, max_supply]`.
    pub supply_ramp_position: f32,
    /// Ramp-limited output available during the current tick.
    #[serde(skip)]
    pub effective_max_supply: f32,

    pub linked_network: Option<NetworkId>,
}

impl Supply {
    /// A fresh, enabled supply with the given nameplate output.
    pub fn new(max_supply: f32) -> Self {
        Self {
            max_supply,
            ..Self::default()
        }
    }

    /// Builder-style helper for the starting ramp position.
    pub fn with_ramp_position(mut self, position: f32) -> Self {
        self.supply_ramp_position = position;
        self
    }
}

impl Default for Supply {
    fn default() -> Self {
        Self {
            enabled: true,
            paused: false,
            max_supply: 0.0,
            supply_ramp_rate: DEFAULT_RAMP_RATE,
            supply_ramp_tolerance: DEFAULT_RAMP_TOLERANCE,
            current_supply: 0.0,
            supply_ramp_target: 0.0,
            supply_ramp_position: 0.0,
            effective_max_supply: 0.0,
            linked_network: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// A power consumer drawing from one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub enabled: bool,
    pub paused: bool,
    /// Power requested this tick, in watts.
    pub desired_power: f32,
    /// Power granted during the last tick. Never exceeds `desired_power`.
    pub receiving_power: f32,
    pub linked_network: Option<NetworkId>,
}

impl Load {
    pub fn new(desired_power: f32) -> Self {
        Self {
            desired_power,
            ..Self::default()
        }
    }
}

impl Default for Load {
    fn default() -> Self {
        Self {
            enabled: true,
            paused: false,
            desired_power: 0.0,
            receiving_power: 0.0,
            linked_network: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// Energy storage that charges from one network and discharges into another.
///
/// The charging port acts as a load on `linked_network_charging`, the
/// discharging port as a supply on `linked_network_discharging`. Either
/// port may be left unconnected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Battery {
    pub enabled: bool,
    pub paused: bool,
    pub can_charge: bool,
    pub can_discharge: bool,
    /// Storage capacity in joules.
    pub capacity: f32,
    /// Baseline charge rate in watts, before any pass-through demand.
    pub max_charge_rate: f32,
    /// Discharge ceiling in watts.
    pub max_supply: f32,
    pub supply_ramp_rate: f32,
    pub supply_ramp_tolerance: f32,
    /// Fraction of received power that ends up stored, in `(0, 1]`.
    pub efficiency: f32,

    /// Stored energy in joules. Kept in `[0, capacity]`.
    pub current_storage: f32,
    /// Power drawn from the charging network during the last tick.
    pub current_receiving: f32,
    /// Power delivered to the discharging network during the last tick.
    pub current_supply: f32,
    pub supply_ramp_position: f32,
    #[serde(skip)]
    pub supply_ramp_target: f32,

    /// Unmet demand of the discharging network, recorded when that network
    /// is solved and consumed when the charging network is solved.
    pub loading_network_demand: f32,
    /// Charge demand placed on the charging network this tick.
    #[serde(skip)]
    pub desired_power: f32,
    /// Discharge offer to the discharging network this tick, already
    /// clamped to that network's unmet demand.
    #[serde(skip)]
    pub max_effective_supply: f32,

    #[serde(skip)]
    pub supplying_marked: bool,
    #[serde(skip)]
    pub loading_marked: bool,
    #[serde(skip)]
    pub loading_demand_marked: bool,

    pub linked_network_charging: Option<NetworkId>,
    pub linked_network_discharging: Option<NetworkId>,
}

impl Battery {
    /// A fresh, empty battery with the given capacity and no rate limits set.
    pub fn new(capacity: f32) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Fraction of capacity currently stored, in `[0, 1]`. Zero-capacity
    /// batteries report zero.
    pub fn charge_fraction(&self) -> f32 {
        if self.capacity > 0.0 {
            (self.current_storage / self.capacity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self {
            enabled: true,
            paused: false,
            can_charge: true,
            can_discharge: true,
            capacity: 0.0,
            max_charge_rate: 0.0,
            max_supply: 0.0,
            supply_ramp_rate: DEFAULT_RAMP_RATE,
            supply_ramp_tolerance: DEFAULT_RAMP_TOLERANCE,
            efficiency: 1.0,
            current_storage: 0.0,
            current_receiving: 0.0,
            current_supply: 0.0,
            supply_ramp_position: 0.0,
            supply_ramp_target: 0.0,
            loading_network_demand: 0.0,
            desired_power: 0.0,
            max_effective_supply: 0.0,
            supplying_marked: false,
            loading_marked: false,
            loading_demand_marked: false,
            linked_network_charging: None,
            linked_network_discharging: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// A transmission group. Membership is maintained by the graph builder via
/// the `link_*` methods on [`PowerState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub supplies: Vec<SupplyId>,
    pub loads: Vec<LoadId>,
    /// Batteries charging from this network (their input port is here).
    pub battery_loads: Vec<BatteryId>,
    /// Batteries discharging into this network (their output port is here).
    pub battery_supplies: Vec<BatteryId>,

    /// Total demand during the last tick, battery charging included.
    pub last_combined_load: f32,
    /// Available supply during the last tick, battery discharge included.
    pub last_combined_supply: f32,
    /// Nameplate supply plus battery discharge offers during the last tick.
    pub last_combined_max_supply: f32,
}

impl Network {
    /// True when no entity of any role is attached.
    pub fn is_empty(&self) -> bool {
        self.supplies.is_empty()
            && self.loads.is_empty()
            && self.battery_loads.is_empty()
            && self.battery_supplies.is_empty()
    }
}

fn push_unique<K: PartialEq>(list: &mut Vec<K>, key: K) {
    if !list.contains(&key) {
        list.push(key);
    }
}

// ---------------------------------------------------------------------------
// PowerState
// ---------------------------------------------------------------------------

/// The complete power graph handed to a solver each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerState {
    pub supplies: SlotMap<SupplyId, Supply>,
    pub loads: SlotMap<LoadId, Load>,
    pub batteries: SlotMap<BatteryId, Battery>,
    pub networks: SlotMap<NetworkId, Network>,
}

impl PowerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_network(&mut self) -> NetworkId {
        self.networks.insert(Network::default())
    }

    /// Insert a supply. Its `linked_network` is ignored; use
    /// [`link_supply`](Self::link_supply) to attach it.
    pub fn add_supply(&mut self, mut supply: Supply) -> SupplyId {
        supply.linked_network = None;
        self.supplies.insert(supply)
    }

    pub fn add_load(&mut self, mut load: Load) -> LoadId {
        load.linked_network = None;
        self.loads.insert(load)
    }

    pub fn add_battery(&mut self, mut battery: Battery) -> BatteryId {
        battery.linked_network_charging = None;
        battery.linked_network_discharging = None;
        self.batteries.insert(battery)
    }

    /// Attach a supply to a network, detaching it from any previous one.
    /// Returns `false` if either id is stale.
    pub fn link_supply(&mut self, supply: SupplyId, network: NetworkId) -> bool {
        if !self.networks.contains_key(network) {
            return false;
        }
        let Some(entity) = self.supplies.get_mut(supply) else {
            return false;
        };
        let old = entity.linked_network.replace(network);
        if let Some(net) = old.and_then(|n| self.networks.get_mut(n)) {
            net.supplies.retain(|s| *s != supply);
        }
        push_unique(&mut self.networks[network].supplies, supply);
        true
    }

    pub fn link_load(&mut self, load: LoadId, network: NetworkId) -> bool {
        if !self.networks.contains_key(network) {
            return false;
        }
        let Some(entity) = self.loads.get_mut(load) else {
            return false;
        };
        let old = entity.linked_network.replace(network);
        if let Some(net) = old.and_then(|n| self.networks.get_mut(n)) {
            net.loads.retain(|l| *l != load);
        }
        push_unique(&mut self.networks[network].loads, load);
        true
    }

    /// Connect a battery's input port: it will charge from `network`.
    pub fn link_battery_charging(&mut self, battery: BatteryId, network: NetworkId) -> bool {
        if !self.networks.contains_key(network) {
            return false;
        }
        let Some(entity) = self.batteries.get_mut(battery) else {
            return false;
        };
        let old = entity.linked_network_charging.replace(network);
        if let Some(net) = old.and_then(|n| self.networks.get_mut(n)) {
            net.battery_loads.retain(|b| *b != battery);
        }
        push_unique(&mut self.networks[network].battery_loads, battery);
        true
    }

    /// Connect a battery's output port: it will discharge into `network`.
    pub fn link_battery_discharging(&mut self, battery: BatteryId, network: NetworkId) -> bool {
        if !self.networks.contains_key(network) {
            return false;
        }
        let Some(entity) = self.batteries.get_mut(battery) else {
            return false;
        };
        let old = entity.linked_network_discharging.replace(network);
        if let Some(net) = old.and_then(|n| self.networks.get_mut(n)) {
            net.battery_supplies.retain(|b| *b != battery);
        }
        push_unique(&mut self.networks[network].battery_supplies, battery);
        true
    }

    /// Remove a supply and detach it from its network.
    pub fn remove_supply(&mut self, supply: SupplyId) -> Option<Supply> {
        let removed = self.supplies.remove(supply)?;
        if let Some(net) = removed.linked_network.and_then(|n| self.networks.get_mut(n)) {
            net.supplies.retain(|s| *s != supply);
        }
        Some(removed)
    }

    pub fn remove_load(&mut self, load: LoadId) -> Option<Load> {
        let removed = self.loads.remove(load)?;
        if let Some(net) = removed.linked_network.and_then(|n| self.networks.get_mut(n)) {
            net.loads.retain(|l| *l != load);
        }
        Some(removed)
    }

    pub fn remove_battery(&mut self, battery: BatteryId) -> Option<Battery> {
        let removed = self.batteries.remove(battery)?;
        if let Some(net) = removed
            .linked_network_charging
            .and_then(|n| self.networks.get_mut(n))
        {
            net.battery_loads.retain(|b| *b != battery);
        }
        if let Some(net) = removed
            .linked_network_discharging
            .and_then(|n| self.networks.get_mut(n))
        {
            net.battery_supplies.retain(|b| *b != battery);
        }
        Some(removed)
    }

    /// Remove a network. Its former members stay in the graph, unlinked.
    pub fn remove_network(&mut self, network: NetworkId) -> Option<Network> {
        let removed = self.networks.remove(network)?;
        for id in &removed.supplies {
            if let Some(s) = self.supplies.get_mut(*id) {
                s.linked_network = None;
            }
        }
        for id in &removed.loads {
            if let Some(l) = self.loads.get_mut(*id) {
                l.linked_network = None;
            }
        }
        for id in &removed.battery_loads {
            if let Some(b) = self.batteries.get_mut(*id) {
                b.linked_network_charging = None;
            }
        }
        for id in &removed.battery_supplies {
            if let Some(b) = self.batteries.get_mut(*id) {
                b.linked_network_discharging = None;
            }
        }
        Some(removed)
    }

    /// Total entity count across all four collections.
    pub fn len(&self) -> usize {
        self.supplies.len() + self.loads.len() + self.batteries.len() + self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let supply = Supply::default();
        assert!(supply.enabled);
        assert_eq!(supply.supply_ramp_rate, DEFAULT_RAMP_RATE);
        assert_eq!(supply.supply_ramp_tolerance, DEFAULT_RAMP_TOLERANCE);

        let battery = Battery::default();
        assert!(battery.can_charge);
        assert!(battery.can_discharge);
        assert_eq!(battery.efficiency, 1.0);
    }

    #[test]
    fn link_supply_registers_membership() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(Supply::new(100.0));

        assert!(state.link_supply(supply, net));
        assert_eq!(state.supplies[supply].linked_network, Some(net));
        assert_eq!(state.networks[net].supplies, vec![supply]);
    }

    #[test]
    fn relinking_moves_between_networks() {
        let mut state = PowerState::new();
        let a = state.add_network();
        let b = state.add_network();
        let load = state.add_load(Load::new(10.0));

        state.link_load(load, a);
        state.link_load(load, b);

        assert!(state.networks[a].loads.is_empty());
        assert_eq!(state.networks[b].loads, vec![load]);
        assert_eq!(state.loads[load].linked_network, Some(b));
    }

    #[test]
    fn linking_twice_does_not_duplicate() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let battery = state.add_battery(Battery::new(100.0));

        state.link_battery_charging(battery, net);
        state.link_battery_charging(battery, net);

        assert_eq!(state.networks[net].battery_loads.len(), 1);
    }

    #[test]
    fn battery_ports_are_independent() {
        let mut state = PowerState::new();
        let upstream = state.add_network();
        let downstream = state.add_network();
        let battery = state.add_battery(Battery::new(100.0));

        state.link_battery_charging(battery, upstream);
        state.link_battery_discharging(battery, downstream);

        assert_eq!(state.networks[upstream].battery_loads, vec![battery]);
        assert_eq!(state.networks[downstream].battery_supplies, vec![battery]);
        assert!(state.networks[upstream].battery_supplies.is_empty());
    }

    #[test]
    fn link_to_stale_network_fails() {
        let mut state = PowerState::new();
        let net = state.add_network();
        state.remove_network(net);
        let supply = state.add_supply(Supply::new(1.0));

        assert!(!state.link_supply(supply, net));
        assert_eq!(state.supplies[supply].linked_network, None);
    }

    #[test]
    fn remove_battery_unlinks_both_ports() {
        let mut state = PowerState::new();
        let a = state.add_network();
        let b = state.add_network();
        let battery = state.add_battery(Battery::new(100.0));
        state.link_battery_charging(battery, a);
        state.link_battery_discharging(battery, b);

        let removed = state.remove_battery(battery).unwrap();

        assert_eq!(removed.capacity, 100.0);
        assert!(state.networks[a].is_empty());
        assert!(state.networks[b].is_empty());
    }

    #[test]
    fn remove_network_clears_member_links() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(Supply::new(5.0));
        let battery = state.add_battery(Battery::new(5.0));
        state.link_supply(supply, net);
        state.link_battery_discharging(battery, net);

        state.remove_network(net);

        assert_eq!(state.supplies[supply].linked_network, None);
        assert_eq!(state.batteries[battery].linked_network_discharging, None);
    }

    #[test]
    fn add_ignores_preset_links() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let mut load = Load::new(1.0);
        load.linked_network = Some(net);

        let id = state.add_load(load);

        assert_eq!(state.loads[id].linked_network, None);
        assert!(state.networks[net].loads.is_empty());
    }

    #[test]
    fn charge_fraction_handles_zero_capacity() {
        let mut battery = Battery::new(0.0);
        assert_eq!(battery.charge_fraction(), 0.0);
        battery.capacity = 200.0;
        battery.current_storage = 50.0;
        assert_eq!(battery.charge_fraction(), 0.25);
    }
}

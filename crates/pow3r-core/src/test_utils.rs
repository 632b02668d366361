//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::*;
use crate::state::*;

// ===========================================================================
// Entity constructors
// ===========================================================================

/// A supply whose ramp position already sits at its nameplate output.
pub fn ramped_supply(max_supply: f32) -> Supply {
    Supply::new(max_supply).with_ramp_position(max_supply)
}

/// A supply starting from a standstill with explicit ramp parameters.
pub fn cold_supply(max_supply: f32, ramp_rate: f32, ramp_tolerance: f32) -> Supply {
    Supply {
        supply_ramp_rate: ramp_rate,
        supply_ramp_tolerance: ramp_tolerance,
        ..Supply::new(max_supply)
    }
}

/// An empty, lossless battery.
pub fn battery(capacity: f32, max_charge_rate: f32, max_supply: f32) -> Battery {
    Battery {
        max_charge_rate,
        max_supply,
        ..Battery::new(capacity)
    }
}

// ===========================================================================
// Graph builders
// ===========================================================================

/// One network with one supply and one load.
pub struct SingleNetwork {
    pub state: PowerState,
    pub network: NetworkId,
    pub supply: SupplyId,
    pub load: LoadId,
}

pub fn single_network(supply: Supply, desired_power: f32) -> SingleNetwork {
    let mut state = PowerState::new();
    let network = state.add_network();
    let supply = state.add_supply(supply);
    let load = state.add_load(Load::new(desired_power));
    state.link_supply(supply, network);
    state.link_load(load, network);
    SingleNetwork {
        state,
        network,
        supply,
        load,
    }
}

/// Two networks joined by a battery: `upstream` holds the supply and the
/// battery's charging port, `downstream` holds the discharging port and the
/// load.
pub struct Bridge {
    pub state: PowerState,
    pub upstream: NetworkId,
    pub downstream: NetworkId,
    pub supply: SupplyId,
    pub battery: BatteryId,
    pub load: LoadId,
}

pub fn bridged_networks(supply: Supply, battery: Battery, desired_power: f32) -> Bridge {
    let mut state = PowerState::new();
    let upstream = state.add_network();
    let downstream = state.add_network();
    let supply = state.add_supply(supply);
    let battery = state.add_battery(battery);
    let load = state.add_load(Load::new(desired_power));
    state.link_supply(supply, upstream);
    state.link_battery_charging(battery, upstream);
    state.link_battery_discharging(battery, downstream);
    state.link_load(load, downstream);
    Bridge {
        state,
        upstream,
        downstream,
        supply,
        battery,
        load,
    }
}

/// A `width`-wide, `layers`-deep grid of networks. Layer 0 networks hold a
/// ramped supply each; every network in layer `i > 0` is fed by a battery
/// charging from the network in the same column of layer `i - 1`. Every
/// network carries one load. The battery topology is acyclic.
pub fn layered_grid(layers: usize, width: usize) -> PowerState {
    let mut state = PowerState::new();
    let mut previous: Vec<NetworkId> = Vec::with_capacity(width);

    for layer in 0..layers {
        let mut current = Vec::with_capacity(width);
        for column in 0..width {
            let net = state.add_network();
            if layer == 0 {
                let s = state.add_supply(ramped_supply(10_000.0));
                state.link_supply(s, net);
            } else {
                let mut b = battery(50_000.0, 500.0, 2_000.0);
                b.current_storage = 25_000.0;
                b.supply_ramp_position = 1_000.0;
                let b = state.add_battery(b);
                state.link_battery_charging(b, previous[column]);
                state.link_battery_discharging(b, net);
            }
            let l = state.add_load(Load::new(100.0 + (column % 7) as f32 * 25.0));
            state.link_load(l, net);
            current.push(net);
        }
        previous = current;
    }

    state
}

/// `n` networks in a ring: network `i` charges a battery that discharges
/// into network `(i + 1) % n`. Each network also has a supply and a load.
pub fn battery_ring(n: usize) -> PowerState {
    let mut state = PowerState::new();
    let nets: Vec<NetworkId> = (0..n).map(|_| state.add_network()).collect();

    for (i, &net) in nets.iter().enumerate() {
        let s = state.add_supply(ramped_supply(200.0));
        state.link_supply(s, net);
        let l = state.add_load(Load::new(150.0));
        state.link_load(l, net);

        let mut b = battery(1_000.0, 50.0, 100.0);
        b.current_storage = 500.0;
        let b = state.add_battery(b);
        state.link_battery_charging(b, net);
        state.link_battery_discharging(b, nets[(i + 1) % n]);
    }

    state
}

//! Invariant and consistency checks over a [`PowerState`].
//!
//! Solvers assume a well-formed graph and only `debug_assert!` on it. These
//! checks are the reportable counterpart: tooling and tests call them to get
//! a list of problems instead of a panic.

use crate::id::{BatteryId, LoadId, NetworkId, SupplyId};
use crate::state::PowerState;

/// Slack allowed on float comparisons.
pub const TOLERANCE: f32 = 1e-3;

// ---------------------------------------------------------------------------
// Value invariants
// ---------------------------------------------------------------------------

/// A numeric invariant broken after a solver pass.
#[derive(Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    NegativeSupply { supply: SupplyId, value: f32 },
    SupplyRampOutOfRange { supply: SupplyId, position: f32, max: f32 },
    NegativeReceiving { load: LoadId, value: f32 },
    /// A load was granted more than it asked for.
    OverDelivered { load: LoadId, receiving: f32, desired: f32 },
    StorageOutOfRange { battery: BatteryId, storage: f32, capacity: f32 },
    NegativeBatteryFlow { battery: BatteryId, supply: f32, receiving: f32 },
    BatteryRampOutOfRange { battery: BatteryId, position: f32, max: f32 },
    NonFinite { what: &'static str },
}

fn out_of_range(value: f32, max: f32) -> bool {
    value < -TOLERANCE || value > max + max.abs() * TOLERANCE + TOLERANCE
}

/// Check every value invariant. Paused entities are included: their values
/// are frozen, so a violation there predates the tick.
pub fn check_invariants(state: &PowerState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for (id, supply) in &state.supplies {
        if !supply.current_supply.is_finite() || !supply.supply_ramp_position.is_finite() {
            violations.push(InvariantViolation::NonFinite { what: "supply" });
            continue;
        }
        if supply.current_supply < -TOLERANCE {
            violations.push(InvariantViolation::NegativeSupply {
                supply: id,
                value: supply.current_supply,
            });
        }
        if out_of_range(supply.supply_ramp_position, supply.max_supply) {
            violations.push(InvariantViolation::SupplyRampOutOfRange {
                supply: id,
                position: supply.supply_ramp_position,
                max: supply.max_supply,
            });
        }
    }

    for (id, load) in &state.loads {
        if !load.receiving_power.is_finite() {
            violations.push(InvariantViolation::NonFinite { what: "load" });
            continue;
        }
        if load.receiving_power < -TOLERANCE {
            violations.push(InvariantViolation::NegativeReceiving {
                load: id,
                value: load.receiving_power,
            });
        }
        let slack = load.desired_power.abs() * TOLERANCE + TOLERANCE;
        if load.receiving_power > load.desired_power + slack {
            violations.push(InvariantViolation::OverDelivered {
                load: id,
                receiving: load.receiving_power,
                desired: load.desired_power,
            });
        }
    }

    for (id, battery) in &state.batteries {
        if !battery.current_storage.is_finite()
            || !battery.current_supply.is_finite()
            || !battery.current_receiving.is_finite()
        {
            violations.push(InvariantViolation::NonFinite { what: "battery" });
            continue;
        }
        if out_of_range(battery.current_storage, battery.capacity) {
            violations.push(InvariantViolation::StorageOutOfRange {
                battery: id,
                storage: battery.current_storage,
                capacity: battery.capacity,
            });
        }
        if battery.current_supply < -TOLERANCE || battery.current_receiving < -TOLERANCE {
            violations.push(InvariantViolation::NegativeBatteryFlow {
                battery: id,
                supply: battery.current_supply,
                receiving: battery.current_receiving,
            });
        }
        if out_of_range(battery.supply_ramp_position, battery.max_supply) {
            violations.push(InvariantViolation::BatteryRampOutOfRange {
                battery: id,
                position: battery.supply_ramp_position,
                max: battery.max_supply,
            });
        }
    }

    violations
}

/// Panic with the full violation list if any invariant is broken.
/// Compiled out of release builds.
#[inline]
pub fn debug_assert_invariants(state: &PowerState) {
    if cfg!(debug_assertions) {
        let violations = check_invariants(state);
        assert!(
            violations.is_empty(),
            "power state invariants violated: {violations:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Graph consistency
// ---------------------------------------------------------------------------

/// A structural problem in the graph: a network listing a member that does
/// not exist, or a member whose link disagrees with the network list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIssue {
    DanglingSupply { network: NetworkId, supply: SupplyId },
    DanglingLoad { network: NetworkId, load: LoadId },
    DanglingBattery { network: NetworkId, battery: BatteryId },
    SupplyLinkMismatch { network: NetworkId, supply: SupplyId },
    LoadLinkMismatch { network: NetworkId, load: LoadId },
    ChargingLinkMismatch { network: NetworkId, battery: BatteryId },
    DischargingLinkMismatch { network: NetworkId, battery: BatteryId },
}

/// Check that every id a network lists exists and links back to it.
pub fn check_graph(state: &PowerState) -> Vec<GraphIssue> {
    let mut issues = Vec::new();

    for (network, net) in &state.networks {
        for &supply in &net.supplies {
            match state.supplies.get(supply) {
                None => issues.push(GraphIssue::DanglingSupply { network, supply }),
                Some(s) if s.linked_network != Some(network) => {
                    issues.push(GraphIssue::SupplyLinkMismatch { network, supply })
                }
                Some(_) => {}
            }
        }
        for &load in &net.loads {
            match state.loads.get(load) {
                None => issues.push(GraphIssue::DanglingLoad { network, load }),
                Some(l) if l.linked_network != Some(network) => {
                    issues.push(GraphIssue::LoadLinkMismatch { network, load })
                }
                Some(_) => {}
            }
        }
        for &battery in &net.battery_loads {
            match state.batteries.get(battery) {
                None => issues.push(GraphIssue::DanglingBattery { network, battery }),
                Some(b) if b.linked_network_charging != Some(network) => {
                    issues.push(GraphIssue::ChargingLinkMismatch { network, battery })
                }
                Some(_) => {}
            }
        }
        for &battery in &net.battery_supplies {
            match state.batteries.get(battery) {
                None => issues.push(GraphIssue::DanglingBattery { network, battery }),
                Some(b) if b.linked_network_discharging != Some(network) => {
                    issues.push(GraphIssue::DischargingLinkMismatch { network, battery })
                }
                Some(_) => {}
            }
        }
    }

    issues
}

// ===========================================================================
// Tests
// ===========================================================================

//! The battery-ramp-peg power solver.
//!
//! A single-pass, non-iterative approximation of network flow. Each tick:
//!
//! 1. **Reset** -- Clear runtime outputs of every non-paused entity.
//! 2. **Order** -- Estimate network heights and sort ascending, so a
//!    network is solved after every network its batteries discharge into.
//! 3. **Solve** -- For each network, build a [`NetworkPlan`] from the
//!    current state (demand, ramp-limited supply, battery offers) and apply
//!    it. A discharging battery records the unmet demand it saw; when its
//!    charging network is solved later in the same tick, that demand is
//!    added to the battery's charge request. This pegs upstream supplies
//!    to downstream load through the battery.
//! 4. **Bookkeeping** -- Zero battery outputs that no network touched.
//! 5. **Ramp** -- Advance ramp positions toward this tick's targets.
//!
//! Planning only reads the state, so with the `parallel` feature every
//! network of one height level is planned concurrently and the plans are
//! applied in order afterwards.

use pow3r_core::id::{BatteryId, LoadId, NetworkId, SupplyId};
use pow3r_core::state::{Battery, PowerState};
use pow3r_core::validation::debug_assert_invariants;
use tracing::trace_span;

use crate::height::prepare_tick;
use crate::ramp::update_ramp_positions;
use crate::solver::PowerSolver;

// ---------------------------------------------------------------------------
// Network plan
// ---------------------------------------------------------------------------

/// The outcome of solving one network, computed without touching the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkPlan {
    pub network: NetworkId,
    /// Load demand plus battery charge demand.
    pub demand: f32,
    /// Ramp-limited supply plus clamped battery offers.
    pub available: f32,
    /// Nameplate sum of plain supplies. Batteries are excluded.
    pub max_supply_sum: f32,
    /// Sum of clamped battery offers.
    pub battery_offer_sum: f32,
    /// Demand left after plain supplies, before batteries.
    pub unmet: f32,
    /// `min(demand, available)`.
    pub met: f32,

    /// `(load, desired_power)`
    loads: Vec<(LoadId, f32)>,
    /// `(battery, charge demand)`
    charging: Vec<(BatteryId, f32)>,
    /// `(supply, effective max supply, nameplate)`
    supplies: Vec<(SupplyId, f32, f32)>,
    /// `(battery, clamped offer)`
    discharging: Vec<(BatteryId, f32)>,
}

/// Power a charging battery asks for: its base rate plus the downstream
/// deficit it carries, limited by the room left in storage.
fn charge_demand(battery: &Battery, delta_time: f32) -> f32 {
    if battery.efficiency <= 0.0 || delta_time <= 0.0 {
        return 0.0;
    }
    let wanted = battery.max_charge_rate + battery.loading_network_demand / battery.efficiency;
    let room = (battery.capacity - battery.current_storage).max(0.0);
    wanted.min(room / battery.efficiency / delta_time).max(0.0)
}

/// Power a discharging battery can offer before clamping to demand.
fn discharge_offer(battery: &Battery, delta_time: f32) -> f32 {
    if delta_time <= 0.0 {
        return 0.0;
    }
    let ramp_cap = battery
        .max_supply
        .min(battery.supply_ramp_position + battery.supply_ramp_tolerance);
    let pass_through = battery.current_receiving * battery.efficiency;
    (battery.current_storage / delta_time)
        .min(ramp_cap + pass_through)
        .max(0.0)
}

/// Plan one network. Reads only; safe to run for many networks at once as
/// long as none of them shares a battery.
pub fn plan_network(state: &PowerState, network: NetworkId, delta_time: f32) -> NetworkPlan {
    let net = &state.networks[network];
    let mut plan = NetworkPlan {
        network,
        ..NetworkPlan::default()
    };

    // Demand.
    for &id in &net.loads {
        let load = &state.loads[id];
        if load.enabled && !load.paused {
            plan.demand += load.desired_power;
            plan.loads.push((id, load.desired_power));
        }
    }
    for &id in &net.battery_loads {
        let battery = &state.batteries[id];
        if battery.enabled && !battery.paused && battery.can_charge {
            let desired = charge_demand(battery, delta_time);
            plan.demand += desired;
            plan.charging.push((id, desired));
        }
    }

    // Plain supply.
    for &id in &net.supplies {
        let supply = &state.supplies[id];
        if supply.enabled && !supply.paused {
            let effective = supply
                .max_supply
                .min(supply.supply_ramp_position + supply.supply_ramp_tolerance);
            plan.available += effective;
            plan.max_supply_sum += supply.max_supply;
            plan.supplies.push((id, effective, supply.max_supply));
        }
    }
    plan.unmet = (plan.demand - plan.available).max(0.0);

    // Batteries only cover what plain supplies cannot.
    for &id in &net.battery_supplies {
        let battery = &state.batteries[id];
        if battery.enabled && !battery.paused && battery.can_discharge {
            let clamped = plan.unmet.min(discharge_offer(battery, delta_time));
            plan.available += clamped;
            plan.battery_offer_sum += clamped;
            plan.discharging.push((id, clamped));
        }
    }

    debug_assert!(plan.demand >= 0.0, "negative demand {}", plan.demand);
    debug_assert!(plan.available >= 0.0, "negative supply {}", plan.available);

    plan.met = plan.demand.min(plan.available);
    plan
}

impl NetworkPlan {
    /// Write the plan's outputs into the state.
    pub fn apply(&self, state: &mut PowerState, delta_time: f32) {
        let met = self.met;
        let distribute = met > 0.0;

        for &(id, desired) in &self.loads {
            if distribute {
                state.loads[id].receiving_power = desired / self.demand * met;
            }
        }

        for &(id, desired) in &self.charging {
            let battery = &mut state.batteries[id];
            battery.desired_power = desired;
            if distribute {
                battery.current_receiving = desired / self.demand * met;
                let stored = battery.current_receiving * battery.efficiency * delta_time;
                battery.current_storage = (battery.current_storage + stored).min(battery.capacity);
                battery.loading_marked = true;
            }
        }

        for &(id, effective, max_supply) in &self.supplies {
            let supply = &mut state.supplies[id];
            supply.effective_max_supply = effective;
            if self.max_supply_sum > 0.0 {
                // Targets track demand even when nothing could be met yet,
                // so a cold supply still starts ramping.
                supply.supply_ramp_target = max_supply / self.max_supply_sum * self.demand;
            }
            if distribute {
                supply.current_supply = effective / self.available * met;
            }
        }

        for &(id, clamped) in &self.discharging {
            let battery = &mut state.batteries[id];
            battery.max_effective_supply = clamped;
            battery.loading_network_demand = self.unmet;
            battery.loading_demand_marked = true;
            if distribute && clamped > 0.0 {
                battery.current_supply = clamped / self.available * met;
                battery.current_storage =
                    (battery.current_storage - delta_time * battery.current_supply).max(0.0);
                battery.supply_ramp_target =
                    battery.current_supply - battery.current_receiving * battery.efficiency;
                battery.supplying_marked = true;
            }
        }

        let net = &mut state.networks[self.network];
        net.last_combined_load = self.demand;
        net.last_combined_supply = self.available;
        net.last_combined_max_supply = self.max_supply_sum + self.battery_offer_sum;
    }
}

// ---------------------------------------------------------------------------
// Tick phases
// ---------------------------------------------------------------------------

fn reset_outputs(state: &mut PowerState) {
    for (_, load) in state.loads.iter_mut().filter(|(_, l)| !l.paused) {
        load.receiving_power = 0.0;
    }
    for (_, supply) in state.supplies.iter_mut().filter(|(_, s)| !s.paused) {
        supply.current_supply = 0.0;
        supply.supply_ramp_target = 0.0;
    }
    for (_, battery) in state.batteries.iter_mut().filter(|(_, b)| !b.paused) {
        battery.desired_power = 0.0;
        battery.max_effective_supply = 0.0;
    }
}

fn settle_batteries(state: &mut PowerState) {
    for (_, battery) in state.batteries.iter_mut().filter(|(_, b)| !b.paused) {
        if !battery.supplying_marked {
            battery.current_supply = 0.0;
            battery.supply_ramp_target = 0.0;
        }
        if !battery.loading_demand_marked {
            battery.loading_network_demand = 0.0;
        }
        if !battery.loading_marked {
            battery.current_receiving = 0.0;
        }
        battery.supplying_marked = false;
        battery.loading_marked = false;
        battery.loading_demand_marked = false;

        debug_assert!(
            battery.current_storage >= 0.0,
            "negative storage {}",
            battery.current_storage
        );
    }
}

fn solve_level_sequential(state: &mut PowerState, level: &[NetworkId], delta_time: f32) {
    for &network in level {
        let plan = plan_network(state, network, delta_time);
        plan.apply(state, delta_time);
    }
}

#[cfg(feature = "parallel")]
fn solve_level_parallel(state: &mut PowerState, level: &[NetworkId], delta_time: f32) {
    use rayon::prelude::*;

    let plans: Vec<NetworkPlan> = {
        let shared: &PowerState = state;
        level
            .par_iter()
            .map(|&network| plan_network(shared, network, delta_time))
            .collect()
    };
    for plan in &plans {
        plan.apply(state, delta_time);
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// The default solver. See the module docs for the tick pipeline.
#[derive(Debug, Clone, Default)]
pub struct BatteryRampPegSolver {
    #[cfg(feature = "parallel")]
    parallel: bool,
}

impl BatteryRampPegSolver {
    /// A solver that processes networks one at a time.
    pub fn new() -> Self {
        Self::default()
    }

    /// A solver that plans each height level's networks concurrently.
    #[cfg(feature = "parallel")]
    pub fn parallel() -> Self {
        Self { parallel: true }
    }

    #[cfg(feature = "parallel")]
    fn solve_level(&self, state: &mut PowerState, level: &[NetworkId], delta_time: f32) {
        if self.parallel {
            solve_level_parallel(state, level, delta_time);
        } else {
            solve_level_sequential(state, level, delta_time);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_level(&self, state: &mut PowerState, level: &[NetworkId], delta_time: f32) {
        solve_level_sequential(state, level, delta_time);
    }
}

impl PowerSolver for BatteryRampPegSolver {
    fn name(&self) -> &'static str {
        "battery_ramp_peg"
    }

    fn tick(&mut self, delta_time: f32, state: &mut PowerState) {
        let _span = trace_span!(
            "pow3r_tick",
            delta_time,
            networks = state.networks.len(),
            supplies = state.supplies.len(),
            loads = state.loads.len(),
            batteries = state.batteries.len(),
        )
        .entered();

        reset_outputs(state);

        let scratch = prepare_tick(state);
        for level in scratch.levels() {
            self.solve_level(state, level, delta_time);
        }

        settle_batteries(state);
        update_ramp_positions(delta_time, state);

        debug_assert_invariants(state);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pow3r_core::state::{Load, Supply};
    use pow3r_core::test_utils::*;

    fn tick(state: &mut PowerState, dt: f32) {
        BatteryRampPegSolver::new().tick(dt, state);
    }

    // -----------------------------------------------------------------------
    // Single network
    // -----------------------------------------------------------------------

    #[test]
    fn ramped_supply_serves_load_exactly() {
        let mut net = single_network(ramped_supply(100.0), 50.0);

        tick(&mut net.state, 1.0);

        assert_relative_eq!(net.state.loads[net.load].receiving_power, 50.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[net.supply].current_supply, 50.0, epsilon = 1e-3);
        let stats = &net.state.networks[net.network];
        assert_relative_eq!(stats.last_combined_load, 50.0, epsilon = 1e-3);
        assert_relative_eq!(stats.last_combined_supply, 100.0, epsilon = 1e-3);
        assert_relative_eq!(stats.last_combined_max_supply, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn cold_supply_ramps_up_before_serving() {
        let mut net = single_network(cold_supply(100.0, 10.0, 0.0), 50.0);

        tick(&mut net.state, 1.0);
        assert_eq!(net.state.loads[net.load].receiving_power, 0.0);
        assert_relative_eq!(net.state.supplies[net.supply].supply_ramp_target, 50.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[net.supply].supply_ramp_position, 10.0, epsilon = 1e-3);

        for _ in 0..4 {
            tick(&mut net.state, 1.0);
        }
        assert_relative_eq!(net.state.supplies[net.supply].supply_ramp_position, 50.0, epsilon = 1e-3);

        tick(&mut net.state, 1.0);
        assert_relative_eq!(net.state.loads[net.load].receiving_power, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn shortage_is_rationed_proportionally() {
        let mut net = single_network(ramped_supply(60.0), 30.0);
        let big = net.state.add_load(Load::new(90.0));
        net.state.link_load(big, net.network);

        tick(&mut net.state, 1.0);

        // 60 available for 120 demanded: everyone gets half.
        assert_relative_eq!(net.state.loads[net.load].receiving_power, 15.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.loads[big].receiving_power, 45.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[net.supply].current_supply, 60.0, epsilon = 1e-3);
    }

    #[test]
    fn supplies_share_by_effective_output() {
        let mut net = single_network(ramped_supply(100.0), 60.0);
        let small = net.state.add_supply(ramped_supply(20.0));
        net.state.link_supply(small, net.network);

        tick(&mut net.state, 1.0);

        assert_relative_eq!(net.state.supplies[net.supply].current_supply, 50.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[small].current_supply, 10.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[net.supply].supply_ramp_target, 50.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[small].supply_ramp_target, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn disabled_and_paused_entities_are_skipped() {
        let mut net = single_network(ramped_supply(100.0), 40.0);
        let off = net.state.add_load(Load {
            enabled: false,
            ..Load::new(1000.0)
        });
        let frozen = net.state.add_load(Load {
            paused: true,
            receiving_power: 7.0,
            ..Load::new(1000.0)
        });
        net.state.link_load(off, net.network);
        net.state.link_load(frozen, net.network);

        tick(&mut net.state, 1.0);

        assert_relative_eq!(net.state.loads[net.load].receiving_power, 40.0, epsilon = 1e-3);
        assert_eq!(net.state.loads[off].receiving_power, 0.0);
        assert_eq!(net.state.loads[frozen].receiving_power, 7.0);
    }

    #[test]
    fn empty_network_is_harmless() {
        let mut state = PowerState::new();
        let net = state.add_network();

        tick(&mut state, 1.0);

        assert_eq!(state.networks[net].last_combined_load, 0.0);
        assert_eq!(state.networks[net].last_combined_supply, 0.0);
    }

    #[test]
    fn no_demand_ramps_supplies_down() {
        let mut net = single_network(cold_supply(100.0, 25.0, 0.0).with_ramp_position(100.0), 0.0);

        tick(&mut net.state, 1.0);

        assert_eq!(net.state.supplies[net.supply].current_supply, 0.0);
        assert_relative_eq!(net.state.supplies[net.supply].supply_ramp_position, 75.0, epsilon = 1e-3);
    }

    // -----------------------------------------------------------------------
    // Batteries
    // -----------------------------------------------------------------------

    #[test]
    fn battery_charges_at_its_rate() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(ramped_supply(1000.0));
        let battery = state.add_battery(battery(100.0, 10.0, 0.0));
        state.link_supply(supply, net);
        state.link_battery_charging(battery, net);

        tick(&mut state, 1.0);

        let b = &state.batteries[battery];
        assert_relative_eq!(b.current_storage, 10.0, epsilon = 1e-3);
        assert_relative_eq!(b.current_receiving, 10.0, epsilon = 1e-3);
        assert_relative_eq!(b.desired_power, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn charge_demand_is_limited_by_room() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(ramped_supply(1000.0));
        let mut b = battery(100.0, 50.0, 0.0);
        b.current_storage = 95.0;
        let battery = state.add_battery(b);
        state.link_supply(supply, net);
        state.link_battery_charging(battery, net);

        tick(&mut state, 0.5);

        // 5 J of room over half a second is 10 W.
        assert_relative_eq!(state.batteries[battery].current_receiving, 10.0, epsilon = 1e-3);
        assert_relative_eq!(state.batteries[battery].current_storage, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn efficiency_loses_energy_on_charge() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(ramped_supply(1000.0));
        let mut b = battery(100.0, 10.0, 0.0);
        b.efficiency = 0.5;
        let battery = state.add_battery(b);
        state.link_supply(supply, net);
        state.link_battery_charging(battery, net);

        tick(&mut state, 1.0);

        assert_relative_eq!(state.batteries[battery].current_receiving, 10.0, epsilon = 1e-3);
        assert_relative_eq!(state.batteries[battery].current_storage, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_efficiency_asks_for_nothing() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(ramped_supply(1000.0));
        let mut b = battery(100.0, 10.0, 0.0);
        b.efficiency = 0.0;
        let battery = state.add_battery(b);
        state.link_supply(supply, net);
        state.link_battery_charging(battery, net);

        tick(&mut state, 1.0);

        assert_eq!(state.batteries[battery].current_receiving, 0.0);
        assert_eq!(state.batteries[battery].current_storage, 0.0);
    }

    #[test]
    fn battery_covers_shortfall_only() {
        let mut net = single_network(ramped_supply(30.0), 50.0);
        let mut b = battery(1000.0, 0.0, 100.0);
        b.current_storage = 500.0;
        let battery = net.state.add_battery(b);
        net.state.link_battery_discharging(battery, net.network);

        tick(&mut net.state, 1.0);

        assert_relative_eq!(net.state.loads[net.load].receiving_power, 50.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.supplies[net.supply].current_supply, 30.0, epsilon = 1e-3);
        let b = &net.state.batteries[battery];
        assert_relative_eq!(b.current_supply, 20.0, epsilon = 1e-3);
        assert_relative_eq!(b.current_storage, 480.0, epsilon = 1e-3);
        assert_relative_eq!(b.loading_network_demand, 20.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.networks[net.network].last_combined_max_supply, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn idle_battery_outputs_are_zeroed() {
        let mut net = single_network(ramped_supply(100.0), 50.0);
        let mut b = battery(1000.0, 0.0, 100.0);
        b.current_storage = 500.0;
        b.current_supply = 33.0;
        b.loading_network_demand = 12.0;
        b.current_receiving = 4.0;
        let battery = net.state.add_battery(b);
        net.state.link_battery_discharging(battery, net.network);

        tick(&mut net.state, 1.0);

        let b = &net.state.batteries[battery];
        assert_eq!(b.current_supply, 0.0);
        assert_eq!(b.loading_network_demand, 0.0);
        assert_eq!(b.current_receiving, 0.0);
        assert_eq!(b.current_storage, 500.0);
    }

    #[test]
    fn empty_battery_offers_nothing() {
        let mut net = single_network(ramped_supply(10.0), 50.0);
        let battery = net.state.add_battery(battery(1000.0, 0.0, 100.0));
        net.state.link_battery_discharging(battery, net.network);

        tick(&mut net.state, 1.0);

        assert_relative_eq!(net.state.loads[net.load].receiving_power, 10.0, epsilon = 1e-3);
        assert_eq!(net.state.batteries[battery].current_supply, 0.0);
    }

    #[test]
    fn discharge_cannot_overdraw_storage() {
        let mut net = single_network(ramped_supply(0.0), 100.0);
        let mut b = battery(1000.0, 0.0, 100.0);
        b.current_storage = 5.0;
        let battery = net.state.add_battery(b);
        net.state.link_battery_discharging(battery, net.network);

        tick(&mut net.state, 0.25);

        // 5 J over a quarter second is 20 W.
        assert_relative_eq!(net.state.batteries[battery].current_supply, 20.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.batteries[battery].current_storage, 0.0, epsilon = 1e-3);
        assert_relative_eq!(net.state.loads[net.load].receiving_power, 20.0, epsilon = 1e-3);
    }

    #[test]
    fn bridge_pegs_upstream_supply_to_downstream_load() {
        let mut b = battery(1000.0, 0.0, 100.0);
        b.current_storage = 500.0;
        let mut bridge = bridged_networks(cold_supply(1000.0, 100.0, 0.0), b, 20.0);

        tick(&mut bridge.state, 1.0);

        assert_relative_eq!(bridge.state.loads[bridge.load].receiving_power, 20.0, epsilon = 1e-3);
        let bat = &bridge.state.batteries[bridge.battery];
        assert_relative_eq!(bat.current_supply, 20.0, epsilon = 1e-3);
        assert_relative_eq!(bat.current_storage, 480.0, epsilon = 1e-3);
        assert_relative_eq!(bat.desired_power, 20.0, epsilon = 1e-3);
        assert_eq!(bat.current_receiving, 0.0);
        let supply = &bridge.state.supplies[bridge.supply];
        assert_relative_eq!(supply.supply_ramp_target, 20.0, epsilon = 1e-3);
        assert_relative_eq!(supply.supply_ramp_position, 20.0, epsilon = 1e-3);

        tick(&mut bridge.state, 1.0);

        assert_relative_eq!(bridge.state.loads[bridge.load].receiving_power, 20.0, epsilon = 1e-3);
        assert_relative_eq!(bridge.state.supplies[bridge.supply].current_supply, 20.0, epsilon = 1e-3);
        let bat = &bridge.state.batteries[bridge.battery];
        assert_relative_eq!(bat.current_receiving, 20.0, epsilon = 1e-3);
        assert_relative_eq!(bat.current_storage, 480.0, epsilon = 1e-3);
    }

    #[test]
    fn chaining_reaches_network_with_uncharged_feeder() {
        let mut state = PowerState::new();
        let upstream = state.add_network();
        let downstream = state.add_network();
        let supply = state.add_supply(ramped_supply(100.0));
        state.link_supply(supply, upstream);
        let standalone = state.add_battery(battery(100.0, 0.0, 50.0));
        state.link_battery_discharging(standalone, upstream);
        let bridge = state.add_battery(battery(100.0, 0.0, 50.0));
        state.link_battery_charging(bridge, upstream);
        state.link_battery_discharging(bridge, downstream);
        let load = state.add_load(Load::new(20.0));
        state.link_load(load, downstream);

        tick(&mut state, 1.0);

        // Downstream is solved first, so its deficit reaches the bridge's
        // charge request in the same tick.
        let bat = &state.batteries[bridge];
        assert_relative_eq!(bat.desired_power, 20.0, epsilon = 1e-3);
        assert_relative_eq!(bat.current_storage, 20.0, epsilon = 1e-3);
        assert_eq!(state.loads[load].receiving_power, 0.0);

        tick(&mut state, 1.0);

        assert_relative_eq!(state.loads[load].receiving_power, 20.0, epsilon = 1e-3);
    }

    #[test]
    fn cannot_charge_flag_blocks_charging() {
        let mut state = PowerState::new();
        let net = state.add_network();
        let supply = state.add_supply(ramped_supply(1000.0));
        let mut b = battery(100.0, 10.0, 0.0);
        b.can_charge = false;
        let battery = state.add_battery(b);
        state.link_supply(supply, net);
        state.link_battery_charging(battery, net);

        tick(&mut state, 1.0);

        assert_eq!(state.batteries[battery].current_storage, 0.0);
        assert_eq!(state.networks[net].last_combined_load, 0.0);
    }

    // -----------------------------------------------------------------------
    // Guards
    // -----------------------------------------------------------------------

    #[test]
    fn zero_delta_time_is_bounded() {
        let mut b = battery(100.0, 10.0, 50.0);
        b.current_storage = 50.0;
        let mut bridge = bridged_networks(ramped_supply(100.0), b, 20.0);

        tick(&mut bridge.state, 0.0);

        let bat = &bridge.state.batteries[bridge.battery];
        assert_eq!(bat.current_storage, 50.0);
        assert_eq!(bat.current_supply, 0.0);
        assert_eq!(bat.desired_power, 0.0);
        assert!(bridge.state.loads[bridge.load].receiving_power.is_finite());
    }

    #[test]
    fn plan_does_not_mutate() {
        let net = single_network(ramped_supply(100.0), 50.0);
        let before = net.state.state_hash();

        let plan = plan_network(&net.state, net.network, 1.0);

        assert_eq!(net.state.state_hash(), before);
        assert_relative_eq!(plan.demand, 50.0, epsilon = 1e-3);
        assert_relative_eq!(plan.available, 100.0, epsilon = 1e-3);
        assert_relative_eq!(plan.met, 50.0, epsilon = 1e-3);
        assert_eq!(plan.unmet, 0.0);
    }

    #[test]
    fn paused_supply_keeps_its_output() {
        let mut net = single_network(
            Supply {
                paused: true,
                current_supply: 12.0,
                ..ramped_supply(100.0)
            },
            50.0,
        );

        tick(&mut net.state, 1.0);

        assert_eq!(net.state.supplies[net.supply].current_supply, 12.0);
        assert_eq!(net.state.loads[net.load].receiving_power, 0.0);
    }
}

//! A greedy per-network balance used as a comparison baseline.
//!
//! Each network is balanced on its own, in slotmap order:
//!
//! 1. Sum nameplate production and load demand.
//! 2. If production covers demand, loads are fully served and the surplus
//!    charges batteries one after another.
//! 3. Otherwise batteries discharge one after another to cover the deficit
//!    and loads share whatever was found.
//!
//! Ramp positions, tolerances and battery demand chaining are ignored, so
//! upstream networks never learn about a deficit downstream.

use pow3r_core::state::PowerState;

use crate::solver::PowerSolver;

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphWalkSolver;

impl GraphWalkSolver {
    pub fn new() -> Self {
        Self
    }
}

impl PowerSolver for GraphWalkSolver {
    fn name(&self) -> &'static str {
        "graph_walk"
    }

    fn tick(&mut self, delta_time: f32, state: &mut PowerState) {
        for (_, load) in state.loads.iter_mut().filter(|(_, l)| !l.paused) {
            load.receiving_power = 0.0;
        }
        for (_, supply) in state.supplies.iter_mut().filter(|(_, s)| !s.paused) {
            supply.current_supply = 0.0;
        }
        for (_, battery) in state.batteries.iter_mut().filter(|(_, b)| !b.paused) {
            battery.current_supply = 0.0;
            battery.current_receiving = 0.0;
        }

        let network_ids: Vec<_> = state.networks.keys().collect();

        for net_id in network_ids {
            let network = &state.networks[net_id];

            // Step 1: nameplate production and demand.
            let supplies: Vec<_> = network
                .supplies
                .iter()
                .copied()
                .filter(|id| state.supplies[*id].enabled && !state.supplies[*id].paused)
                .collect();
            let loads: Vec<_> = network
                .loads
                .iter()
                .copied()
                .filter(|id| state.loads[*id].enabled && !state.loads[*id].paused)
                .collect();
            let chargers: Vec<_> = network.battery_loads.clone();
            let dischargers: Vec<_> = network.battery_supplies.clone();

            let production: f32 = supplies.iter().map(|id| state.supplies[*id].max_supply).sum();
            let demand: f32 = loads.iter().map(|id| state.loads[*id].desired_power).sum();

            let mut drawn = demand.min(production);
            let mut discharged = 0.0;

            if production >= demand {
                // Step 2: surplus charges batteries in order.
                let mut excess = production - demand;
                for id in &chargers {
                    if excess <= 0.0 {
                        break;
                    }
                    let battery = &mut state.batteries[*id];
                    if !battery.enabled || battery.paused || !battery.can_charge {
                        continue;
                    }
                    if battery.efficiency <= 0.0 || delta_time <= 0.0 {
                        continue;
                    }
                    let headroom = (battery.capacity - battery.current_storage).max(0.0)
                        / battery.efficiency
                        / delta_time;
                    let rate = excess.min(battery.max_charge_rate).min(headroom).max(0.0);
                    if rate > 0.0 {
                        battery.current_receiving = rate;
                        battery.current_storage = (battery.current_storage
                            + rate * battery.efficiency * delta_time)
                            .min(battery.capacity);
                        excess -= rate;
                        drawn += rate;
                    }
                }
            } else {
                // Step 3: batteries cover the deficit in order.
                let mut deficit = demand - production;
                for id in &dischargers {
                    if deficit <= 0.0 {
                        break;
                    }
                    let battery = &mut state.batteries[*id];
                    if !battery.enabled || battery.paused || !battery.can_discharge {
                        continue;
                    }
                    if delta_time <= 0.0 {
                        continue;
                    }
                    let rate = deficit
                        .min(battery.max_supply)
                        .min(battery.current_storage / delta_time)
                        .max(0.0);
                    if rate > 0.0 {
                        battery.current_supply = rate;
                        battery.current_storage =
                            (battery.current_storage - rate * delta_time).max(0.0);
                        deficit -= rate;
                        discharged += rate;
                    }
                }
            }

            let served = (production + discharged).min(demand);
            if demand > 0.0 {
                let ratio = served / demand;
                for id in &loads {
                    let load = &mut state.loads[*id];
                    load.receiving_power = load.desired_power * ratio;
                }
            }
            if production > 0.0 {
                let ratio = drawn / production;
                for id in &supplies {
                    let supply = &mut state.supplies[*id];
                    supply.current_supply = supply.max_supply * ratio;
                }
            }

            let network = &mut state.networks[net_id];
            network.last_combined_load = demand;
            network.last_combined_supply = production + discharged;
            network.last_combined_max_supply = production + discharged;
        }
    }
}

//! Ramp position updates, run as the last step of every tick.
//!
//! A ramp position models generator inertia: output can only move toward
//! its target at `supply_ramp_rate` watts per second.

use pow3r_core::state::PowerState;

/// Differences at or below this snap straight to the target.
pub const RAMP_SNAP_EPSILON: f32 = 0.001;

/// Move every non-paused supply's and battery's ramp position toward its
/// target. Disabled entities drop to zero immediately.
pub fn update_ramp_positions(delta_time: f32, state: &mut PowerState) {
    for (_, supply) in state.supplies.iter_mut().filter(|(_, s)| !s.paused) {
        supply.supply_ramp_position = step_ramp(
            supply.enabled,
            supply.supply_ramp_position,
            supply.supply_ramp_target,
            supply.supply_ramp_rate,
            supply.max_supply,
            delta_time,
        );
    }

    for (_, battery) in state.batteries.iter_mut().filter(|(_, b)| !b.paused) {
        battery.supply_ramp_position = step_ramp(
            battery.enabled,
            battery.supply_ramp_position,
            battery.supply_ramp_target,
            battery.supply_ramp_rate,
            battery.max_supply,
            delta_time,
        );
    }
}

fn step_ramp(
    enabled: bool,
    position: f32,
    target: f32,
    rate: f32,
    max_supply: f32,
    delta_time: f32,
) -> f32 {
    if !enabled {
        return 0.0;
    }

    let diff = target - position;
    if diff.abs() > RAMP_SNAP_EPSILON {
        let max_step = (rate * delta_time).max(0.0);
        let moved = position + diff.clamp(-max_step, max_step);
        moved.clamp(0.0, max_supply.max(0.0))
    } else {
        target
    }
}

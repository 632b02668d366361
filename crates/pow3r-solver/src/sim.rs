//! Fixed-timestep simulation driver.
//!
//! [`PowerSimulation`] owns a graph and a solver and decides how often the
//! solver runs. `step()` runs exactly one tick; `advance(dt)` accumulates
//! real elapsed time and runs as many fixed ticks as fit, carrying the
//! remainder forward.

use pow3r_core::state::PowerState;
use tracing::warn;

use crate::battery_ramp_peg::BatteryRampPegSolver;
use crate::solver::PowerSolver;

/// Default simulation rate in ticks per second.
pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;

/// Default bound on how many ticks one `advance()` call may run.
pub const DEFAULT_MAX_CATCH_UP: u32 = 10;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Simulation time bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimClock {
    /// Ticks run so far.
    pub tick: u64,
    /// Elapsed seconds not yet consumed by a tick.
    pub accumulator: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of a [`PowerSimulation::advance`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    /// Number of ticks actually executed.
    pub steps_run: u32,
    /// Whether backlog beyond the catch-up bound was dropped.
    pub clamped: bool,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct PowerSimulation {
    pub state: PowerState,
    solver: Box<dyn PowerSolver>,
    clock: SimClock,
    ticks_per_second: u32,
    max_catch_up: u32,
}

impl PowerSimulation {
    /// A simulation at the default rate.
    pub fn new(state: PowerState, solver: Box<dyn PowerSolver>) -> Self {
        Self {
            state,
            solver,
            clock: SimClock::new(),
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
        }
    }

    /// A simulation using [`BatteryRampPegSolver`].
    pub fn with_default_solver(state: PowerState) -> Self {
        Self::new(state, Box::new(BatteryRampPegSolver::new()))
    }

    /// Set the tick rate. Zero is clamped to one.
    pub fn with_tick_rate(mut self, ticks_per_second: u32) -> Self {
        self.ticks_per_second = ticks_per_second.max(1);
        self
    }

    /// Set how many ticks a single `advance()` may run. Zero is clamped to one.
    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Seconds covered by one tick.
    pub fn tick_duration(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// Run one fixed tick.
    pub fn step(&mut self) {
        let dt = self.tick_duration();
        self.solver.tick(dt, &mut self.state);
        self.clock.tick += 1;
    }

    /// Add `elapsed` seconds and run every whole tick that fits, up to the
    /// catch-up bound. Non-positive or non-finite input is ignored.
    pub fn advance(&mut self, elapsed: f32) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return result;
        }

        let duration = 1.0 / self.ticks_per_second as f64;
        self.clock.accumulator += elapsed as f64;

        while self.clock.accumulator >= duration && result.steps_run < self.max_catch_up {
            self.step();
            self.clock.accumulator -= duration;
            result.steps_run += 1;
        }

        if self.clock.accumulator >= duration {
            let dropped = (self.clock.accumulator / duration).floor();
            warn!(
                dropped_ticks = dropped,
                max_catch_up = self.max_catch_up,
                "power simulation fell behind; dropping backlog"
            );
            self.clock.accumulator %= duration;
            result.clamped = true;
        }

        result
    }

    /// FNV-1a hash of the graph's persistent and output fields.
    pub fn state_hash(&self) -> u64 {
        self.state.state_hash()
    }
}

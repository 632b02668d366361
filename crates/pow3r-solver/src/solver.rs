//! The solver strategy seam.

use std::fmt::Debug;

use pow3r_core::state::PowerState;
use serde::{Deserialize, Serialize};

use crate::battery_ramp_peg::BatteryRampPegSolver;
use crate::graph_walk::GraphWalkSolver;

/// A power flow algorithm.
///
/// `tick` reads the graph's static parameters and persistent state, and
/// writes every runtime output in place. It must not add, remove or relink
/// entities, and must not fail: ill-formed input produces bounded output,
/// never an error.
pub trait PowerSolver: Debug + Send {
    /// Short identifier used in logs and scenario files.
    fn name(&self) -> &'static str;

    /// Advance the graph by `delta_time` seconds.
    fn tick(&mut self, delta_time: f32, state: &mut PowerState);
}

/// Leaves the graph untouched. Useful as a baseline and for freezing a
/// simulation without pausing every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpSolver;

impl PowerSolver for NoOpSolver {
    fn name(&self) -> &'static str {
        "no_op"
    }

    fn tick(&mut self, _delta_time: f32, _state: &mut PowerState) {}
}

/// Selects a solver by name, e.g. from a scenario file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    #[default]
    BatteryRampPeg,
    GraphWalk,
    NoOp,
}

impl SolverKind {
    pub fn build(self) -> Box<dyn PowerSolver> {
        match self {
            SolverKind::BatteryRampPeg => Box::new(BatteryRampPegSolver::new()),
            SolverKind::GraphWalk => Box::new(GraphWalkSolver::new()),
            SolverKind::NoOp => Box::new(NoOpSolver),
        }
    }
}

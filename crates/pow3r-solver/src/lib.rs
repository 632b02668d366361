//! Pow3r Solver -- power flow algorithms over a [`PowerState`].
//!
//! [`PowerState`]: pow3r_core::state::PowerState
//!
//! # Key Types
//!
//! - [`solver::PowerSolver`] -- The strategy trait every algorithm implements.
//! - [`battery_ramp_peg::BatteryRampPegSolver`] -- The default single-pass
//!   solver with supply ramping and battery demand chaining.
//! - [`graph_walk::GraphWalkSolver`] -- Greedy nameplate balance, kept as a
//!   comparison baseline.
//! - [`sim::PowerSimulation`] -- Fixed-timestep driver owning a graph and a
//!   solver.
//!
//! # Features
//!
//! - `parallel` -- Plan networks of equal height concurrently with rayon.

pub mod battery_ramp_peg;
pub mod graph_walk;
pub mod height;
pub mod ramp;
pub mod sim;
pub mod solver;

pub use battery_ramp_peg::BatteryRampPegSolver;
pub use graph_walk::GraphWalkSolver;
pub use sim::PowerSimulation;
pub use solver::{NoOpSolver, PowerSolver, SolverKind};

//! Pow3r Core -- the power graph shared by every Pow3r solver.
//!
//! This crate holds the data a power solver operates on: supplies, loads,
//! batteries and the networks joining them, stored as flat generational-id
//! maps. It also provides invariant checking, versioned snapshots, and
//! deterministic state hashing. It contains no solving logic; see
//! `pow3r-solver` for that.
//!
//! # Graph Building
//!
//! Entities are inserted unlinked and then attached to networks:
//!
//! ```rust,ignore
//! let mut state = PowerState::new();
//! let net = state.add_network();
//! let generator = state.add_supply(Supply::new(100.0));
//! state.link_supply(generator, net);
//! ```
//!
//! # Key Types
//!
//! - [`state::PowerState`] -- The complete graph handed to a solver each tick.
//! - [`state::Battery`] -- Storage bridging a charging and a discharging network.
//! - [`validation`] -- Reportable invariant and graph consistency checks.
//! - [`serialize`] -- Versioned snapshots via bitcode, JSON behind `json`.
//! - [`hash::StateHash`] -- FNV-1a hashing for determinism checks.

pub mod hash;
pub mod id;
pub mod serialize;
pub mod state;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

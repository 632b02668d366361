//! Network ordering by battery dependency.
//!
//! A network's height is one more than the tallest network its charging
//! batteries discharge into. Solving in ascending height means every
//! downstream network has reported its unmet demand before the upstream
//! network that charges its batteries is solved.
//!
//! Heights are recomputed from scratch every tick and live only in
//! [`TickScratch`]; nothing is stored on the graph.

use pow3r_core::id::NetworkId;
use pow3r_core::state::PowerState;
use slotmap::SecondaryMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

enum Frame {
    Enter(NetworkId),
    Exit(NetworkId),
}

/// Per-tick ordering data.
#[derive(Debug, Clone, Default)]
pub struct TickScratch {
    pub heights: SecondaryMap<NetworkId, u32>,
    /// Networks sorted by ascending height, ties in slotmap order.
    pub order: Vec<NetworkId>,
}

impl TickScratch {
    pub fn height(&self, network: NetworkId) -> u32 {
        self.heights.get(network).copied().unwrap_or(0)
    }

    /// Runs of `order` sharing one height. On an acyclic topology every
    /// network gets its height from the walk, so no battery connects two
    /// networks of the same run.
    pub fn levels(&self) -> impl Iterator<Item = &[NetworkId]> {
        self.order
            .chunk_by(|a, b| self.height(*a) == self.height(*b))
    }
}

/// Compute heights and the solve order for this tick.
pub fn prepare_tick(state: &PowerState) -> TickScratch {
    let heights = estimate_heights(state);
    let mut order: Vec<NetworkId> = state.networks.keys().collect();
    order.sort_by_key(|n| heights.get(*n).copied().unwrap_or(0));
    TickScratch { heights, order }
}

/// Height of every network.
///
/// The walk starts from every network no other network feeds through a
/// battery, and follows charging batteries downstream. Every network of an
/// acyclic topology is reached this way. A network met again while still
/// on the walk's path closes a cycle and contributes height 0. Networks
/// the walk never reaches sit on or below a cycle with no entry and also
/// get 0.
pub fn estimate_heights(state: &PowerState) -> SecondaryMap<NetworkId, u32> {
    let mut marks: SecondaryMap<NetworkId, Mark> = state
        .networks
        .keys()
        .map(|n| (n, Mark::Unvisited))
        .collect();
    let mut heights: SecondaryMap<NetworkId, u32> =
        state.networks.keys().map(|n| (n, 0)).collect();
    let mut stack = Vec::new();

    let roots = state
        .networks
        .keys()
        .filter(|&n| discharge_sources(state, n).next().is_none());

    for root in roots {
        stack.push(Frame::Enter(root));

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(network) => {
                    if marks[network] != Mark::Unvisited {
                        continue;
                    }
                    marks[network] = Mark::Visiting;
                    stack.push(Frame::Exit(network));
                    for child in discharge_targets(state, network) {
                        if marks.get(child) == Some(&Mark::Unvisited) {
                            stack.push(Frame::Enter(child));
                        }
                    }
                }
                Frame::Exit(network) => {
                    let mut tallest = 0;
                    for child in discharge_targets(state, network) {
                        match marks.get(child) {
                            Some(Mark::Done) => tallest = tallest.max(heights[child]),
                            Some(Mark::Visiting) => {
                                debug!(?network, ?child, "battery cycle broken");
                            }
                            _ => {}
                        }
                    }
                    heights[network] = tallest + 1;
                    marks[network] = Mark::Done;
                }
            }
        }
    }

    heights
}

/// Networks charging the batteries that discharge into `network`. A
/// battery with no charging port feeds from nowhere and adds nothing.
fn discharge_sources(state: &PowerState, network: NetworkId) -> impl Iterator<Item = NetworkId> {
    state.networks[network]
        .battery_supplies
        .iter()
        .filter_map(|b| state.batteries[*b].linked_network_charging)
        .filter(|n| state.networks.contains_key(*n))
}

/// Networks fed by the batteries charging from `network`.
fn discharge_targets(state: &PowerState, network: NetworkId) -> impl Iterator<Item = NetworkId> {
    state.networks[network]
        .battery_loads
        .iter()
        .filter_map(|b| state.batteries[*b].linked_network_discharging)
        .filter(|n| state.networks.contains_key(*n))
}

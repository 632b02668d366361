//! Deterministic state hashing for determinism and desync checks.

use slotmap::Key;

use crate::state::PowerState;

/// A simple deterministic hash of power state.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// Feed an f32 by bit pattern, so `0.0` and `-0.0` hash differently.
    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    /// Feed a slotmap key as its packed version + index.
    pub fn write_key<K: Key>(&mut self, key: K) {
        self.write_u64(key.data().as_ffi());
    }

    fn write_opt_key<K: Key>(&mut self, key: Option<K>) {
        match key {
            Some(k) => self.write_key(k),
            None => self.write_u64(0),
        }
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerState {
    /// Hash every persistent and output field, in slotmap order.
    /// Per-tick scratch values are excluded.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();

        for (id, s) in &self.supplies {
            h.write_key(id);
            h.write_bool(s.enabled);
            h.write_bool(s.paused);
            h.write_f32(s.max_supply);
            h.write_f32(s.current_supply);
            h.write_f32(s.supply_ramp_position);
            h.write_opt_key(s.linked_network);
        }

        for (id, l) in &self.loads {
            h.write_key(id);
            h.write_bool(l.enabled);
            h.write_bool(l.paused);
            h.write_f32(l.desired_power);
            h.write_f32(l.receiving_power);
            h.write_opt_key(l.linked_network);
        }

        for (id, b) in &self.batteries {
            h.write_key(id);
            h.write_bool(b.enabled);
            h.write_bool(b.paused);
            h.write_f32(b.current_storage);
            h.write_f32(b.current_receiving);
            h.write_f32(b.current_supply);
            h.write_f32(b.supply_ramp_position);
            h.write_f32(b.loading_network_demand);
            h.write_opt_key(b.linked_network_charging);
            h.write_opt_key(b.linked_network_discharging);
        }

        for (id, n) in &self.networks {
            h.write_key(id);
            h.write_u64(n.supplies.len() as u64);
            h.write_u64(n.loads.len() as u64);
            h.write_u64(n.battery_loads.len() as u64);
            h.write_u64(n.battery_supplies.len() as u64);
            h.write_f32(n.last_combined_load);
            h.write_f32(n.last_combined_supply);
            h.write_f32(n.last_combined_max_supply);
        }

        h.finish()
    }
}

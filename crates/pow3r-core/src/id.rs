use slotmap::new_key_type;

new_key_type! {
    /// Identifies a power supply (generator) in the [`PowerState`](crate::state::PowerState).
    pub struct SupplyId;

    /// Identifies a power load (consumer).
    pub struct LoadId;

    /// Identifies a battery. Batteries are the only entities that may
    /// belong to two networks at once.
    pub struct BatteryId;

    /// Identifies a network: a set of electrically joined entities sharing
    /// one instantaneous supply pool.
    pub struct NetworkId;
}

//! Opaque ID newtypes for netlist entities.
//!
//! IDs are created by [`Arena::alloc`](strobe_common::Arena::alloc) and stay
//! valid for the netlist's lifetime.

use strobe_common::define_arena_id;

define_arena_id!(
    /// Opaque, copyable ID for a gate node in the netlist.
    GateId
);

define_arena_id!(
    /// Opaque, copyable ID for a net (wire) in the netlist.
    NetId
);

define_arena_id!(
    /// Opaque, copyable ID for a port instance on a gate.
    PortId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn raw_roundtrip() {
        let id = NetId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn distinct_ids_hash_apart() {
        let mut set = HashSet::new();
        set.insert(GateId::from_raw(1));
        set.insert(GateId::from_raw(2));
        set.insert(GateId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let id = PortId::from_raw(9);
        let json = serde_json::to_string(&id).unwrap();
        let back: PortId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

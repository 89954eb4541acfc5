//! Generational handle types for graph entities.
//!
//! [`NodeId`] and [`EdgeId`] pair a slot index with a generation counter.
//! Slots are recycled through a free list after deletion; the generation
//! counter makes a handle held across a removal or a [`clear`] a detectable
//! error instead of a silent reference to an unrelated entity.
//!
//! [`clear`]: crate::graph::Graph::clear

use crate::arena::Handle;
use serde::{Deserialize, Serialize};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name {
            slot: u32,
            generation: u32,
        }

        impl Handle for $name {
            fn new(slot: u32, generation: u32) -> Self {
                Self { slot, generation }
            }

            fn slot(self) -> u32 {
                self.slot
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }
    };
}

define_handle!(
    /// Generational handle for a node in a [`Graph`](crate::graph::Graph).
    NodeId
);

define_handle!(
    /// Generational handle for an edge in a [`Graph`](crate::graph::Graph).
    EdgeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn handle_roundtrip() {
        let id = NodeId::new(42, 3);
        assert_eq!(id.slot(), 42);
        assert_eq!(id.generation(), 3);
    }

    #[test]
    fn same_slot_different_generation_differs() {
        let a = NodeId::new(7, 0);
        let b = NodeId::new(7, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn handle_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(EdgeId::new(1, 0));
        set.insert(EdgeId::new(2, 0));
        set.insert(EdgeId::new(1, 0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let id = EdgeId::new(99, 5);
        let json = serde_json::to_string(&id).unwrap();
        let back: EdgeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

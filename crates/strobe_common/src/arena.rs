//! Append-only arena for dense, ID-indexed storage.
//!
//! [`Arena`] hands out opaque [`ArenaId`] keys on insertion. Items are never
//! removed or reordered, so a key stays valid for the arena's lifetime. The
//! graph engine uses its own generational store where deletion exists; this
//! one backs the netlist and FSM models, which only grow.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// A dense, ID-indexed container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocates a new item and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns a reference to the item with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the item with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID is out of bounds.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }

    /// Returns the number of items in the arena.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the arena contains no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(ID, &T)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over the allocated IDs in order.
    pub fn keys(&self) -> impl Iterator<Item = I> {
        (0..self.items.len()).map(|i| I::from_raw(i as u32))
    }

    /// Iterates over references to items in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

/// Defines an opaque `u32` ID newtype implementing [`ArenaId`].
#[macro_export]
macro_rules! define_arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, Debug,
            serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl $crate::arena::ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_arena_id!(
        /// Test-only ID.
        ProbeId
    );

    #[test]
    fn alloc_and_get() {
        let mut arena: Arena<ProbeId, &str> = Arena::new();
        let id = arena.alloc("hello");
        assert_eq!(arena[id], "hello");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn ids_are_sequential() {
        let mut arena: Arena<ProbeId, u32> = Arena::new();
        let a = arena.alloc(10);
        let b = arena.alloc(20);
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(arena[a], 10);
        assert_eq!(arena[b], 20);
    }

    #[test]
    fn get_mut_modifies() {
        let mut arena: Arena<ProbeId, String> = Arena::new();
        let id = arena.alloc("before".to_string());
        *arena.get_mut(id) = "after".to_string();
        assert_eq!(arena[id], "after");
    }

    #[test]
    fn empty_arena() {
        let arena: Arena<ProbeId, u32> = Arena::default();
        assert!(arena.is_empty());
        assert_eq!(arena.keys().count(), 0);
    }

    #[test]
    fn iter_in_allocation_order() {
        let mut arena: Arena<ProbeId, char> = Arena::new();
        arena.alloc('a');
        arena.alloc('b');
        arena.alloc('c');
        let collected: Vec<char> = arena.values().copied().collect();
        assert_eq!(collected, vec!['a', 'b', 'c']);
    }

    #[test]
    fn serde_roundtrip() {
        let mut arena: Arena<ProbeId, String> = Arena::new();
        arena.alloc("first".to_string());
        arena.alloc("second".to_string());
        let json = serde_json::to_string(&arena).unwrap();
        let restored: Arena<ProbeId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[ProbeId::from_raw(1)], "second");
    }
}

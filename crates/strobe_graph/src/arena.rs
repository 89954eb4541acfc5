//! Generational slot arena with free-list recycling.
//!
//! The [`SlotArena`] stores entities in dense slots addressed by opaque
//! generational handles. Removed slots go on a free list and are reused by
//! later insertions; each reuse bumps the slot's generation so stale handles
//! are rejected on lookup instead of silently aliasing the new occupant.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Trait for generational handle types used as arena keys.
pub trait Handle: Copy {
    /// Creates a handle from a slot index and generation counter.
    fn new(slot: u32, generation: u32) -> Self;

    /// Returns the slot index.
    fn slot(self) -> u32;

    /// Returns the generation counter.
    fn generation(self) -> u32;
}

/// A single arena slot: either occupied or on the free list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot<T> {
    /// Current generation of this slot. Bumped on every removal.
    generation: u32,
    /// The occupant, or `None` while the slot is on the free list.
    entry: Option<T>,
    /// Next free slot index while vacant.
    next_free: Option<u32>,
}

/// A slot-addressed container with generational handles and a recycling
/// free list.
///
/// Lookup with a stale handle (removed entity, or any handle across a
/// [`clear`](SlotArena::clear)) returns `None` rather than aliasing a
/// recycled slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotArena<I: Handle, T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    occupied: usize,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: Handle, T> Default for SlotArena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Handle, T> SlotArena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            occupied: 0,
            _marker: PhantomData,
        }
    }

    /// Inserts an item, reusing a free slot if one is available.
    pub fn insert(&mut self, item: T) -> I {
        self.occupied += 1;
        match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                self.free_head = slot.next_free.take();
                slot.entry = Some(item);
                I::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(item),
                    next_free: None,
                });
                I::new(index, 0)
            }
        }
    }

    /// Removes the item with the given handle, returning it.
    ///
    /// The slot's generation is bumped so the handle (and any copy of it)
    /// becomes stale, then the slot joins the free list.
    pub fn remove(&mut self, id: I) -> Option<T> {
        let slot = self.slots.get_mut(id.slot() as usize)?;
        if slot.generation != id.generation() || slot.entry.is_none() {
            return None;
        }
        let item = slot.entry.take();
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = Some(id.slot());
        self.occupied -= 1;
        item
    }

    /// Returns a reference to the item, or `None` for a stale handle.
    pub fn get(&self, id: I) -> Option<&T> {
        let slot = self.slots.get(id.slot() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_ref()
    }

    /// Returns a mutable reference to the item, or `None` for a stale handle.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.slot() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Returns `true` if the handle refers to a live item.
    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Returns the number of live items.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the arena holds no live items.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Removes every item and bumps every slot's generation.
    ///
    /// Handles created before the clear are stale afterwards; they are
    /// rejected on lookup rather than resolving to recycled slots.
    pub fn clear(&mut self) {
        self.free_head = None;
        self.occupied = 0;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            slot.entry = None;
            slot.generation = slot.generation.wrapping_add(1);
            slot.next_free = self.free_head;
            self.free_head = Some(index as u32);
        }
    }

    /// Iterates over `(handle, &item)` pairs for live items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|item| (I::new(index as u32, slot.generation), item))
        })
    }

    /// Iterates over handles of live items in slot order.
    pub fn keys(&self) -> impl Iterator<Item = I> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entry
                .as_ref()
                .map(|_| I::new(index as u32, slot.generation))
        })
    }
}

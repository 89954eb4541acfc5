//! Shared foundational types used across the Strobe synthesis toolchain.
//!
//! This crate provides core types including interned identifiers, three-state
//! logic values, and common result types.

#![warn(missing_docs)]

pub mod arena;
pub mod ident;
pub mod logic;
pub mod result;

pub use arena::{Arena, ArenaId};
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use result::{InternalError, StrobeResult};

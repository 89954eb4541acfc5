//! Simulation error types.

/// Errors that can occur while running the event loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// The event loop exceeded its iteration budget without settling; the
    /// circuit is oscillating or pathologically deep.
    #[error("iteration budget exhausted after {limit} events (last net {net})")]
    IterationLimit {
        /// The configured budget.
        limit: u64,
        /// Raw index of the net processed when the budget ran out.
        net: u32,
    },

    /// An event referenced a time pool that was never created.
    #[error("unknown time pool {pool}")]
    UnknownPool {
        /// The offending pool index.
        pool: usize,
    },
}

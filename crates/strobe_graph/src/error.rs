//! Error types for graph construction and path queries.

/// Errors reported by graph operations.
///
/// Structural invariant violations (cyclic graph where acyclicity is
/// required, stale handles) are distinct named conditions; none of them
/// panic in non-test code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The graph contains a cycle, but the operation requires a DAG.
    #[error("graph is cyclic: acyclic graph required")]
    Cyclic,

    /// A handle referred to a removed or cleared entity.
    #[error("stale {entity} handle (slot {slot}, generation {generation})")]
    StaleHandle {
        /// What kind of entity the handle named ("node" or "edge").
        entity: &'static str,
        /// The slot index of the stale handle.
        slot: u32,
        /// The generation of the stale handle.
        generation: u32,
    },

    /// Path reconstruction was requested before any path computation ran.
    #[error("no path computation has been run on this graph")]
    NotComputed,

    /// The destination is unreachable from the path-computation source.
    #[error("destination is unreachable from the path source")]
    NoPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_display() {
        assert_eq!(
            GraphError::Cyclic.to_string(),
            "graph is cyclic: acyclic graph required"
        );
    }

    #[test]
    fn stale_handle_display() {
        let e = GraphError::StaleHandle {
            entity: "node",
            slot: 4,
            generation: 2,
        };
        assert_eq!(e.to_string(), "stale node handle (slot 4, generation 2)");
    }

    #[test]
    fn no_path_display() {
        assert_eq!(
            GraphError::NoPath.to_string(),
            "destination is unreachable from the path source"
        );
    }
}

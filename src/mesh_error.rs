//! MeshError: Unified error type for tet-renumber public APIs
//!
//! Every fallible step of the renumbering pipeline reports through this type.
//! The top-level entry point never surfaces it as an `Err`; it is folded into
//! a [`RenumberOutcome`](crate::algs::renumber::RenumberOutcome) instead.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::partitioning::error::PartitionError;

/// Unified error type for mesh renumbering operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Too few live elements for box partitioning to pay off.
    #[error("graph too small: {live} live elements, need at least {}", .min_bucket_size.saturating_mul(2))]
    GraphTooSmall { live: usize, min_bucket_size: usize },
    /// The dual graph could not be made well-formed.
    #[error("graph error: {0}")]
    GraphStructure(String),
    /// A transient buffer could not be acquired.
    #[error("allocation of `{what}` failed: {source}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },
    /// The partitioning oracle failed or returned an unusable table.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// A permutation table is not a bijection over its index range.
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),
    /// A live entity references a vertex that is out of range or tagged unused.
    #[error("{entity} {index} references unusable vertex {vertex}")]
    DanglingVertexReference {
        entity: &'static str,
        index: usize,
        vertex: usize,
    },
    /// The face-adjacency table could not be regenerated.
    #[error("adjacency rebuild failed: {0}")]
    Rebuild(String),
    /// The mesh carries no face-adjacency table.
    #[error("mesh has no face-adjacency table")]
    MissingAdjacency,
    /// An entity array has no free slot left.
    #[error("{0} capacity exhausted")]
    CapacityExhausted(&'static str),
    /// A structural invariant of the mesh or configuration does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

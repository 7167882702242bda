//! Partitioning errors for tet-renumber

use thiserror::Error;

/// Errors reported by a [`PartitionOracle`](crate::partitioning::PartitionOracle)
/// or detected while checking its output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartitionError {
    /// `load` or `compute_box_partition` was called outside a create/destroy session
    #[error("partitioner used before `create`")]
    NotCreated,
    /// `compute_box_partition` was called before any graph was loaded
    #[error("no graph loaded into the partitioner")]
    NotLoaded,
    /// Boxes must hold at least one vertex
    #[error("invalid box size {0}")]
    InvalidBucketSize(usize),
    /// The loaded graph failed the structural check
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
    /// The returned table is not a bijection over `1..=n`
    #[error("partition is not a permutation: {0}")]
    NotBijective(String),
    /// Other errors (e.g. METIS wrapper failures)
    #[error("partitioner error: {0}")]
    Backend(String),
}

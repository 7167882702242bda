#![cfg_attr(docsrs, feature(doc_cfg))]
//! # tet-renumber
//!
//! tet-renumber reorders the elements and vertices of an unstructured
//! tetrahedral mesh so that entities which are neighbours in the mesh are
//! also close in memory.
//!
//! ## Pipeline
//! - Build the dual graph of the live elements from the face adjacency.
//! - Hand it to a box partitioner ([`PartitionOracle`](partitioning::PartitionOracle)),
//!   which returns a locality-preserving permutation.
//! - Permute the elements, renumber the vertices in first-seen order, compact
//!   both arrays and rethread their free lists.
//! - Rebuild the face adjacency through an
//!   [`AdjacencyRebuilder`](topology::AdjacencyRebuilder).
//!
//! The outcome is a [`RenumberOutcome`](algs::RenumberOutcome): full success,
//! a soft failure (mesh valid, possibly not reordered) or a hard failure
//! (adjacency could not be rebuilt).
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! tet-renumber = "0.1"
//! # Optional features:
//! # features = ["metis-support"]
//! ```
//!
//! ```
//! use tet_renumber::prelude::*;
//!
//! let mut mesh = tet_box(4, 4, 4, [0.0; 3], [1.0; 3], TetBoxOptions::default()).unwrap();
//! let outcome = renumber_mesh(&mut mesh, None, RenumberConfig::with_bucket_size(32));
//! assert!(outcome.is_full_success());
//! ```
//!
//! ## Logging
//!
//! Progress is reported through the [`log`] facade: phase timings at `debug`,
//! skipped renumberings at `info`/`warn`, failed adjacency rebuilds at `error`.

pub mod algs;
pub mod debug_invariants;
pub mod mesh_error;
pub mod partitioning;
pub mod timing;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::compact::{CompactionReport, compact};
    pub use crate::algs::meshgen::{TetBoxOptions, tet_box};
    #[cfg(feature = "metis-support")]
    pub use crate::algs::metis_partition::MetisBoxes;
    pub use crate::algs::renumber::{
        RenumberConfig, RenumberOutcome, Renumberer, renumber_mesh,
    };
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::mesh_error::MeshError;
    pub use crate::partitioning::{BreadthFirstBoxes, PartitionError, PartitionOracle};
    pub use crate::topology::adjacency::{AdjacencyRebuilder, FaceHashRebuilder};
    pub use crate::topology::mesh::{SolutionField, TetMesh};
}

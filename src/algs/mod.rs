//! Renumbering algorithms and their building blocks.

pub mod buffer;
pub mod compact;
pub mod dual_graph;
pub mod meshgen;
#[cfg(feature = "metis-support")]
pub mod metis_partition;
pub mod permute;
pub mod renumber;

pub use compact::{CompactionReport, compact};
pub use dual_graph::{DualGraph, build_dual};
pub use renumber::{RenumberConfig, RenumberOutcome, Renumberer, renumber_mesh};

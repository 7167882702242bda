//! Entry-point for box partitioning of dual graphs.
//!
//! The renumbering pipeline treats the partitioner as an opaque oracle with a
//! session-style contract: `create`, `load`, optionally `validate`,
//! `compute_box_partition`, `destroy`. [`box_permutation`] drives one such
//! session and guarantees `destroy` runs on every exit path.

pub mod boxes;
pub mod error;

pub use self::boxes::BreadthFirstBoxes;
pub use self::error::PartitionError;

use crate::algs::dual_graph::DualGraph;
use crate::algs::permute::check_bijection;

/// Graph partitioner producing a locality-preserving vertex permutation.
///
/// All arrays are 1-based with slot 0 unused, matching [`DualGraph`].
pub trait PartitionOracle {
    /// Start a session, discarding any previous state.
    fn create(&mut self) -> Result<(), PartitionError>;

    /// Load a CSR graph with `vertex_count` vertices.
    fn load(
        &mut self,
        vertex_count: usize,
        xadj: &[usize],
        adjncy: &[usize],
    ) -> Result<(), PartitionError>;

    /// Structural self-check of the loaded graph.
    fn validate(&self) -> Result<(), PartitionError> {
        Ok(())
    }

    /// Group vertices into boxes of about `bucket_size` and return
    /// `perm[1..=n]`, the new position of every vertex. `perm[0]` is unused.
    fn compute_box_partition(&mut self, bucket_size: usize) -> Result<Vec<usize>, PartitionError>;

    /// End the session and release everything acquired since `create`.
    fn destroy(&mut self);
}

impl<O: PartitionOracle + ?Sized> PartitionOracle for &mut O {
    fn create(&mut self) -> Result<(), PartitionError> {
        (**self).create()
    }
    fn load(
        &mut self,
        vertex_count: usize,
        xadj: &[usize],
        adjncy: &[usize],
    ) -> Result<(), PartitionError> {
        (**self).load(vertex_count, xadj, adjncy)
    }
    fn validate(&self) -> Result<(), PartitionError> {
        (**self).validate()
    }
    fn compute_box_partition(&mut self, bucket_size: usize) -> Result<Vec<usize>, PartitionError> {
        (**self).compute_box_partition(bucket_size)
    }
    fn destroy(&mut self) {
        (**self).destroy()
    }
}

/// Open oracle session; destroyed when dropped.
struct Session<'a, O: PartitionOracle + ?Sized> {
    oracle: &'a mut O,
}

impl<'a, O: PartitionOracle + ?Sized> Session<'a, O> {
    fn open(oracle: &'a mut O) -> Result<Self, PartitionError> {
        oracle.create()?;
        Ok(Self { oracle })
    }
}

impl<O: PartitionOracle + ?Sized> Drop for Session<'_, O> {
    fn drop(&mut self) {
        self.oracle.destroy();
    }
}

/// Run one oracle session over `graph` and return a checked permutation of
/// `1..=graph.vertex_count()`.
pub fn box_permutation<O>(
    oracle: &mut O,
    graph: &DualGraph,
    bucket_size: usize,
    check_graph: bool,
) -> Result<Vec<usize>, PartitionError>
where
    O: PartitionOracle + ?Sized,
{
    let n = graph.vertex_count();
    let mut session = Session::open(oracle)?;
    session.oracle.load(n, &graph.xadj, &graph.adjncy)?;
    if check_graph {
        log::debug!("checking dual graph before partitioning");
        session.oracle.validate()?;
    }
    let perm = session.oracle.compute_box_partition(bucket_size)?;
    drop(session);

    if perm.len() != n + 1 {
        return Err(PartitionError::NotBijective(format!(
            "expected {} entries, got {}",
            n + 1,
            perm.len().saturating_sub(1)
        )));
    }
    check_bijection(&perm).map_err(PartitionError::NotBijective)?;
    Ok(perm)
}

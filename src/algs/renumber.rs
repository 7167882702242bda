//! Locality-improving renumbering of a tetrahedral mesh.
//!
//! The live elements are turned into a dual graph, a box partitioner orders
//! its vertices, and elements then vertices are permuted in place so that
//! neighbouring entities end up close in memory. Phases:
//!
//! ```text
//! check inputs -> count live elements -> (too small: stop)
//!              -> build dual graph -> patch isolated vertices
//!              -> release adjacency
//!              -> partition -> permute elements -> compact vertices
//!              -> rebuild adjacency
//! ```
//!
//! Once the adjacency table has been released, every path ends with exactly
//! one call to the [`AdjacencyRebuilder`]. All scratch tables are owned
//! locals, released on every exit.

use serde::{Deserialize, Serialize};

use crate::algs::buffer::try_filled_vec;
use crate::algs::compact::{CompactionReport, compact_elements, compact_vertices};
use crate::algs::dual_graph::{
    CompactionMap, DualGraph, build_pending, compact_live_elements, resolve_degenerate,
};
use crate::algs::permute::apply_permutation;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::partitioning::{BreadthFirstBoxes, PartitionOracle, box_permutation};
use crate::timing::PhaseTimer;
use crate::topology::adjacency::{AdjacencyRebuilder, FaceHashRebuilder};
use crate::topology::mesh::{SolutionField, TetMesh};
use crate::topology::validation::check_vertex_references;

/// Tuning knobs for [`Renumberer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenumberConfig {
    /// Target number of graph vertices per box.
    pub bucket_size: usize,
    /// Meshes with fewer than `2 * min_bucket_size` live elements are left alone.
    pub min_bucket_size: usize,
    /// Growth factor of the edge buffer while the dual graph is built.
    pub edge_growth: f64,
    /// Ask the partitioner to check the graph before partitioning.
    pub check_graph: bool,
}

impl Default for RenumberConfig {
    fn default() -> Self {
        Self {
            bucket_size: 500,
            min_bucket_size: 500,
            edge_growth: 1.2,
            check_graph: cfg!(debug_assertions),
        }
    }
}

impl RenumberConfig {
    /// Use `size` both as the box size and as the minimum-size guard.
    pub fn with_bucket_size(size: usize) -> Self {
        Self {
            bucket_size: size,
            min_bucket_size: size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.bucket_size == 0 {
            return Err(MeshError::InvariantViolation(
                "bucket_size must be at least 1".into(),
            ));
        }
        if !(self.edge_growth > 1.0) {
            return Err(MeshError::InvariantViolation(format!(
                "edge_growth must exceed 1.0, got {}",
                self.edge_growth
            )));
        }
        Ok(())
    }
}

/// Result of one renumbering call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenumberOutcome {
    /// Reordered and compacted; adjacency rebuilt for the new indices.
    FullSuccess(CompactionReport),
    /// Not (fully) reordered, but the mesh is structurally valid and its
    /// adjacency is intact or rebuilt.
    SoftFailure(MeshError),
    /// The adjacency rebuild failed: the mesh has no valid adjacency.
    HardFailure(MeshError),
}

impl RenumberOutcome {
    pub fn is_full_success(&self) -> bool {
        matches!(self, Self::FullSuccess(_))
    }

    pub fn is_soft_failure(&self) -> bool {
        matches!(self, Self::SoftFailure(_))
    }

    pub fn is_hard_failure(&self) -> bool {
        matches!(self, Self::HardFailure(_))
    }

    /// The error behind a failure outcome.
    pub fn error(&self) -> Option<&MeshError> {
        match self {
            Self::FullSuccess(_) => None,
            Self::SoftFailure(e) | Self::HardFailure(e) => Some(e),
        }
    }
}

/// Drives the renumbering pipeline with a partitioner and an adjacency
/// rebuilder.
#[derive(Debug)]
pub struct Renumberer<O, R = FaceHashRebuilder> {
    config: RenumberConfig,
    oracle: O,
    rebuilder: R,
}

impl<O: PartitionOracle> Renumberer<O, FaceHashRebuilder> {
    pub fn new(config: RenumberConfig, oracle: O) -> Self {
        Self::with_rebuilder(config, oracle, FaceHashRebuilder)
    }
}

impl<O: PartitionOracle, R: AdjacencyRebuilder> Renumberer<O, R> {
    pub fn with_rebuilder(config: RenumberConfig, oracle: O, rebuilder: R) -> Self {
        Self {
            config,
            oracle,
            rebuilder,
        }
    }

    pub fn config(&self) -> &RenumberConfig {
        &self.config
    }

    pub fn into_parts(self) -> (O, R) {
        (self.oracle, self.rebuilder)
    }

    /// Renumber `mesh` (and `sol`, if given) in place.
    ///
    /// Never panics on bad input and never returns an error directly: the
    /// outcome tells the caller whether the mesh was reordered and whether
    /// its adjacency can still be trusted.
    pub fn renumber(
        &mut self,
        mesh: &mut TetMesh,
        mut sol: Option<&mut SolutionField>,
    ) -> RenumberOutcome {
        let _timer = PhaseTimer::start("renumbering");

        let checked = self
            .config
            .validate()
            .and_then(|()| check_vertex_references(mesh, sol.as_deref()));
        if let Err(e) = checked {
            log::warn!("no renumbering: {e}");
            return RenumberOutcome::SoftFailure(e);
        }

        let map = match self.size_guard(mesh) {
            Ok(map) => map,
            Err(e @ MeshError::GraphTooSmall { .. }) => {
                log::info!("no renumbering: {e}");
                return RenumberOutcome::SoftFailure(e);
            }
            Err(e) => {
                log::warn!("no renumbering: {e}");
                return RenumberOutcome::SoftFailure(e);
            }
        };
        if mesh.adja.is_none() {
            if let Err(e) = self.rebuilder.rebuild(mesh) {
                log::warn!("no renumbering, mesh has no usable adjacency: {e}");
                return RenumberOutcome::SoftFailure(e);
            }
        }

        let graph = match self.extract_graph(mesh, &map) {
            Ok(graph) => graph,
            Err(e) => {
                log::warn!("graph error, no renumbering: {e}");
                return RenumberOutcome::SoftFailure(e);
            }
        };

        // from here on the table must be rebuilt, whatever happens
        mesh.adja = None;
        let reordered = self.reorder(mesh, sol.as_deref_mut(), map, graph);
        self.conclude(mesh, reordered)
    }

    /// Rebuild the released adjacency table once and fold the result of the
    /// reordering into an outcome.
    fn conclude(
        &mut self,
        mesh: &mut TetMesh,
        reordered: Result<CompactionReport, MeshError>,
    ) -> RenumberOutcome {
        let rebuilt = {
            let _t = PhaseTimer::start("rebuild adjacency");
            self.rebuilder.rebuild(mesh)
        };

        match (reordered, rebuilt) {
            (Ok(report), Ok(())) => {
                crate::debug_invariants!(mesh.validate_invariants(), "renumbered mesh");
                log::info!(
                    "renumbered {} elements and {} vertices",
                    report.elements,
                    report.vertices
                );
                RenumberOutcome::FullSuccess(report)
            }
            (Err(e), Ok(())) => {
                log::warn!("renumbering failed, adjacency restored: {e}");
                RenumberOutcome::SoftFailure(e)
            }
            (reordered, Err(e)) => {
                if let Err(first) = reordered {
                    log::warn!("renumbering failed: {first}");
                }
                log::error!("unable to rebuild adjacency: {e}");
                RenumberOutcome::HardFailure(e)
            }
        }
    }

    /// Number the live elements and refuse meshes too small to partition.
    fn size_guard(&self, mesh: &TetMesh) -> Result<CompactionMap, MeshError> {
        let map = compact_live_elements(mesh)?;
        let min = self.config.min_bucket_size;
        if map.live == 0 || map.live < min.saturating_mul(2) {
            return Err(MeshError::GraphTooSmall {
                live: map.live,
                min_bucket_size: min,
            });
        }
        Ok(map)
    }

    fn extract_graph(&self, mesh: &TetMesh, map: &CompactionMap) -> Result<DualGraph, MeshError> {
        let _t = PhaseTimer::start("build dual graph");
        let pending = build_pending(mesh, map, self.config.edge_growth)?;
        resolve_degenerate(pending)
    }

    fn reorder(
        &mut self,
        mesh: &mut TetMesh,
        sol: Option<&mut SolutionField>,
        map: CompactionMap,
        graph: DualGraph,
    ) -> Result<CompactionReport, MeshError> {
        let perm = {
            let _t = PhaseTimer::start("box partition");
            box_permutation(
                &mut self.oracle,
                &graph,
                self.config.bucket_size,
                self.config.check_graph,
            )?
        };
        drop(graph);

        let mut element_perm = try_filled_vec(mesh.ne + 1, 0usize, "element permutation")?;
        for k in mesh.live_tetras() {
            element_perm[k] = perm[map.old_to_compact[k]];
        }
        drop(perm);
        drop(map);

        let _t = PhaseTimer::start("permute and compact");
        apply_permutation(&mut mesh.tetras[..=mesh.ne], &mut element_perm)?;
        let elements = compact_elements(mesh)?;
        let vertices = compact_vertices(mesh, sol)?;
        Ok(CompactionReport { elements, vertices })
    }
}

/// Renumber with the built-in breadth-first box partitioner and the
/// face-hash adjacency rebuilder.
pub fn renumber_mesh(
    mesh: &mut TetMesh,
    sol: Option<&mut SolutionField>,
    config: RenumberConfig,
) -> RenumberOutcome {
    Renumberer::new(config, BreadthFirstBoxes::new()).renumber(mesh, sol)
}

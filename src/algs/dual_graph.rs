//! Build a CSR (compressed-sparse-row) *dual graph* of a tetrahedral mesh.
//
// Each live element is a vertex; an edge joins two elements sharing a face,
// read straight from the mesh's face-adjacency table.
//
// Returned in 1-based, partitioner-ready CSR form:
//
// * `xadj[i] .. xadj[i+1]`   = slice of `adjncy` holding the neighbours of vertex *i*
// * `xadj[n+1]`              = edge count + 1 (sentinel)
// * `adjncy[1..=edge_count]` = concatenated neighbour vertices
//
// Index 0 of both arrays is unused.

use crate::algs::buffer::{try_filled_vec, try_grow, try_with_capacity};
use crate::mesh_error::MeshError;
use crate::topology::adjacency::decode;
use crate::topology::mesh::TetMesh;

/// 1-based CSR pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<usize>,
}

impl DualGraph {
    /// Number of graph vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.xadj.len().saturating_sub(2)
    }

    /// Number of directed edge entries.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.adjncy.len().saturating_sub(1)
    }

    /// Neighbours of vertex `v` (1-based).
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjncy[self.xadj[v]..self.xadj[v + 1]]
    }

    /// Structural check: monotone offsets, sentinel, in-range and loop-free
    /// neighbour lists.
    pub fn check(&self) -> Result<(), String> {
        let n = self.vertex_count();
        if self.xadj.len() < 2 || self.adjncy.is_empty() {
            return Err("arrays are missing their sentinel slots".into());
        }
        if self.xadj[n + 1] != self.edge_count() + 1 {
            return Err(format!(
                "sentinel offset {} does not match {} edges",
                self.xadj[n + 1],
                self.edge_count()
            ));
        }
        for v in 1..=n {
            if self.xadj[v] == 0 || self.xadj[v] > self.xadj[v + 1] {
                return Err(format!("offset of vertex {v} is not monotone"));
            }
            for &w in self.neighbors(v) {
                if w == 0 || w > n {
                    return Err(format!("vertex {v} has out-of-range neighbour {w}"));
                }
                if w == v {
                    return Err(format!("vertex {v} is its own neighbour"));
                }
            }
        }
        Ok(())
    }
}

/// Element index → compact dual-graph vertex id (0 for dead elements).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactionMap {
    pub old_to_compact: Vec<usize>,
    pub live: usize,
}

/// Number the live elements of `1..=ne` in scan order.
pub fn compact_live_elements(mesh: &TetMesh) -> Result<CompactionMap, MeshError> {
    let mut old_to_compact = try_filled_vec(mesh.ne + 1, 0usize, "element compaction map")?;
    let mut live = 0;
    for k in mesh.live_tetras() {
        live += 1;
        old_to_compact[k] = live;
    }
    Ok(CompactionMap {
        old_to_compact,
        live,
    })
}

/// Dual graph whose offsets may still be unset for isolated vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGraph {
    pub xadj: Vec<Option<usize>>,
    pub adjncy: Vec<usize>,
}

/// Emit one edge per face with a live neighbour. A vertex's offset is set
/// lazily at its first edge, so elements without live neighbours are left
/// unset for [`resolve_degenerate`].
///
/// The edge buffer starts at four entries per vertex and grows by
/// `growth` whenever it fills up.
pub fn build_pending(
    mesh: &TetMesh,
    map: &CompactionMap,
    growth: f64,
) -> Result<PendingGraph, MeshError> {
    let adja = mesh.adja.as_ref().ok_or(MeshError::MissingAdjacency)?;
    let n = map.live;

    let mut xadj = try_filled_vec(n + 2, None, "graph offsets")?;
    let mut adjncy = try_with_capacity(4 * n + 1, "graph edges")?;
    adjncy.push(0);

    for k in mesh.live_tetras() {
        let vk = map.old_to_compact[k];
        for code in adja.codes(k) {
            if code == 0 {
                continue;
            }
            let (kk, _) = decode(code);
            let vkk = map.old_to_compact.get(kk).copied().unwrap_or(0);
            if vkk == 0 {
                continue;
            }
            if xadj[vk].is_none() {
                xadj[vk] = Some(adjncy.len());
            }
            try_grow(&mut adjncy, growth, "graph edges")?;
            adjncy.push(vkk);
        }
    }
    xadj[n + 1] = Some(adjncy.len());

    log::debug!("dual graph: {} vertices, {} edge entries", n, adjncy.len() - 1);
    Ok(PendingGraph { xadj, adjncy })
}

/// Give every unset vertex the offset of its nearest set successor, i.e. an
/// empty edge slice, without moving any edge data.
///
/// Fails with `GraphStructure` when an unset vertex has no set successor up
/// to and including the last vertex.
pub fn resolve_degenerate(pending: PendingGraph) -> Result<DualGraph, MeshError> {
    let PendingGraph { xadj, adjncy } = pending;
    let n = xadj.len().saturating_sub(2);
    let mut resolved = try_filled_vec(n + 2, 0usize, "graph offsets")?;
    resolved[n + 1] = xadj[n + 1].unwrap_or(adjncy.len());

    let mut successor: Option<usize> = None;
    let mut repaired = 0usize;
    for v in (1..=n).rev() {
        match xadj[v] {
            Some(off) => {
                resolved[v] = off;
                successor = Some(off);
            }
            None => {
                let off = successor.ok_or_else(|| {
                    MeshError::GraphStructure(format!(
                        "vertex {v} has no neighbours and no successor to borrow an offset from"
                    ))
                })?;
                log::trace!("isolated dual vertex {v} takes offset {off}");
                resolved[v] = off;
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        log::debug!("patched {repaired} isolated dual-graph vertices");
    }
    Ok(DualGraph {
        xadj: resolved,
        adjncy,
    })
}

/// Compaction map plus well-formed dual graph of the live elements.
pub fn build_dual(mesh: &TetMesh, growth: f64) -> Result<(CompactionMap, DualGraph), MeshError> {
    let map = compact_live_elements(mesh)?;
    let pending = build_pending(mesh, &map, growth)?;
    let graph = resolve_degenerate(pending)?;
    Ok((map, graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::adjacency::{AdjacencyRebuilder, FaceHashRebuilder};

    // three tetrahedra in a row sharing faces 1|2 and 2|3
    fn strip() -> TetMesh {
        let mut mesh = TetMesh::with_capacity(6, 4);
        for c in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [2.0, 1.0, 1.0],
        ] {
            mesh.new_point(c).unwrap();
        }
        mesh.new_tetra([1, 2, 3, 4]).unwrap();
        mesh.new_tetra([5, 2, 4, 3]).unwrap();
        mesh.new_tetra([6, 5, 2, 4]).unwrap();
        FaceHashRebuilder.rebuild(&mut mesh).unwrap();
        mesh
    }

    #[test]
    fn strip_graph_is_a_path() {
        let mesh = strip();
        let (map, dg) = build_dual(&mesh, 1.2).unwrap();
        assert_eq!(map.live, 3);
        assert_eq!(dg.vertex_count(), 3);
        assert_eq!(dg.neighbors(1), &[2]);
        let mut mid = dg.neighbors(2).to_vec();
        mid.sort_unstable();
        assert_eq!(mid, vec![1, 3]);
        assert_eq!(dg.neighbors(3), &[2]);
        assert_eq!(dg.xadj[4], dg.edge_count() + 1);
        dg.check().unwrap();
    }

    #[test]
    fn dead_elements_are_skipped_in_compaction() {
        let mut mesh = strip();
        mesh.delete_tetra(2);
        let map = compact_live_elements(&mesh).unwrap();
        assert_eq!(map.old_to_compact, vec![0, 1, 0, 2]);
        assert_eq!(map.live, 2);
    }

    #[test]
    fn isolated_vertex_borrows_successor_offset() {
        let pending = PendingGraph {
            xadj: vec![None, Some(1), None, None, Some(2), Some(3)],
            adjncy: vec![0, 4, 1],
        };
        let dg = resolve_degenerate(pending).unwrap();
        assert_eq!(dg.xadj, vec![0, 1, 2, 2, 2, 3]);
        assert!(dg.neighbors(2).is_empty());
        assert!(dg.neighbors(3).is_empty());
    }

    #[test]
    fn run_of_isolated_vertices_may_borrow_from_the_last_vertex() {
        // vertices 2..=4 are isolated, the nearest set successor is the last one
        let pending = PendingGraph {
            xadj: vec![None, Some(1), None, None, None, Some(2), Some(3)],
            adjncy: vec![0, 5, 1],
        };
        let dg = resolve_degenerate(pending).unwrap();
        assert_eq!(dg.xadj, vec![0, 1, 2, 2, 2, 2, 3]);
        dg.check().unwrap();
    }

    #[test]
    fn isolated_last_vertex_is_a_structure_error() {
        let pending = PendingGraph {
            xadj: vec![None, Some(1), None, Some(1)],
            adjncy: vec![0],
        };
        assert!(matches!(
            resolve_degenerate(pending),
            Err(MeshError::GraphStructure(_))
        ));
    }

    #[test]
    fn missing_adjacency_is_reported() {
        let mut mesh = strip();
        mesh.adja = None;
        assert_eq!(build_dual(&mesh, 1.2), Err(MeshError::MissingAdjacency));
    }

    #[test]
    fn tiny_growth_factor_still_makes_progress() {
        let mesh = strip();
        let (_, dg) = build_dual(&mesh, 1.0).unwrap();
        assert_eq!(dg.edge_count(), 4);
    }

    #[test]
    fn check_rejects_self_loops() {
        let dg = DualGraph {
            xadj: vec![0, 1, 2, 3],
            adjncy: vec![0, 1, 1],
        };
        assert!(dg.check().is_err());
    }
}

//! Compaction after elements have been permuted into their new order.
//!
//! Vertices are renumbered in first-seen order of a scan over the live
//! elements, then prisms, then quadrilaterals. Vertices tagged unused, or not
//! referenced at all, get no new id and end up past the new vertex bound.
//! Both nil chains are rethreaded behind the live ranges.

use crate::algs::buffer::try_filled_vec;
use crate::algs::permute::apply_permutation_with;
use crate::mesh_error::MeshError;
use crate::topology::mesh::{SolutionField, TetMesh};
use crate::topology::validation::check_vertex_references;

/// Old vertex index → new vertex index (0 = dropped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRenumbering {
    pub old_to_new: Vec<usize>,
    pub assigned: usize,
}

/// Live counts after compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompactionReport {
    pub elements: usize,
    pub vertices: usize,
}

/// Set `ne` to the number of live elements and rethread the element nil
/// chain. Live elements must already occupy `1..=live`.
pub fn compact_elements(mesh: &mut TetMesh) -> Result<usize, MeshError> {
    let live = mesh.live_tetra_count();
    if let Some(k) = (1..=live).find(|&k| !mesh.tetras[k].is_live()) {
        return Err(MeshError::InvariantViolation(format!(
            "element slot {k} is dead but {live} live elements precede the bound"
        )));
    }
    mesh.ne = live;
    mesh.thread_element_free_list();
    Ok(live)
}

/// First-seen numbering of the vertices referenced by live entities.
pub fn vertex_renumbering(mesh: &TetMesh) -> Result<VertexRenumbering, MeshError> {
    let mut old_to_new = try_filled_vec(mesh.np + 1, 0usize, "vertex renumbering")?;
    let mut assigned = 0;
    let mut visit = |ip: usize| {
        if ip != 0 && ip <= mesh.np && old_to_new[ip] == 0 && !mesh.points[ip].is_unused() {
            assigned += 1;
            old_to_new[ip] = assigned;
        }
    };

    for k in mesh.live_tetras() {
        mesh.tetras[k].v.iter().for_each(|&ip| visit(ip));
    }
    for pp in mesh.prisms[1..].iter().filter(|pp| pp.v[0] != 0) {
        pp.v.iter().for_each(|&ip| visit(ip));
    }
    for pq in mesh.quads[1..].iter().filter(|pq| pq.v[0] != 0) {
        pq.v.iter().for_each(|&ip| visit(ip));
    }

    Ok(VertexRenumbering {
        old_to_new,
        assigned,
    })
}

/// Rewrite every vertex field of every live element, prism and quad.
pub fn relabel_vertices(mesh: &mut TetMesh, renumbering: &VertexRenumbering) {
    let map = &renumbering.old_to_new;
    let relabel = |v: &mut [usize]| v.iter_mut().for_each(|ip| *ip = map[*ip]);

    let ne = mesh.ne;
    for pt in mesh.tetras[1..=ne].iter_mut().filter(|pt| pt.is_live()) {
        relabel(&mut pt.v[..]);
    }
    for pp in mesh.prisms[1..].iter_mut().filter(|pp| pp.v[0] != 0) {
        relabel(&mut pp.v[..]);
    }
    for pq in mesh.quads[1..].iter_mut().filter(|pq| pq.v[0] != 0) {
        relabel(&mut pq.v[..]);
    }
}

/// Move vertex records (and their solution payloads) to their new slots.
pub fn permute_vertices(
    mesh: &mut TetMesh,
    mut sol: Option<&mut SolutionField>,
    renumbering: VertexRenumbering,
) -> Result<(), MeshError> {
    let VertexRenumbering {
        old_to_new: mut perm,
        ..
    } = renumbering;
    let points = &mut mesh.points;
    apply_permutation_with(&mut perm, |a, b| {
        points.swap(a, b);
        if let Some(sol) = sol.as_deref_mut() {
            sol.swap_vertices(a, b);
        }
    })
}

/// Renumber, relabel and move vertices, then update `np` and the vertex nil
/// chain. Returns the new vertex count.
pub fn compact_vertices(
    mesh: &mut TetMesh,
    sol: Option<&mut SolutionField>,
) -> Result<usize, MeshError> {
    let renumbering = vertex_renumbering(mesh)?;
    let assigned = renumbering.assigned;
    relabel_vertices(mesh, &renumbering);
    permute_vertices(mesh, sol, renumbering)?;
    mesh.np = assigned;
    mesh.thread_point_free_list();
    Ok(assigned)
}

/// Full compaction of a mesh whose live elements are already contiguous.
pub fn compact(
    mesh: &mut TetMesh,
    sol: Option<&mut SolutionField>,
) -> Result<CompactionReport, MeshError> {
    check_vertex_references(mesh, sol.as_deref())?;
    let elements = compact_elements(mesh)?;
    let vertices = compact_vertices(mesh, sol)?;
    Ok(CompactionReport { elements, vertices })
}

//! Structural validation of a `TetMesh`.
//!
//! [`check_vertex_references`] is the cheap precondition the renumbering
//! pipeline runs before touching a mesh. The [`DebugInvariants`] impl walks
//! everything: references, free lists and adjacency symmetry.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::adjacency::{AdjacencyTable, encode};
use crate::topology::mesh::{SolutionField, TetMesh};

fn check_refs(
    mesh: &TetMesh,
    entity: &'static str,
    index: usize,
    v: &[usize],
) -> Result<(), MeshError> {
    match v
        .iter()
        .find(|&&ip| ip == 0 || ip > mesh.np || mesh.points[ip].is_unused())
    {
        Some(&vertex) => Err(MeshError::DanglingVertexReference {
            entity,
            index,
            vertex,
        }),
        None => Ok(()),
    }
}

/// Array lengths must match the declared capacities, live bounds must fit
/// inside them, and an adjacency table must cover every element slot up to
/// `ne`.
pub fn check_storage(mesh: &TetMesh) -> Result<(), MeshError> {
    if mesh.points.len() != mesh.npmax + 1 || mesh.tetras.len() != mesh.nemax + 1 {
        return Err(MeshError::InvariantViolation(format!(
            "storage holds {} points and {} elements, capacities are {} / {}",
            mesh.points.len().saturating_sub(1),
            mesh.tetras.len().saturating_sub(1),
            mesh.npmax,
            mesh.nemax
        )));
    }
    if mesh.prisms.is_empty() || mesh.quads.is_empty() {
        return Err(MeshError::InvariantViolation(
            "prism and quadrilateral arrays lack their sentinel slot".into(),
        ));
    }
    if mesh.ne > mesh.nemax || mesh.np > mesh.npmax {
        return Err(MeshError::InvariantViolation(format!(
            "bounds ne={} np={} exceed capacities {} / {}",
            mesh.ne, mesh.np, mesh.nemax, mesh.npmax
        )));
    }
    if let Some(adja) = mesh.adja.as_ref() {
        if adja.capacity() < mesh.ne {
            return Err(MeshError::InvariantViolation(format!(
                "adjacency covers {} elements, mesh has {}",
                adja.capacity(),
                mesh.ne
            )));
        }
    }
    Ok(())
}

/// Every live element, prism and quad must reference in-range vertices that
/// are not tagged unused; a solution field must cover every vertex slot.
///
/// Runs [`check_storage`] first, so a mesh that passes can be indexed
/// without bounds failures.
pub fn check_vertex_references(
    mesh: &TetMesh,
    sol: Option<&SolutionField>,
) -> Result<(), MeshError> {
    check_storage(mesh)?;
    for k in mesh.live_tetras() {
        check_refs(mesh, "element", k, &mesh.tetras[k].v)?;
    }
    for (k, pp) in mesh.prisms.iter().enumerate().skip(1) {
        if pp.v[0] != 0 {
            check_refs(mesh, "prism", k, &pp.v)?;
        }
    }
    for (k, pq) in mesh.quads.iter().enumerate().skip(1) {
        if pq.v[0] != 0 {
            check_refs(mesh, "quadrilateral", k, &pq.v)?;
        }
    }
    if let Some(sol) = sol {
        if sol.slots() <= mesh.np {
            return Err(MeshError::InvariantViolation(format!(
                "solution covers {} vertex slots, mesh uses {}",
                sol.slots(),
                mesh.np
            )));
        }
    }
    Ok(())
}

/// Symmetry of the face adjacency: if `k` sees `kk` across a face, `kk`
/// sees `k` back across the matching face.
pub fn check_adjacency_symmetry(mesh: &TetMesh, adja: &AdjacencyTable) -> Result<(), MeshError> {
    if adja.capacity() < mesh.ne {
        return Err(MeshError::InvariantViolation(format!(
            "adjacency covers {} elements, mesh has {}",
            adja.capacity(),
            mesh.ne
        )));
    }
    for k in mesh.live_tetras() {
        for face in 0..4 {
            let Some((kk, ff)) = adja.neighbor(k, face) else {
                continue;
            };
            if kk == 0 || kk > mesh.ne || !mesh.tetras[kk].is_live() {
                return Err(MeshError::InvariantViolation(format!(
                    "face {face} of element {k} points at dead element {kk}"
                )));
            }
            if adja.codes(kk)[ff] != encode(k, face) {
                return Err(MeshError::InvariantViolation(format!(
                    "face {face} of element {k} sees ({kk}, {ff}) but not the reverse"
                )));
            }
        }
    }
    Ok(())
}

/// Walk a nil chain from `head`, requiring every visited slot to be free and
/// the chain to end (at 0) within `capacity` steps.
fn check_chain(
    what: &str,
    head: usize,
    capacity: usize,
    is_free: impl Fn(usize) -> bool,
    next: impl Fn(usize) -> usize,
) -> Result<(), MeshError> {
    let mut cur = head;
    let mut steps = 0;
    while cur != 0 {
        if cur > capacity || !is_free(cur) {
            return Err(MeshError::InvariantViolation(format!(
                "{what} free list reaches slot {cur}, which is not free"
            )));
        }
        steps += 1;
        if steps > capacity {
            return Err(MeshError::InvariantViolation(format!(
                "{what} free list does not terminate"
            )));
        }
        cur = next(cur);
    }
    Ok(())
}

impl DebugInvariants for TetMesh {
    fn validate_invariants(&self) -> Result<(), MeshError> {
        check_vertex_references(self, None)?;
        check_chain(
            "element",
            self.nenil,
            self.nemax,
            |k| !self.tetras[k].is_live(),
            |k| self.tetras[k].v[3],
        )?;
        check_chain(
            "vertex",
            self.npnil,
            self.npmax,
            |ip| self.points[ip].is_unused(),
            |ip| self.points[ip].tmp,
        )?;
        if let Some(adja) = self.adja.as_ref() {
            check_adjacency_symmetry(self, adja)?;
        }
        Ok(())
    }
}

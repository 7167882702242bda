//! Element-to-element face adjacency.
//!
//! Face `i` of a tetrahedron is the face opposite its vertex `i`. For every
//! element `k` and face `i` the table stores a *neighbour code*
//! `4 * kk + ii`, where `kk` is the adjacent element and `ii` its local id of
//! the shared face, or 0 when the face is on the boundary.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::algs::buffer::try_filled_vec;
use crate::mesh_error::MeshError;
use crate::topology::mesh::TetMesh;

/// Local vertex ids of each face, face `i` being opposite vertex `i`.
pub const FACE_VERTICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// Pack an element index and local face id into a neighbour code.
#[inline]
pub const fn encode(element: usize, face: usize) -> usize {
    4 * element + face
}

/// Split a non-zero neighbour code into `(element, face)`.
#[inline]
pub const fn decode(code: usize) -> (usize, usize) {
    (code / 4, code % 4)
}

/// Neighbour codes for every element slot, indexed 1-based.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacencyTable {
    codes: Vec<[usize; 4]>,
}

impl AdjacencyTable {
    /// An all-boundary table covering elements `1..=nemax`.
    pub fn new(nemax: usize) -> Self {
        Self {
            codes: vec![[0; 4]; nemax + 1],
        }
    }

    /// Fallible variant of [`AdjacencyTable::new`].
    pub fn try_new(nemax: usize) -> Result<Self, MeshError> {
        Ok(Self {
            codes: try_filled_vec(nemax + 1, [0; 4], "adjacency table")?,
        })
    }

    /// Raw neighbour codes of element `k`.
    #[inline]
    pub fn codes(&self, k: usize) -> [usize; 4] {
        self.codes[k]
    }

    /// Neighbour across face `face` of `k`, as `(element, face)`.
    #[inline]
    pub fn neighbor(&self, k: usize, face: usize) -> Option<(usize, usize)> {
        match self.codes[k][face] {
            0 => None,
            code => Some(decode(code)),
        }
    }

    #[inline]
    pub fn set(&mut self, k: usize, face: usize, code: usize) {
        self.codes[k][face] = code;
    }

    /// Record that face `fa` of `a` and face `fb` of `b` are shared.
    pub fn link(&mut self, a: usize, fa: usize, b: usize, fb: usize) {
        self.codes[a][fa] = encode(b, fb);
        self.codes[b][fb] = encode(a, fa);
    }

    /// Mark every face of `k` as boundary without touching its neighbours.
    pub fn clear(&mut self, k: usize) {
        self.codes[k] = [0; 4];
    }

    /// Remove `k` from the table, turning the faces of its neighbours that
    /// pointed at it into boundary faces.
    pub fn detach(&mut self, k: usize) {
        for face in 0..4 {
            if let Some((kk, ff)) = self.neighbor(k, face) {
                if self.codes[kk][ff] == encode(k, face) {
                    self.codes[kk][ff] = 0;
                }
            }
        }
        self.clear(k);
    }

    /// Number of element slots covered (excluding the sentinel).
    pub fn capacity(&self) -> usize {
        self.codes.len() - 1
    }
}

/// Regenerates the face-adjacency table of a mesh from its element records.
///
/// The renumbering pipeline releases the table before partitioning and calls
/// the rebuilder exactly once on every path that leaves it absent.
pub trait AdjacencyRebuilder {
    /// Rebuild `mesh.adja` from scratch.
    fn rebuild(&mut self, mesh: &mut TetMesh) -> Result<(), MeshError>;
}

impl<F> AdjacencyRebuilder for F
where
    F: FnMut(&mut TetMesh) -> Result<(), MeshError>,
{
    fn rebuild(&mut self, mesh: &mut TetMesh) -> Result<(), MeshError> {
        self(mesh)
    }
}

/// Hash-based rebuilder: matches faces through their sorted vertex triples.
///
/// Fails on a face shared by more than two elements, and on any vertex
/// reference outside `1..=np`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FaceHashRebuilder;

impl AdjacencyRebuilder for FaceHashRebuilder {
    fn rebuild(&mut self, mesh: &mut TetMesh) -> Result<(), MeshError> {
        let mut table = AdjacencyTable::try_new(mesh.nemax)?;
        // sorted face -> (element, face, already matched)
        let mut open: HashMap<[usize; 3], (usize, usize, bool)> =
            HashMap::with_capacity(2 * mesh.ne);

        for k in mesh.live_tetras() {
            let v = mesh.tetras[k].v;
            if let Some(&bad) = v.iter().find(|&&ip| ip == 0 || ip > mesh.np) {
                return Err(MeshError::Rebuild(format!(
                    "element {k} references vertex {bad} outside 1..={}",
                    mesh.np
                )));
            }
            for (face, local) in FACE_VERTICES.iter().enumerate() {
                let mut key = [v[local[0]], v[local[1]], v[local[2]]];
                key.sort_unstable();
                match open.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert((k, face, false));
                    }
                    Entry::Occupied(mut slot) => {
                        let (kk, ff, matched) = slot.get_mut();
                        if *matched {
                            return Err(MeshError::Rebuild(format!(
                                "non-manifold face {key:?} shared by elements {kk}, {k} and more"
                            )));
                        }
                        *matched = true;
                        table.link(k, face, *kk, *ff);
                    }
                }
            }
        }

        log::trace!(
            "rebuilt adjacency for {} elements ({} distinct faces)",
            mesh.ne,
            open.len()
        );
        mesh.adja = Some(table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tets() -> TetMesh {
        let mut mesh = TetMesh::with_capacity(5, 4);
        for c in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ] {
            mesh.new_point(c).unwrap();
        }
        mesh.new_tetra([1, 2, 3, 4]).unwrap();
        mesh.new_tetra([5, 2, 4, 3]).unwrap();
        mesh
    }

    #[test]
    fn codes_round_trip() {
        assert_eq!(decode(encode(17, 3)), (17, 3));
        assert_eq!(encode(1, 0), 4);
    }

    #[test]
    fn shared_face_is_linked_both_ways() {
        let mut mesh = two_tets();
        FaceHashRebuilder.rebuild(&mut mesh).unwrap();
        let adja = mesh.adja.as_ref().unwrap();
        // face 0 of element 1 is {2,3,4}, face 0 of element 2 is {2,4,3}
        assert_eq!(adja.neighbor(1, 0), Some((2, 0)));
        assert_eq!(adja.neighbor(2, 0), Some((1, 0)));
        assert_eq!(adja.neighbor(1, 1), None);
    }

    #[test]
    fn detach_clears_back_links() {
        let mut mesh = two_tets();
        FaceHashRebuilder.rebuild(&mut mesh).unwrap();
        mesh.delete_tetra(2);
        let adja = mesh.adja.as_ref().unwrap();
        assert_eq!(adja.codes(1), [0; 4]);
        assert_eq!(adja.codes(2), [0; 4]);
    }

    #[test]
    fn third_element_on_a_face_is_rejected() {
        let mut mesh = two_tets();
        let ip = mesh.new_point([-1.0, 1.0, 1.0]).unwrap();
        mesh.new_tetra([ip, 2, 3, 4]).unwrap();
        let err = FaceHashRebuilder.rebuild(&mut mesh).unwrap_err();
        assert!(matches!(err, MeshError::Rebuild(_)));
    }

    #[test]
    fn out_of_range_vertex_is_rejected() {
        let mut mesh = two_tets();
        mesh.tetras[2].v[1] = 99;
        assert!(matches!(
            FaceHashRebuilder.rebuild(&mut mesh),
            Err(MeshError::Rebuild(_))
        ));
    }

    #[test]
    fn closures_act_as_rebuilders() {
        let mut mesh = two_tets();
        let mut calls = 0;
        let mut failing = |_: &mut TetMesh| -> Result<(), MeshError> {
            calls += 1;
            Err(MeshError::Rebuild("disk on fire".into()))
        };
        assert!(failing.rebuild(&mut mesh).is_err());
        assert_eq!(calls, 1);
    }
}

//! `TetMesh`: arena storage for a tetrahedral mesh
//!
//! Every entity lives in a contiguous `Vec` and is referred to only by its
//! integer index. Indices are 1-based; slot 0 of every array is a sentinel
//! that is never live, so a zero vertex reference always means "none".
//!
//! Dead element and vertex slots form singly linked free lists (nil chains):
//! a dead tetrahedron stores the next free slot in `v[3]`, a dead point in
//! `tmp`. A chain ends at index 0.

use bytemuck::{Pod, Zeroable};

use crate::mesh_error::MeshError;
use crate::topology::adjacency::AdjacencyTable;

/// Point tag bit: the vertex is unused and must not be referenced.
pub const TAG_UNUSED: u32 = 1 << 0;
/// Point tag bit: the vertex lies on the boundary.
pub const TAG_BOUNDARY: u32 = 1 << 1;

/// A mesh vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Point {
    /// Coordinates.
    pub c: [f64; 3],
    /// Scratch word; holds the next free slot while the point is dead.
    pub tmp: usize,
    /// User reference (material / boundary id).
    pub ref_id: u32,
    /// Tag bits (`TAG_*`).
    pub tag: u32,
}

impl Point {
    #[inline]
    pub fn new(c: [f64; 3]) -> Self {
        Self {
            c,
            ..Self::zeroed()
        }
    }

    /// True if the point is tagged unused.
    #[inline]
    pub fn is_unused(&self) -> bool {
        self.tag & TAG_UNUSED != 0
    }

    /// A free-list slot linking to `next`.
    #[inline]
    pub fn free_slot(next: usize) -> Self {
        Self {
            tmp: next,
            tag: TAG_UNUSED,
            ..Self::zeroed()
        }
    }
}

/// A tetrahedron. Live iff `v[0] != 0`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Tetra {
    pub v: [usize; 4],
    pub ref_id: u32,
    pub tag: u32,
}

impl Tetra {
    #[inline]
    pub fn new(v: [usize; 4]) -> Self {
        Self {
            v,
            ..Self::zeroed()
        }
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.v[0] != 0
    }

    /// A dead slot linking to `next` through `v[3]`.
    #[inline]
    pub fn free_slot(next: usize) -> Self {
        Self {
            v: [0, 0, 0, next],
            ..Self::zeroed()
        }
    }
}

/// A prism (wedge). Live iff `v[0] != 0`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Prism {
    pub v: [usize; 6],
    pub ref_id: u32,
    pub tag: u32,
}

/// A boundary quadrilateral. Live iff `v[0] != 0`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Quad {
    pub v: [usize; 4],
    pub ref_id: u32,
    pub tag: u32,
}

/// Per-vertex solution payload stored in parallel with `TetMesh::points`.
///
/// Vertex `i` owns `values[size * i .. size * (i + 1)]`; slot 0 is unused.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolutionField {
    size: usize,
    values: Vec<f64>,
}

impl SolutionField {
    /// A zero-filled field with `size` scalars for each of `npmax` vertices.
    pub fn new(size: usize, npmax: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * (npmax + 1)],
        }
    }

    /// Number of scalars per vertex.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of vertex slots (including the sentinel) the field covers.
    pub fn slots(&self) -> usize {
        if self.size == 0 {
            usize::MAX
        } else {
            self.values.len() / self.size
        }
    }

    pub fn get(&self, vertex: usize) -> &[f64] {
        &self.values[self.size * vertex..self.size * (vertex + 1)]
    }

    pub fn get_mut(&mut self, vertex: usize) -> &mut [f64] {
        &mut self.values[self.size * vertex..self.size * (vertex + 1)]
    }

    /// Exchange the whole payloads of two vertices.
    pub fn swap_vertices(&mut self, a: usize, b: usize) {
        if a == b || self.size == 0 {
            return;
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.values.split_at_mut(self.size * hi);
        head[self.size * lo..self.size * (lo + 1)].swap_with_slice(&mut tail[..self.size]);
    }
}

/// Tetrahedral mesh with optional prisms, quadrilaterals and face adjacency.
#[derive(Clone, Debug, PartialEq)]
pub struct TetMesh {
    /// Vertices; `points.len() == npmax + 1`.
    pub points: Vec<Point>,
    /// Tetrahedra; `tetras.len() == nemax + 1`.
    pub tetras: Vec<Tetra>,
    /// Prisms, slot 0 unused.
    pub prisms: Vec<Prism>,
    /// Quadrilaterals, slot 0 unused.
    pub quads: Vec<Quad>,
    /// Highest used vertex index.
    pub np: usize,
    /// Highest used element index.
    pub ne: usize,
    /// Vertex capacity.
    pub npmax: usize,
    /// Element capacity.
    pub nemax: usize,
    /// Head of the vertex free list (0 when full).
    pub npnil: usize,
    /// Head of the element free list (0 when full).
    pub nenil: usize,
    /// Face adjacency; `None` while released.
    pub adja: Option<AdjacencyTable>,
}

impl TetMesh {
    /// An empty mesh able to hold `npmax` vertices and `nemax` tetrahedra.
    pub fn with_capacity(npmax: usize, nemax: usize) -> Self {
        let mut mesh = Self {
            points: vec![Point::zeroed(); npmax + 1],
            tetras: vec![Tetra::zeroed(); nemax + 1],
            prisms: vec![Prism::zeroed()],
            quads: vec![Quad::zeroed()],
            np: 0,
            ne: 0,
            npmax,
            nemax,
            npnil: 0,
            nenil: 0,
            adja: None,
        };
        mesh.thread_point_free_list();
        mesh.thread_element_free_list();
        mesh
    }

    #[inline]
    pub fn nprism(&self) -> usize {
        self.prisms.len() - 1
    }

    #[inline]
    pub fn nquad(&self) -> usize {
        self.quads.len() - 1
    }

    /// Iterator over the indices of live tetrahedra in `1..=ne`.
    pub fn live_tetras(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.ne).filter(move |&k| self.tetras[k].is_live())
    }

    /// Number of live tetrahedra.
    pub fn live_tetra_count(&self) -> usize {
        self.live_tetras().count()
    }

    /// Take a vertex slot from the free list.
    pub fn new_point(&mut self, c: [f64; 3]) -> Result<usize, MeshError> {
        let ip = self.npnil;
        if ip == 0 {
            return Err(MeshError::CapacityExhausted("vertex"));
        }
        self.npnil = self.points[ip].tmp;
        self.points[ip] = Point::new(c);
        self.np = self.np.max(ip);
        Ok(ip)
    }

    /// Return a vertex slot to the free list.
    pub fn delete_point(&mut self, ip: usize) {
        self.points[ip] = Point::free_slot(self.npnil);
        self.npnil = ip;
        while self.np > 0 && self.points[self.np].is_unused() {
            self.np -= 1;
        }
    }

    /// Take an element slot from the free list.
    pub fn new_tetra(&mut self, v: [usize; 4]) -> Result<usize, MeshError> {
        let k = self.nenil;
        if k == 0 {
            return Err(MeshError::CapacityExhausted("element"));
        }
        self.nenil = self.tetras[k].v[3];
        self.tetras[k] = Tetra::new(v);
        self.ne = self.ne.max(k);
        if let Some(adja) = self.adja.as_mut() {
            adja.clear(k);
        }
        Ok(k)
    }

    /// Kill element `k`, detach it from its neighbours and push it on the
    /// free list.
    pub fn delete_tetra(&mut self, k: usize) {
        if let Some(adja) = self.adja.as_mut() {
            adja.detach(k);
        }
        self.tetras[k] = Tetra::free_slot(self.nenil);
        self.nenil = k;
        while self.ne > 0 && !self.tetras[self.ne].is_live() {
            self.ne -= 1;
        }
    }

    pub fn add_prism(&mut self, v: [usize; 6]) -> usize {
        self.prisms.push(Prism {
            v,
            ..Prism::zeroed()
        });
        self.nprism()
    }

    pub fn add_quad(&mut self, v: [usize; 4]) -> usize {
        self.quads.push(Quad {
            v,
            ..Quad::zeroed()
        });
        self.nquad()
    }

    /// Rebuild the element nil chain so that it covers `ne + 1 ..= nemax`.
    pub(crate) fn thread_element_free_list(&mut self) {
        self.nenil = if self.ne == self.nemax { 0 } else { self.ne + 1 };
        if self.nenil != 0 {
            for k in self.nenil..self.nemax {
                self.tetras[k] = Tetra::free_slot(k + 1);
            }
            self.tetras[self.nemax] = Tetra::free_slot(0);
        }
    }

    /// Rebuild the vertex nil chain so that it covers `np + 1 ..= npmax`.
    pub(crate) fn thread_point_free_list(&mut self) {
        self.npnil = if self.np == self.npmax { 0 } else { self.np + 1 };
        if self.npnil != 0 {
            for k in self.npnil..self.npmax {
                self.points[k] = Point::free_slot(k + 1);
            }
            self.points[self.npmax] = Point::free_slot(0);
        }
    }
}

#[cfg(test)]
mod layout_tests {
    //! Records are swapped whole; keep them plain old data.
    use super::*;
    use static_assertions::{assert_eq_size, assert_impl_all};

    assert_eq_size!(Tetra, [u8; 4 * std::mem::size_of::<usize>() + 8]);
    assert_eq_size!(Quad, Tetra);
    assert_impl_all!(Point: Pod, Copy);
    assert_impl_all!(Prism: Pod, Copy);
}

//! Structured tetrahedral box meshes, used by tests and benchmarks.

use crate::mesh_error::MeshError;
use crate::topology::adjacency::{AdjacencyRebuilder, FaceHashRebuilder};
use crate::topology::mesh::TetMesh;

/// Extra capacity reserved beyond what the box needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TetBoxOptions {
    pub spare_vertices: usize,
    pub spare_elements: usize,
    /// Leave `mesh.adja` empty instead of building it.
    pub skip_adjacency: bool,
}

// Kuhn split: one tetrahedron per ordering of the axes, all sharing the
// main diagonal. Neighbouring cubes agree on their shared faces.
const AXIS_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

fn signed_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let w = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
    u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
        + u[2] * (v[0] * w[1] - v[1] * w[0])
}

/// Generate a box over `[min, max]` with `nx`×`ny`×`nz` cubes, each split into
/// six positively oriented tetrahedra. Vertices are numbered lexicographically
/// (x fastest), elements cube by cube.
pub fn tet_box(
    nx: usize,
    ny: usize,
    nz: usize,
    min: [f64; 3],
    max: [f64; 3],
    options: TetBoxOptions,
) -> Result<TetMesh, MeshError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(MeshError::InvariantViolation(
            "nx, ny, and nz must be positive".into(),
        ));
    }
    let n = [nx, ny, nz];
    let nv = (nx + 1) * (ny + 1) * (nz + 1);
    let nt = 6 * nx * ny * nz;
    let mut mesh = TetMesh::with_capacity(nv + options.spare_vertices, nt + options.spare_elements);

    let h: [f64; 3] = std::array::from_fn(|d| (max[d] - min[d]) / n[d] as f64);
    for k in 0..=nz {
        for j in 0..=ny {
            for i in 0..=nx {
                let ijk = [i, j, k];
                mesh.new_point(std::array::from_fn(|d| min[d] + h[d] * ijk[d] as f64))?;
            }
        }
    }

    let stride = [1, nx + 1, (nx + 1) * (ny + 1)];
    let index = |ijk: [usize; 3]| 1 + ijk[0] * stride[0] + ijk[1] * stride[1] + ijk[2] * stride[2];
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for order in AXIS_ORDERS {
                    let mut corner = [i, j, k];
                    let mut v = [index(corner), 0, 0, 0];
                    for (step, &axis) in order.iter().enumerate() {
                        corner[axis] += 1;
                        v[step + 1] = index(corner);
                    }
                    let c = v.map(|ip| mesh.points[ip].c);
                    if signed_volume(c[0], c[1], c[2], c[3]) < 0.0 {
                        v.swap(2, 3);
                    }
                    mesh.new_tetra(v)?;
                }
            }
        }
    }

    if !options.skip_adjacency {
        FaceHashRebuilder.rebuild(&mut mesh)?;
    }
    log::debug!("generated tet box: {} vertices, {} elements", mesh.np, mesh.ne);
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_invariants::DebugInvariants;

    #[test]
    fn single_cube_has_six_positive_tets() {
        let mesh = tet_box(1, 1, 1, [0.0; 3], [1.0; 3], TetBoxOptions::default()).unwrap();
        assert_eq!((mesh.np, mesh.ne), (8, 6));
        let mut total = 0.0;
        for k in mesh.live_tetras() {
            let c = mesh.tetras[k].v.map(|ip| mesh.points[ip].c);
            let vol = signed_volume(c[0], c[1], c[2], c[3]);
            assert!(vol > 0.0);
            total += vol / 6.0;
        }
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn interior_faces_are_matched() {
        let mesh = tet_box(2, 2, 2, [0.0; 3], [1.0; 3], TetBoxOptions::default()).unwrap();
        mesh.validate_invariants().unwrap();
        let adja = mesh.adja.as_ref().unwrap();
        let boundary = mesh
            .live_tetras()
            .flat_map(|k| (0..4).map(move |f| (k, f)))
            .filter(|&(k, f)| adja.neighbor(k, f).is_none())
            .count();
        // two triangles per boundary square
        assert_eq!(boundary, 6 * 4 * 2);
    }

    #[test]
    fn spare_capacity_stays_on_free_lists() {
        let opts = TetBoxOptions {
            spare_vertices: 3,
            spare_elements: 5,
            skip_adjacency: true,
        };
        let mesh = tet_box(1, 1, 2, [0.0; 3], [1.0, 1.0, 2.0], opts).unwrap();
        assert_eq!((mesh.npnil, mesh.nenil), (13, 13));
        assert!(mesh.adja.is_none());
    }

    #[test]
    fn empty_box_is_rejected() {
        assert!(tet_box(0, 1, 1, [0.0; 3], [1.0; 3], TetBoxOptions::default()).is_err());
    }
}

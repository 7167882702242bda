mod util;

use tet_renumber::prelude::*;
use tet_renumber::topology::adjacency::encode;
use tet_renumber::topology::validation::check_adjacency_symmetry;
use util::*;

#[test]
fn rebuild_matches_generated_table() {
    let mut mesh = box_mesh(3, 3, 2, 2);
    let generated = mesh.adja.clone().unwrap();
    mesh.adja = None;
    FaceHashRebuilder.rebuild(&mut mesh).unwrap();
    assert_eq!(mesh.adja.as_ref(), Some(&generated));
    assert_eq!(generated.capacity(), mesh.nemax);
}

#[test]
fn rebuild_after_scramble_is_symmetric() {
    let mut mesh = box_mesh(3, 3, 3, 0);
    scramble(&mut mesh, 42);
    let adja = mesh.adja.as_ref().unwrap();
    check_adjacency_symmetry(&mesh, adja).unwrap();
}

#[test]
fn deleted_element_leaves_boundary_faces() {
    let mut mesh = box_mesh(2, 2, 2, 0);
    let adja = mesh.adja.clone().unwrap();
    let neighbours: Vec<(usize, usize)> = (0..4).filter_map(|f| adja.neighbor(20, f)).collect();
    assert!(!neighbours.is_empty());

    mesh.delete_tetra(20);
    let adja = mesh.adja.as_ref().unwrap();
    for (kk, ff) in neighbours {
        assert_eq!(adja.neighbor(kk, ff), None);
    }
    assert_eq!(adja.codes(20), [0; 4]);
    mesh.validate_invariants().unwrap();
}

#[test]
fn non_manifold_face_is_rejected() {
    let mut mesh = TetMesh::with_capacity(6, 3);
    for c in [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [1.0, 1.0, 1.0],
    ] {
        mesh.new_point(c).unwrap();
    }
    // three elements on the face {1, 2, 3}
    mesh.new_tetra([1, 2, 3, 4]).unwrap();
    mesh.new_tetra([1, 3, 2, 5]).unwrap();
    mesh.new_tetra([6, 1, 2, 3]).unwrap();
    assert!(matches!(
        FaceHashRebuilder.rebuild(&mut mesh),
        Err(MeshError::Rebuild(_))
    ));
    assert!(mesh.adja.is_none());
}

#[test]
fn neighbour_codes_follow_face_numbering() {
    let mesh = box_mesh(1, 1, 1, 0);
    let adja = mesh.adja.as_ref().unwrap();
    for k in mesh.live_tetras() {
        for f in 0..4 {
            if let Some((kk, ff)) = adja.neighbor(k, f) {
                assert_eq!(adja.codes(kk)[ff], encode(k, f));
                // the shared face excludes exactly the opposite vertices
                let mut mine = mesh.tetras[k].v.to_vec();
                mine.remove(f);
                mine.sort_unstable();
                let mut theirs = mesh.tetras[kk].v.to_vec();
                theirs.remove(ff);
                theirs.sort_unstable();
                assert_eq!(mine, theirs);
            }
        }
    }
}

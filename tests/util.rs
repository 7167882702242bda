#![allow(dead_code)]
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tet_renumber::algs::permute::apply_permutation;
use tet_renumber::prelude::*;

/// Structured box with `spare` extra vertex and element slots.
pub fn box_mesh(nx: usize, ny: usize, nz: usize, spare: usize) -> TetMesh {
    let opts = TetBoxOptions {
        spare_vertices: spare,
        spare_elements: spare,
        skip_adjacency: false,
    };
    tet_box(nx, ny, nz, [0.0; 3], [1.0; 3], opts).unwrap()
}

/// Shuffle the live element range with a fixed seed and rebuild adjacency.
pub fn scramble(mesh: &mut TetMesh, seed: u64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut targets: Vec<usize> = (1..=mesh.ne).collect();
    targets.shuffle(&mut rng);
    let mut perm = vec![0];
    perm.extend(targets);
    apply_permutation(&mut mesh.tetras[..=mesh.ne], &mut perm).unwrap();
    FaceHashRebuilder.rebuild(mesh).unwrap();
}

/// An element identified by the coordinates of its vertices, in order.
pub type Signature = [[u64; 3]; 4];

pub fn signatures(mesh: &TetMesh) -> Vec<Signature> {
    mesh.live_tetras()
        .map(|k| mesh.tetras[k].v.map(|ip| mesh.points[ip].c.map(f64::to_bits)))
        .collect()
}

/// Mean index distance between face neighbours.
pub fn mean_neighbor_distance(mesh: &TetMesh) -> f64 {
    let adja = mesh.adja.as_ref().unwrap();
    let (mut sum, mut count) = (0usize, 0usize);
    for k in mesh.live_tetras() {
        for f in 0..4 {
            if let Some((kk, _)) = adja.neighbor(k, f) {
                sum += k.abs_diff(kk);
                count += 1;
            }
        }
    }
    sum as f64 / count.max(1) as f64
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// Face-hash rebuilder that counts its calls.
#[derive(Debug, Default)]
pub struct CountingRebuilder {
    pub calls: usize,
}

impl AdjacencyRebuilder for CountingRebuilder {
    fn rebuild(&mut self, mesh: &mut TetMesh) -> Result<(), MeshError> {
        self.calls += 1;
        FaceHashRebuilder.rebuild(mesh)
    }
}

/// Wraps an oracle, counting sessions and keeping the last permutation.
#[derive(Debug, Default)]
pub struct Recording<O> {
    pub inner: O,
    pub created: usize,
    pub destroyed: usize,
    pub last: Option<Vec<usize>>,
}

impl<O: PartitionOracle> PartitionOracle for Recording<O> {
    fn create(&mut self) -> Result<(), PartitionError> {
        self.created += 1;
        self.inner.create()
    }
    fn load(&mut self, n: usize, xadj: &[usize], adjncy: &[usize]) -> Result<(), PartitionError> {
        self.inner.load(n, xadj, adjncy)
    }
    fn validate(&self) -> Result<(), PartitionError> {
        self.inner.validate()
    }
    fn compute_box_partition(&mut self, bucket_size: usize) -> Result<Vec<usize>, PartitionError> {
        let perm = self.inner.compute_box_partition(bucket_size)?;
        self.last = Some(perm.clone());
        Ok(perm)
    }
    fn destroy(&mut self) {
        self.destroyed += 1;
        self.inner.destroy();
    }
}

/// Oracle whose partition step always fails.
#[derive(Debug, Default)]
pub struct FailingOracle {
    pub created: usize,
    pub destroyed: usize,
}

impl PartitionOracle for FailingOracle {
    fn create(&mut self) -> Result<(), PartitionError> {
        self.created += 1;
        Ok(())
    }
    fn load(&mut self, _: usize, _: &[usize], _: &[usize]) -> Result<(), PartitionError> {
        Ok(())
    }
    fn compute_box_partition(&mut self, _: usize) -> Result<Vec<usize>, PartitionError> {
        Err(PartitionError::Backend("out of boxes".into()))
    }
    fn destroy(&mut self) {
        self.destroyed += 1;
    }
}

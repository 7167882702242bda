//! Breadth-first box growing.
//!
//! A small built-in [`PartitionOracle`]: boxes of `bucket_size` vertices are
//! grown one at a time by breadth-first search, and vertices are numbered
//! consecutively box by box. The next box is seeded from the frontier left
//! over by the previous one, so consecutive boxes stay adjacent; when the
//! frontier is empty (a new connected component), the lowest unnumbered
//! vertex is used.

use std::collections::VecDeque;

use crate::partitioning::{PartitionError, PartitionOracle};

/// Built-in box partitioner working on a private copy of the CSR graph.
#[derive(Debug, Default, Clone)]
pub struct BreadthFirstBoxes {
    open: bool,
    loaded: bool,
    n: usize,
    xadj: Vec<usize>,
    adjncy: Vec<usize>,
}

impl BreadthFirstBoxes {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjncy[self.xadj[v]..self.xadj[v + 1]]
    }
}

impl PartitionOracle for BreadthFirstBoxes {
    fn create(&mut self) -> Result<(), PartitionError> {
        *self = Self {
            open: true,
            ..Self::default()
        };
        Ok(())
    }

    fn load(
        &mut self,
        vertex_count: usize,
        xadj: &[usize],
        adjncy: &[usize],
    ) -> Result<(), PartitionError> {
        if !self.open {
            return Err(PartitionError::NotCreated);
        }
        if xadj.len() != vertex_count + 2 {
            return Err(PartitionError::InvalidGraph(format!(
                "{} offsets for {vertex_count} vertices",
                xadj.len()
            )));
        }
        if xadj[vertex_count + 1] != adjncy.len() {
            return Err(PartitionError::InvalidGraph(format!(
                "sentinel offset {} but {} edge slots",
                xadj[vertex_count + 1],
                adjncy.len()
            )));
        }
        if let Some(v) = (1..=vertex_count).find(|&v| xadj[v] == 0 || xadj[v] > xadj[v + 1]) {
            return Err(PartitionError::InvalidGraph(format!(
                "offsets of vertex {v} are not monotone"
            )));
        }
        self.n = vertex_count;
        self.xadj = xadj.to_vec();
        self.adjncy = adjncy.to_vec();
        self.loaded = true;
        Ok(())
    }

    fn validate(&self) -> Result<(), PartitionError> {
        if !self.loaded {
            return Err(PartitionError::NotLoaded);
        }
        for v in 1..=self.n {
            if let Some(&w) = self.neighbors(v).iter().find(|&&w| w == 0 || w > self.n) {
                return Err(PartitionError::InvalidGraph(format!(
                    "vertex {v} has out-of-range neighbour {w}"
                )));
            }
        }
        Ok(())
    }

    fn compute_box_partition(&mut self, bucket_size: usize) -> Result<Vec<usize>, PartitionError> {
        if !self.open {
            return Err(PartitionError::NotCreated);
        }
        if !self.loaded {
            return Err(PartitionError::NotLoaded);
        }
        if bucket_size == 0 {
            return Err(PartitionError::InvalidBucketSize(bucket_size));
        }

        let n = self.n;
        let mut perm = vec![0usize; n + 1];
        let mut queued = vec![false; n + 1];
        let mut queue = VecDeque::new();
        let mut next = 1;
        let mut cursor = 1;
        let mut carry: Option<usize> = None;
        let mut boxes = 0usize;

        while next <= n {
            let seed = match carry.take() {
                Some(v) => v,
                None => {
                    while perm[cursor] != 0 {
                        cursor += 1;
                    }
                    cursor
                }
            };
            queue.push_back(seed);
            queued[seed] = true;

            let mut filled = 0;
            while filled < bucket_size {
                let Some(v) = queue.pop_front() else { break };
                perm[v] = next;
                next += 1;
                filled += 1;
                for &w in self.neighbors(v) {
                    if w == 0 || w > n {
                        return Err(PartitionError::InvalidGraph(format!(
                            "vertex {v} has out-of-range neighbour {w}"
                        )));
                    }
                    if perm[w] == 0 && !queued[w] {
                        queued[w] = true;
                        queue.push_back(w);
                    }
                }
            }
            boxes += 1;

            // the box is full: hand its frontier back
            for v in queue.drain(..) {
                queued[v] = false;
                if carry.is_none() {
                    carry = Some(v);
                }
            }
        }

        log::debug!("grew {boxes} boxes of up to {bucket_size} vertices over {n} vertices");
        Ok(perm)
    }

    fn destroy(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::permute::is_bijection;

    // path 1 - 2 - ... - n
    fn load_path(o: &mut BreadthFirstBoxes, n: usize) {
        let mut xadj = vec![0; n + 2];
        let mut adjncy = vec![0];
        for v in 1..=n {
            xadj[v] = adjncy.len();
            if v > 1 {
                adjncy.push(v - 1);
            }
            if v < n {
                adjncy.push(v + 1);
            }
        }
        xadj[n + 1] = adjncy.len();
        o.load(n, &xadj, &adjncy).unwrap();
    }

    #[test]
    fn path_is_numbered_contiguously() {
        let mut o = BreadthFirstBoxes::new();
        o.create().unwrap();
        load_path(&mut o, 7);
        o.validate().unwrap();
        let perm = o.compute_box_partition(3).unwrap();
        assert!(is_bijection(&perm));
        // starting from vertex 1 the walk never has to jump
        assert_eq!(perm, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        o.destroy();
    }

    #[test]
    fn disconnected_vertices_are_still_numbered() {
        let mut o = BreadthFirstBoxes::new();
        o.create().unwrap();
        // vertices 1 and 3 joined, 2 and 4 isolated
        o.load(4, &[0, 1, 2, 2, 3, 3], &[0, 3, 1]).unwrap();
        let perm = o.compute_box_partition(2).unwrap();
        assert!(is_bijection(&perm));
        assert_eq!(perm[1] + 1, perm[3]);
    }

    #[test]
    fn session_order_is_enforced() {
        let mut o = BreadthFirstBoxes::new();
        assert_eq!(o.load(0, &[0, 1], &[0]), Err(PartitionError::NotCreated));
        o.create().unwrap();
        assert_eq!(o.compute_box_partition(4), Err(PartitionError::NotLoaded));
        o.load(0, &[0, 1], &[0]).unwrap();
        assert_eq!(
            o.compute_box_partition(0),
            Err(PartitionError::InvalidBucketSize(0))
        );
        assert_eq!(o.compute_box_partition(4).unwrap(), vec![0]);
    }

    #[test]
    fn malformed_graph_fails_validation() {
        let mut o = BreadthFirstBoxes::new();
        o.create().unwrap();
        o.load(2, &[0, 1, 2, 3], &[0, 9, 1]).unwrap();
        assert!(matches!(o.validate(), Err(PartitionError::InvalidGraph(_))));
        assert!(o.load(2, &[0, 1, 3], &[0]).is_err());
        assert!(o.load(2, &[0, 1, 5, 3], &[0, 2, 1]).is_err());
    }
}

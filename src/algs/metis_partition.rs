//! METIS-backed box partitioner (feature `metis-support`).
//!
//! The graph is split into `ceil(n / bucket_size)` parts with
//! `METIS_PartGraphKway`; vertices are then numbered part by part, keeping
//! their relative order inside a part.

use crate::partitioning::{PartitionError, PartitionOracle};
use metis::Idx;

/// A wrapper around a METIS k-way partition used as a box oracle.
#[derive(Debug, Default)]
pub struct MetisBoxes {
    open: bool,
    n: usize,
    /// 0-based copies, as METIS expects
    xadj: Vec<Idx>,
    adjncy: Vec<Idx>,
}

impl MetisBoxes {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_idx(x: usize) -> Result<Idx, PartitionError> {
    Idx::try_from(x).map_err(|_| PartitionError::Backend(format!("{x} overflows METIS idx_t")))
}

impl PartitionOracle for MetisBoxes {
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
        if xadj.len() != vertex_count + 2 || adjncy.is_empty() {
            return Err(PartitionError::InvalidGraph(format!(
                "{} offsets for {vertex_count} vertices",
                xadj.len()
            )));
        }
        // shift 1-based CSR to 0-based
        self.xadj = xadj[1..]
            .iter()
            .map(|&o| to_idx(o.saturating_sub(1)))
            .collect::<Result<_, _>>()?;
        self.adjncy = adjncy[1..]
            .iter()
            .map(|&w| to_idx(w.saturating_sub(1)))
            .collect::<Result<_, _>>()?;
        self.n = vertex_count;
        Ok(())
    }

    fn compute_box_partition(&mut self, bucket_size: usize) -> Result<Vec<usize>, PartitionError> {
        if !self.open {
            return Err(PartitionError::NotCreated);
        }
        if bucket_size == 0 {
            return Err(PartitionError::InvalidBucketSize(bucket_size));
        }
        let n = self.n;
        let nparts = n.div_ceil(bucket_size);
        if nparts <= 1 {
            return Ok((0..=n).collect());
        }

        let mut part: Vec<Idx> = vec![0; n];
        let graph = metis::Graph::new(1, to_idx(nparts)?, &self.xadj, &self.adjncy)
            .map_err(|e| PartitionError::Backend(e.to_string()))?;
        let cut = graph
            .part_kway(&mut part)
            .map_err(|e| PartitionError::Backend(e.to_string()))?;
        log::debug!("METIS split {n} vertices into {nparts} parts, edge cut {cut}");

        // counting sort by part id
        let mut start = vec![0usize; nparts + 1];
        for &p in &part {
            let p = usize::try_from(p)
                .ok()
                .filter(|&p| p < nparts)
                .ok_or_else(|| PartitionError::Backend(format!("part id {p} out of range")))?;
            start[p + 1] += 1;
        }
        for p in 0..nparts {
            start[p + 1] += start[p];
        }
        let mut perm = vec![0usize; n + 1];
        for (v, &p) in part.iter().enumerate() {
            let slot = &mut start[p as usize];
            *slot += 1;
            perm[v + 1] = *slot;
        }
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

    #[test]
    fn single_box_is_identity() {
        let mut o = MetisBoxes::new();
        o.create().unwrap();
        o.load(2, &[0, 1, 2, 3], &[0, 2, 1]).unwrap();
        assert_eq!(o.compute_box_partition(8).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn ring_partition_is_a_permutation() {
        let n = 12;
        let mut xadj = vec![0; n + 2];
        let mut adjncy = vec![0];
        for v in 1..=n {
            xadj[v] = adjncy.len();
            adjncy.push(if v == 1 { n } else { v - 1 });
            adjncy.push(if v == n { 1 } else { v + 1 });
        }
        xadj[n + 1] = adjncy.len();
        let mut o = MetisBoxes::new();
        o.create().unwrap();
        o.load(n, &xadj, &adjncy).unwrap();
        let perm = o.compute_box_partition(4).unwrap();
        assert!(is_bijection(&perm));
        o.destroy();
    }
}

//! In-place application of permutation tables.
//!
//! A table `perm` is indexed in parallel with the records it permutes and is
//! 1-based: `perm[i]` is the new position of the record currently at `i`,
//! `0` means "don't care" (dead slot), and `perm[0]` is an unused sentinel.
//! Application follows each cycle once, exchanging whole records, and
//! consumes the table: on return every non-zero entry is a fixed point.

use crate::mesh_error::MeshError;

/// Apply `perm` through a caller-provided exchange of two positions.
///
/// `swap(a, b)` must exchange *everything* stored at `a` and `b` (record plus
/// any parallel payload) in one step. The table must be injective on its
/// non-zero entries; violations are detected and reported as
/// `InvalidPermutation` without looping forever.
pub fn apply_permutation_with<F>(perm: &mut [usize], mut swap: F) -> Result<(), MeshError>
where
    F: FnMut(usize, usize),
{
    let n = perm.len().saturating_sub(1);
    // every exchange settles at least one position for good
    let mut budget = n;
    for i in 1..=n {
        while perm[i] != i && perm[i] != 0 {
            let j = perm[i];
            if j > n {
                return Err(MeshError::InvalidPermutation(format!(
                    "entry {i} maps to {j}, outside 1..={n}"
                )));
            }
            if budget == 0 {
                return Err(MeshError::InvalidPermutation(format!(
                    "entry {i} maps to {j}, which is already taken"
                )));
            }
            budget -= 1;
            swap(i, j);
            perm.swap(i, j);
        }
    }
    Ok(())
}

/// Permute `records[1..perm.len()]` in place according to `perm`.
pub fn apply_permutation<T>(records: &mut [T], perm: &mut [usize]) -> Result<(), MeshError> {
    if records.len() < perm.len() {
        return Err(MeshError::InvalidPermutation(format!(
            "table covers {} slots but only {} records given",
            perm.len(),
            records.len()
        )));
    }
    apply_permutation_with(perm, |a, b| records.swap(a, b))
}

/// True if `perm[1..]` is a bijection onto `1..perm.len()`.
pub fn is_bijection(perm: &[usize]) -> bool {
    check_bijection(perm).is_ok()
}

/// Like [`is_bijection`] but describes the first defect found.
pub fn check_bijection(perm: &[usize]) -> Result<(), String> {
    let n = perm.len().saturating_sub(1);
    let mut seen = vec![false; n + 1];
    for (i, &p) in perm.iter().enumerate().skip(1) {
        if p == 0 || p > n {
            return Err(format!("entry {i} maps to {p}, outside 1..={n}"));
        }
        if std::mem::replace(&mut seen[p], true) {
            return Err(format!("position {p} is assigned twice"));
        }
    }
    Ok(())
}

/// The inverse of a bijective table, with the same sentinel layout.
pub fn invert_permutation(perm: &[usize]) -> Result<Vec<usize>, MeshError> {
    check_bijection(perm).map_err(MeshError::InvalidPermutation)?;
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate().skip(1) {
        inv[p] = i;
    }
    Ok(inv)
}

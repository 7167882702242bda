//! Fallible acquisition of transient work buffers.
//!
//! The renumbering pipeline must survive allocation failure, so its scratch
//! tables are reserved with `try_reserve_exact` instead of `vec!`.

use crate::mesh_error::MeshError;

/// A `Vec` holding `len` copies of `value`, or `MeshError::Allocation`.
pub fn try_filled_vec<T: Clone>(
    len: usize,
    value: T,
    what: &'static str,
) -> Result<Vec<T>, MeshError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| MeshError::Allocation { what, source })?;
    buf.resize(len, value);
    Ok(buf)
}

/// An empty `Vec` with room for at least `capacity` elements.
pub fn try_with_capacity<T>(capacity: usize, what: &'static str) -> Result<Vec<T>, MeshError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|source| MeshError::Allocation { what, source })?;
    Ok(buf)
}

/// Grow `buf` by `factor` when it is full, adding at least one slot.
pub fn try_grow<T>(buf: &mut Vec<T>, factor: f64, what: &'static str) -> Result<(), MeshError> {
    if buf.len() < buf.capacity() {
        return Ok(());
    }
    let target = ((buf.capacity() as f64) * factor) as usize;
    let extra = target.saturating_sub(buf.len()).max(1);
    buf.try_reserve_exact(extra)
        .map_err(|source| MeshError::Allocation { what, source })
}

use std::ops::Range;

/// Default number of downloads allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 200;

/// Split `len` items into consecutive ranges of at most `size` items.
/// A zero `size` is treated as one.
pub fn chunk_ranges(len: usize, size: usize) -> Vec<Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}

//! Helpers for splitting row-major buffers into disjoint horizontal bands
//! that can be handed to independent parallel workers.


/// Number of bands to split `height` rows into so every rayon worker gets one.
/// Never exceeds `height` and never drops below 1.
#[inline]
pub fn auto_band_count(height: usize) -> usize {
    rayon::current_num_threads().min(height).max(1)
}

/// Splits a row-major slice into consecutive mutable bands.
///
/// Band `i` holds `row_counts[i]` rows of `row_len` elements each. The bands
/// are disjoint, so they can be sent to different threads without locking.
///
/// # Panics
///
/// Panics if the row counts do not cover `data` exactly.
pub fn split_rows_mut<'a, T>(
    data: &'a mut [T],
    row_len: usize,
    row_counts: &[usize],
) -> Vec<&'a mut [T]> {
    let total_rows: usize = row_counts.iter().sum();
    assert_eq!(
        total_rows * row_len,
        data.len(),
        "row counts must cover the slice exactly"
    );

    let mut bands = Vec::with_capacity(row_counts.len());
    let mut rest = data;
    for &rows in row_counts {
        let (band, tail) = std::mem::take(&mut rest).split_at_mut(rows * row_len);
        bands.push(band);
        rest = tail;
    }
    bands
}

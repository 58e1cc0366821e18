//! Spatial sampling patterns used to pick sample sources (initialization) and
//! diffusion targets (update). Both clamp to the image bounds.

use rand::RngCore;

/// `floor(gaussian(7x7, sigma = 2) * 512)`.
const INIT_PATTERN: [[u32; 7]; 7] = [
    [2, 4, 6, 7, 6, 4, 2],
    [4, 8, 12, 14, 12, 8, 4],
    [6, 12, 21, 25, 21, 12, 6],
    [7, 14, 25, 28, 25, 14, 7],
    [6, 12, 21, 25, 21, 12, 6],
    [4, 8, 12, 14, 12, 8, 4],
    [2, 4, 6, 7, 6, 4, 2],
];
const INIT_PATTERN_TOTAL: u32 = 512;
const INIT_PATTERN_RADIUS: isize = 3;

const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

#[inline]
fn clamp_coords(x: isize, y: isize, width: usize, height: usize) -> (usize, usize) {
    debug_assert!(width > 0 && height > 0, "empty image {}x{}", width, height);
    (
        x.clamp(0, width as isize - 1) as usize,
        y.clamp(0, height as isize - 1) as usize,
    )
}

/// Cell of the init pattern hit by a draw in `1..=INIT_PATTERN_TOTAL`.
fn init_pattern_cell(draw: u32) -> (usize, usize) {
    let mut remaining = draw as i64;
    for (ky, row) in INIT_PATTERN.iter().enumerate() {
        for (kx, &weight) in row.iter().enumerate() {
            remaining -= weight as i64;
            if remaining <= 0 {
                return (kx, ky);
            }
        }
    }
    // Unreachable while the weights sum to INIT_PATTERN_TOTAL.
    (6, 6)
}

/// Picks a seed-frame coordinate near `origin`, Gaussian-weighted over a 7x7
/// footprint.
///
/// # Panics
///
/// Panics if `width` or `height` is zero.
pub fn init_sample_position<R: RngCore>(
    rng: &mut R,
    origin: (usize, usize),
    width: usize,
    height: usize,
) -> (usize, usize) {
    let draw = 1 + rng.next_u32() % INIT_PATTERN_TOTAL;
    let (kx, ky) = init_pattern_cell(draw);
    clamp_coords(
        origin.0 as isize + kx as isize - INIT_PATTERN_RADIUS,
        origin.1 as isize + ky as isize - INIT_PATTERN_RADIUS,
        width,
        height,
    )
}

/// Picks one of the 8 neighbours of `origin` uniformly.
///
/// # Panics
///
/// Panics if `width` or `height` is zero.
pub fn neighbor_position<R: RngCore>(
    rng: &mut R,
    origin: (usize, usize),
    width: usize,
    height: usize,
) -> (usize, usize) {
    let (dx, dy) = NEIGHBOR_OFFSETS[(rng.next_u32() % 8) as usize];
    clamp_coords(
        origin.0 as isize + dx,
        origin.1 as isize + dy,
        width,
        height,
    )
}

//! PCG32 "fast" generator: 64-bit multiplicative congruential state with an
//! XSH-RS output permutation. Not cryptographic; meant for the per-pixel
//! coin flips of the update rule, where throughput matters most.

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};

const MULTIPLIER: u64 = 6364136223846793005;

/// Seed used by [`Pcg32Fast::default`]. Runs seeded from it are reproducible.
pub const DEFAULT_SEED: u64 = 0x6576_6f6c_7574_696f;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pcg32Fast {
    // Always odd, otherwise the MCG collapses.
    state: u64,
}

impl Pcg32Fast {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: seed.wrapping_mul(2).wrapping_add(1),
        };
        rng.step();
        rng
    }

    /// Seeds from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::from_os_rng()
    }

    #[inline]
    fn step(&mut self) -> u32 {
        let x = self.state;
        let count = (x >> 61) as u32;
        self.state = x.wrapping_mul(MULTIPLIER);
        let x = x ^ (x >> 22);
        (x >> (22 + count)) as u32
    }
}

impl Default for Pcg32Fast {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl RngCore for Pcg32Fast {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for Pcg32Fast {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}

/// Derives the seed for tile `index` from a base seed (SplitMix64 finalizer),
/// so neighbouring tiles start from uncorrelated streams.
pub fn tile_seed(base: u64, index: usize) -> u64 {
    let mut z = base.wrapping_add((index as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

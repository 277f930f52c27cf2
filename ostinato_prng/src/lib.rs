// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled rather than taken from `rand` so that output is identical on
// every platform and across dependency upgrades; serde is used only to
// snapshot generator state.
//
// This crate is the single PRNG used across the Ostinato workspace. Every
// generator in `ostinato_music` (time signatures, beat segmentation, the
// interval walk, scale selection, chordify) takes a `&mut MelodyRng`
// explicitly; there is no process-wide generator. Parallel voices each own a
// stream obtained through `MelodyRng::for_stream`, which uses the xoshiro
// jump function so that streams never overlap.
//
// **Critical constraint: determinism.** Every method on `MelodyRng` must
// produce identical output given the same prior state, regardless of
// platform, compiler version, or optimization level. Do not use
// floating-point arithmetic in the core generator, stdlib PRNG, or any source
// of non-determinism in this module.

use serde::{Deserialize, Serialize};

/// Coefficients of the xoshiro256 jump polynomial. One jump is equivalent to
/// 2^128 calls to `next_u64`.
const JUMP: [u64; 4] = [
    0x180e_c6d3_3cfd_0aba,
    0xd5a6_1266_f0c9_392c,
    0xa958_2618_e03f_c9aa,
    0x39ab_dc45_29b1_661c,
];

/// Xoshiro256++ PRNG — the workspace's sole source of randomness.
///
/// Each pipeline invocation owns its own `MelodyRng`, seeded
/// deterministically, so a seed fully determines the generated piece.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MelodyRng {
    s: [u64; 4],
}

impl MelodyRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two `MelodyRng` instances created with the same seed will produce
    /// identical output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create the `stream`-th independent generator for `seed`.
    ///
    /// Stream 0 is identical to `MelodyRng::new(seed)`. Stream `n` starts
    /// `n` jumps (n * 2^128 draws) further along the same sequence, so
    /// streams handed to concurrently running voices never overlap.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        let mut rng = Self::new(seed);
        for _ in 0..stream {
            rng.jump();
        }
        rng
    }

    /// Advance the state by 2^128 steps.
    pub fn jump(&mut self) {
        let mut acc = [0u64; 4];
        for &word in &JUMP {
            for bit in 0..64 {
                if word & (1u64 << bit) != 0 {
                    for (a, s) in acc.iter_mut().zip(self.s.iter()) {
                        *a ^= *s;
                    }
                }
                self.next_u64();
            }
        }
        self.s = acc;
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a `u32` by taking the upper 32 bits of a `u64`.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Uses the upper 53 bits of a `u64` to fill the mantissa of an f64.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        // Rejection sampling to avoid modulo bias.
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `u32` in `[low, high]` (inclusive on both ends).
    ///
    /// Panics if `low > high`.
    pub fn range_u32_inclusive(&mut self, low: u32, high: u32) -> u32 {
        assert!(low <= high, "range_u32_inclusive: low must be <= high");
        self.range_u64(low as u64, high as u64 + 1) as u32
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Return `true` with probability `p`, `false` otherwise.
    ///
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick a uniformly random element of `items`, or `None` if it is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.range_usize(0, items.len())])
    }

    /// Pick an index with probability proportional to `weights[i]`.
    ///
    /// Returns `None` if the slice is empty or the weights do not sum to a
    /// positive value. Negative weights count as zero.
    pub fn choose_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let target = self.next_f64() * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last_positive = Some(i);
            if cumulative > target {
                return Some(i);
            }
        }
        // Rounding can leave `target` a hair above the final cumulative sum.
        last_positive
    }
}

/// SplitMix64 — used only for seeding xoshiro256++ from a single `u64`.
///
/// This is the standard recommendation from the xoshiro authors for
/// expanding a small seed into a larger state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

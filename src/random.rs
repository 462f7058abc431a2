// src/random.rs

//! Stateless random draws keyed by `(seed, offset)`.
//!
//! Each call builds a fresh Philox engine with `seed` as the key, subsequence
//! zero, and `offset` as the counter, so the result depends on nothing but
//! its arguments. Kernels pass the element index as `offset`; the same
//! computation repartitioned across threads produces the same values.

use crate::philox::{Philox4x32, DEFAULT_ROUNDS};

/// Largest `f32` with `0x7FFF_FFFF as f32 * SCALE < 1.0` under f32 rounding.
const UNIFORM_SCALE: f32 = 4.656_612_734_2e-10;

/// Maps a random word to `[0, 1)`.
///
/// Only the low 31 bits are used. `0x7FFF_FFFF` rounds up to `2^31` in f32,
/// and the scale sits just under `2^-31`, so the largest result is the
/// biggest f32 below 1.0.
#[inline(always)]
pub const fn uint32_to_uniform_float(value: u32) -> f32 {
    (value & 0x7FFF_FFFF) as f32 * UNIFORM_SCALE
}

/// Uniform draw in `[0, 1)`.
#[inline]
pub fn normalized_rand(seed: u32, offset: u32) -> f32 {
    let mut engine = Philox4x32::new(u64::from(seed), 0, u64::from(offset));
    uint32_to_uniform_float(engine.next_u32())
}

/// Standard-normal draw (Box–Muller over one 10-round block).
#[inline]
pub fn randn(seed: u32, offset: u32) -> f32 {
    Philox4x32::new(u64::from(seed), 0, u64::from(offset)).randn(DEFAULT_ROUNDS)
}

/// Integer draw in `[low, high)`.
///
/// Two consecutive words form a 64-bit value that is reduced modulo the
/// range width. The reduction carries the usual slight modulo bias.
///
/// # Panics
/// Panics if `high <= low`.
#[inline]
pub fn randint64(seed: u32, offset: u32, low: i64, high: i64) -> i64 {
    assert!(high > low, "empty range [{low}, {high})");
    let mut engine = Philox4x32::new(u64::from(seed), 0, u64::from(offset));
    let r0 = u64::from(engine.next_u32());
    let r1 = u64::from(engine.next_u32());
    let span = high.wrapping_sub(low) as u64;
    ((r0 | (r1 << 32)) % span).wrapping_add(low as u64) as i64
}

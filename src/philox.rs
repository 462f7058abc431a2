// src/philox.rs

//! Philox-4x32 counter-based generator.
//!
//! Output is a pure function of a 128-bit counter and a 64-bit key. Each
//! block runs the counter through a fixed number of multiply/xor rounds,
//! bumping the key by Weyl constants between rounds, and yields four 32-bit
//! words. Because nothing but the counter advances, any element of the
//! stream can be produced directly from `(key, counter)`.
//!
//! ```text
//! round: (c0, c1, c2, c3), (k0, k1)
//!   hi0:lo0 = M0 * c0
//!   hi1:lo1 = M1 * c2
//!   -> (hi1 ^ c1 ^ k0, lo1, hi0 ^ c3 ^ k1, lo0)
//! ```

use crate::random::uint32_to_uniform_float;

const PHILOX_M0: u32 = 0xD251_1F53;
const PHILOX_M1: u32 = 0xCD9E_8D57;
const PHILOX_W0: u32 = 0x9E37_79B9;
const PHILOX_W1: u32 = 0xBB67_AE85;

/// Round count for [`Philox4x32::next_u32`].
pub const DEFAULT_ROUNDS: u32 = 10;

/// Philox-4x32 engine positioned at one counter value.
///
/// The engine buffers one block of four output words; `next_u32` hands them
/// out in order and advances the counter when the block is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Philox4x32 {
    counter: [u32; 4],
    key: [u32; 2],
    output: [u32; 4],
    // Index of the next word in `output`; 0 means a new block is due.
    state: usize,
}

impl Philox4x32 {
    /// Positions an engine at `(seed, subsequence, offset)`.
    ///
    /// The seed becomes the key, the subsequence fills the upper two counter
    /// words, and `offset` advances the lower two (carrying upward).
    pub fn new(seed: u64, subsequence: u64, offset: u64) -> Self {
        let mut engine = Self {
            counter: [0, 0, subsequence as u32, (subsequence >> 32) as u32],
            key: [seed as u32, (seed >> 32) as u32],
            output: [0; 4],
            state: 0,
        };
        engine.incr_n(offset);
        engine
    }

    /// Current 128-bit counter, low word first.
    pub fn counter(&self) -> [u32; 4] {
        self.counter
    }

    /// Next output word using [`DEFAULT_ROUNDS`].
    pub fn next_u32(&mut self) -> u32 {
        self.next_u32_with_rounds(DEFAULT_ROUNDS)
    }

    pub fn next_u32_with_rounds(&mut self, n_rounds: u32) -> u32 {
        if self.state == 0 {
            self.refill(n_rounds);
        }
        let word = self.output[self.state];
        self.state = (self.state + 1) & 3;
        word
    }

    /// One standard-normal draw via Box–Muller.
    ///
    /// Runs a block of `n_rounds` on the current counter and transforms its
    /// first two words. The engine is left untouched: repeated calls return
    /// the same value, and words already handed out by `next_u32` are never
    /// reused, since the counter has moved past their block.
    pub fn randn(&self, n_rounds: u32) -> f32 {
        let [w0, w1, _, _] = Self::block(self.counter, self.key, n_rounds);
        normal_from_uniform_pair(uint32_to_uniform_float(w0), uint32_to_uniform_float(w1))
    }

    /// Runs one block of rounds over the current counter without touching
    /// engine state.
    pub fn block(counter: [u32; 4], key: [u32; 2], n_rounds: u32) -> [u32; 4] {
        let mut counter = counter;
        let mut key = key;
        for _ in 1..n_rounds.max(1) {
            counter = single_round(counter, key);
            key[0] = key[0].wrapping_add(PHILOX_W0);
            key[1] = key[1].wrapping_add(PHILOX_W1);
        }
        single_round(counter, key)
    }

    fn refill(&mut self, n_rounds: u32) {
        self.output = Self::block(self.counter, self.key, n_rounds);
        self.incr();
    }

    fn incr(&mut self) {
        for word in self.counter.iter_mut() {
            *word = word.wrapping_add(1);
            if *word != 0 {
                return;
            }
        }
    }

    /// Adds a 64-bit step to the 128-bit counter.
    fn incr_n(&mut self, n: u64) {
        let lo = u64::from(self.counter[0]) | (u64::from(self.counter[1]) << 32);
        let (sum, carry) = lo.overflowing_add(n);
        self.counter[0] = sum as u32;
        self.counter[1] = (sum >> 32) as u32;
        if carry {
            let hi = u64::from(self.counter[2]) | (u64::from(self.counter[3]) << 32);
            let hi = hi.wrapping_add(1);
            self.counter[2] = hi as u32;
            self.counter[3] = (hi >> 32) as u32;
        }
    }
}

/// Box–Muller in f32. `u1` is floored at `1e-7` so the logarithm stays finite.
#[inline]
fn normal_from_uniform_pair(u1: f32, u2: f32) -> f32 {
    let u1 = u1.max(1.0e-7);
    let radius = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * core::f32::consts::PI * u2;
    radius * theta.cos()
}

#[inline(always)]
fn mulhilo32(a: u32, b: u32) -> (u32, u32) {
    let product = u64::from(a) * u64::from(b);
    ((product >> 32) as u32, product as u32)
}

#[inline(always)]
fn single_round(ctr: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let (hi0, lo0) = mulhilo32(PHILOX_M0, ctr[0]);
    let (hi1, lo1) = mulhilo32(PHILOX_M1, ctr[2]);
    [hi1 ^ ctr[1] ^ key[0], lo1, hi0 ^ ctr[3] ^ key[1], lo0]
}

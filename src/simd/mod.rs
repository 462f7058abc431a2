// src/simd/mod.rs

//! Register-level flag → float mask conversion.
//!
//! Each backend is a zero-sized token (`Scalar`, `Avx2`, `Avx512`, `Neon`).
//! SIMD tokens are only handed out by `try_new()` after the CPU reported the
//! instruction set, and vectors can only be loaded through a token, so
//! holding a vector is proof its instructions are safe to run.
//!
//! Two conversion paths exist:
//!
//! - [`to_float_mask_generic`] spills the source register to a stack buffer,
//!   applies the scalar flag rule lane by lane, and reloads the result as an
//!   f32 register. Works for any lane type.
//! - `i32` registers implement [`ToFloatMask`] with a register-only sequence
//!   (compare against zero, widen the lane mask).
//!
//! Batch conversion goes through [`Backend::i32_masks_body`]. The x86
//! backends override it with a loop compiled under
//! `#[target_feature(enable = ...)]`, so load, compare and store inline into
//! one vector loop instead of calling each intrinsic out of line.
//!
//! Both paths produce identical bit patterns: every lane is `0x0000_0000`
//! or `0xFFFF_FFFF`.

use core::fmt::Debug;

use crate::cpu::{isa_level, IsaLevel};
use crate::mask::{flag_to_float_batch, Flag};

#[cfg(target_arch = "aarch64")]
pub mod arm;
pub mod scalar;
#[cfg(target_arch = "x86_64")]
pub mod x86;

#[cfg(test)]
mod tests;

#[cfg(target_arch = "aarch64")]
pub use arm::{F32x4, I32x4, Neon, U32x4};
pub use scalar::{Scalar, ScalarBatch};
#[cfg(target_arch = "x86_64")]
pub use x86::{Avx2, Avx512, F32x16, F32x8, I32x16, I32x8, U32x16, U32x8};

/// Widest register (in 32-bit lanes) any backend uses. Sizes the spill buffers.
pub const MAX_LANES: usize = 16;

/// A vector instruction set with 32-bit lane registers.
pub trait Backend: Copy + Debug + Send + Sync + 'static {
    const LANES: usize;
    const ISA: IsaLevel;

    type F32: MaskVector<Backend = Self> + ToFloatMask<Mask = Self::F32>;
    type I32: ToFloatMask<Lane = i32, Backend = Self, Mask = Self::F32>;
    type U32: ToFloatMask<Lane = u32, Backend = Self, Mask = Self::F32>;

    /// Loads the first `LANES` values. Panics if `src` is shorter.
    fn load_i32(self, src: &[i32]) -> Self::I32;

    fn load_u32(self, src: &[u32]) -> Self::U32;

    fn load_f32(self, src: &[f32]) -> Self::F32;

    /// Converts whole registers of `src` into the front of `dst`.
    ///
    /// # Panics
    /// Panics if `src.len()` is not a multiple of `LANES` or `dst` is shorter.
    fn i32_masks_body(self, src: &[i32], dst: &mut [f32]) {
        assert!(src.len() % Self::LANES == 0 && dst.len() >= src.len());
        for (s, d) in src.chunks_exact(Self::LANES).zip(dst.chunks_exact_mut(Self::LANES)) {
            self.load_i32(s).to_float_mask().store(d);
        }
    }
}

/// A register holding `LANES` values of one lane type.
pub trait LaneVector: Copy + Debug {
    type Lane: Flag;
    type Backend: Backend;
    const LANES: usize;

    /// The token this register was loaded with.
    fn backend(&self) -> Self::Backend;

    /// Writes all lanes to the front of `out`. Panics if `out` is shorter.
    fn store(self, out: &mut [Self::Lane]);
}

/// An f32 register used as a select/blend mask.
pub trait MaskVector: LaneVector<Lane = f32> {
    fn load(backend: Self::Backend, src: &[f32]) -> Self;
}

/// Per-register conversion to a float mask of the same lane count.
pub trait ToFloatMask: LaneVector {
    type Mask: MaskVector<Backend = Self::Backend>;

    fn to_float_mask(self) -> Self::Mask;
}

/// Store/convert/reload conversion.
///
/// Lane counts must agree; a mismatch fails the build.
#[inline]
pub fn to_float_mask_generic<V, W>(src: V) -> W
where
    V: LaneVector,
    W: MaskVector<Backend = V::Backend>,
{
    const {
        assert!(V::LANES == W::LANES, "source and mask registers differ in lane count");
        assert!(V::LANES <= MAX_LANES, "register wider than the spill buffer");
    }
    let mut src_tmp = [<V::Lane as Default>::default(); MAX_LANES];
    let mut dst_tmp = [0.0f32; MAX_LANES];
    src.store(&mut src_tmp[..V::LANES]);
    flag_to_float_batch(&src_tmp[..V::LANES], &mut dst_tmp[..V::LANES]);
    W::load(src.backend(), &dst_tmp[..V::LANES])
}

/// Converts `i32` flags to masks with a specific backend.
///
/// Full registers go through the register path; the tail that does not
/// fill a register uses the scalar rule.
///
/// # Panics
/// Panics if `dst` is shorter than `src`.
pub fn i32_to_float_mask_with<B: Backend>(backend: B, src: &[i32], dst: &mut [f32]) {
    assert!(
        dst.len() >= src.len(),
        "mask destination holds {} slots, need {}",
        dst.len(),
        src.len()
    );
    let body = src.len() - src.len() % B::LANES;
    backend.i32_masks_body(&src[..body], &mut dst[..body]);
    flag_to_float_batch(&src[body..], &mut dst[body..src.len()]);
}

/// Converts `i32` flags to masks on the backend selected for this process.
///
/// Results are identical on every backend; only throughput differs.
///
/// # Panics
/// Panics if `dst` is shorter than `src`.
pub fn flags_to_float_mask(src: &[i32], dst: &mut [f32]) {
    match isa_level() {
        #[cfg(target_arch = "x86_64")]
        IsaLevel::Avx512 => {
            if let Some(avx512) = Avx512::try_new() {
                return i32_to_float_mask_with(avx512, src, dst);
            }
        }
        #[cfg(target_arch = "x86_64")]
        IsaLevel::Avx2 => {
            if let Some(avx2) = Avx2::try_new() {
                return i32_to_float_mask_with(avx2, src, dst);
            }
        }
        #[cfg(target_arch = "aarch64")]
        IsaLevel::Neon => {
            if let Some(neon) = Neon::try_new() {
                return i32_to_float_mask_with(neon, src, dst);
            }
        }
        _ => {}
    }
    i32_to_float_mask_with(Scalar, src, dst)
}

// src/simd/x86.rs

//! x86_64 backends: AVX2 (8 lanes) and AVX-512F (16 lanes).

use super::{to_float_mask_generic, Backend, LaneVector, MaskVector, ToFloatMask};
use crate::cpu::{cpu_features, CpuFeatures, IsaLevel};
use core::arch::x86_64::*;
use core::fmt::{Debug, Formatter};

// ============================================================================
// AVX2 Backend
// ============================================================================

/// AVX2 token (8 lanes). Only obtainable on CPUs that report AVX2.
#[derive(Copy, Clone, Debug)]
pub struct Avx2 {
    _detected: (),
}

impl Avx2 {
    pub fn try_new() -> Option<Self> {
        cpu_features()
            .contains(CpuFeatures::AVX2)
            .then_some(Avx2 { _detected: () })
    }
}

impl Backend for Avx2 {
    const LANES: usize = 8;
    const ISA: IsaLevel = IsaLevel::Avx2;

    type F32 = F32x8;
    type I32 = I32x8;
    type U32 = U32x8;

    #[inline(always)]
    fn load_i32(self, src: &[i32]) -> I32x8 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: the token proves AVX2; the length was checked.
        unsafe { I32x8(_mm256_loadu_si256(src.as_ptr().cast())) }
    }

    #[inline(always)]
    fn load_u32(self, src: &[u32]) -> U32x8 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { U32x8(_mm256_loadu_si256(src.as_ptr().cast())) }
    }

    #[inline(always)]
    fn load_f32(self, src: &[f32]) -> F32x8 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { F32x8(_mm256_loadu_ps(src.as_ptr())) }
    }

    #[inline]
    fn i32_masks_body(self, src: &[i32], dst: &mut [f32]) {
        assert!(src.len() % Self::LANES == 0 && dst.len() >= src.len());
        // SAFETY: the token proves AVX2; lengths were checked.
        unsafe { i32_masks_avx2(src, dst) }
    }
}

/// All-ones for nonzero lanes, zero otherwise.
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn nonzero_lanes_avx2(v: __m256i) -> __m256 {
    let zero = _mm256_setzero_si256();
    let is_zero = _mm256_cmpeq_epi32(v, zero);
    let ones = _mm256_cmpeq_epi32(zero, zero);
    _mm256_castsi256_ps(_mm256_xor_si256(is_zero, ones))
}

/// Whole-register loop; `src.len()` is a multiple of 8 and `dst` is at least as long.
#[target_feature(enable = "avx2")]
unsafe fn i32_masks_avx2(src: &[i32], dst: &mut [f32]) {
    for (s, d) in src.chunks_exact(8).zip(dst.chunks_exact_mut(8)) {
        let v = _mm256_loadu_si256(s.as_ptr().cast());
        _mm256_storeu_ps(d.as_mut_ptr(), nonzero_lanes_avx2(v));
    }
}

/// 8-lane f32 register for AVX2.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct F32x8(__m256);

/// 8-lane i32 register for AVX2.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct I32x8(__m256i);

/// 8-lane u32 register for AVX2.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct U32x8(__m256i);

impl F32x8 {
    #[inline(always)]
    pub fn to_array(self) -> [f32; 8] {
        let mut arr = [0.0f32; 8];
        self.store(&mut arr);
        arr
    }
}

impl I32x8 {
    #[inline(always)]
    pub fn to_array(self) -> [i32; 8] {
        let mut arr = [0i32; 8];
        self.store(&mut arr);
        arr
    }
}

impl U32x8 {
    #[inline(always)]
    pub fn to_array(self) -> [u32; 8] {
        let mut arr = [0u32; 8];
        self.store(&mut arr);
        arr
    }
}

impl Debug for F32x8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "F32x8({:?})", self.to_array())
    }
}

impl Debug for I32x8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "I32x8({:?})", self.to_array())
    }
}

impl Debug for U32x8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "U32x8({:?})", self.to_array())
    }
}

impl LaneVector for F32x8 {
    type Lane = f32;
    type Backend = Avx2;
    const LANES: usize = 8;

    #[inline(always)]
    fn backend(&self) -> Avx2 {
        Avx2 { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [f32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: this register could only be loaded with an Avx2 token.
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), self.0) }
    }
}

impl LaneVector for I32x8 {
    type Lane = i32;
    type Backend = Avx2;
    const LANES: usize = 8;

    #[inline(always)]
    fn backend(&self) -> Avx2 {
        Avx2 { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [i32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { _mm256_storeu_si256(out.as_mut_ptr().cast(), self.0) }
    }
}

impl LaneVector for U32x8 {
    type Lane = u32;
    type Backend = Avx2;
    const LANES: usize = 8;

    #[inline(always)]
    fn backend(&self) -> Avx2 {
        Avx2 { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [u32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { _mm256_storeu_si256(out.as_mut_ptr().cast(), self.0) }
    }
}

impl MaskVector for F32x8 {
    #[inline(always)]
    fn load(backend: Avx2, src: &[f32]) -> Self {
        backend.load_f32(src)
    }
}

impl ToFloatMask for I32x8 {
    type Mask = F32x8;

    #[inline(always)]
    fn to_float_mask(self) -> F32x8 {
        // SAFETY: this register could only be loaded with an Avx2 token.
        unsafe { F32x8(nonzero_lanes_avx2(self.0)) }
    }
}

impl ToFloatMask for U32x8 {
    type Mask = F32x8;

    #[inline(always)]
    fn to_float_mask(self) -> F32x8 {
        to_float_mask_generic(self)
    }
}

impl ToFloatMask for F32x8 {
    type Mask = F32x8;

    #[inline(always)]
    fn to_float_mask(self) -> F32x8 {
        to_float_mask_generic(self)
    }
}

// ============================================================================
// AVX-512 Backend
// ============================================================================

/// AVX-512F token (16 lanes). Only obtainable on CPUs that report AVX-512F.
#[derive(Copy, Clone, Debug)]
pub struct Avx512 {
    _detected: (),
}

impl Avx512 {
    pub fn try_new() -> Option<Self> {
        cpu_features()
            .contains(CpuFeatures::AVX512F)
            .then_some(Avx512 { _detected: () })
    }
}

impl Backend for Avx512 {
    const LANES: usize = 16;
    const ISA: IsaLevel = IsaLevel::Avx512;

    type F32 = F32x16;
    type I32 = I32x16;
    type U32 = U32x16;

    #[inline(always)]
    fn load_i32(self, src: &[i32]) -> I32x16 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: the token proves AVX-512F; the length was checked.
        unsafe { I32x16(_mm512_loadu_si512(src.as_ptr().cast())) }
    }

    #[inline(always)]
    fn load_u32(self, src: &[u32]) -> U32x16 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { U32x16(_mm512_loadu_si512(src.as_ptr().cast())) }
    }

    #[inline(always)]
    fn load_f32(self, src: &[f32]) -> F32x16 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { F32x16(_mm512_loadu_ps(src.as_ptr())) }
    }

    #[inline]
    fn i32_masks_body(self, src: &[i32], dst: &mut [f32]) {
        assert!(src.len() % Self::LANES == 0 && dst.len() >= src.len());
        // SAFETY: the token proves AVX-512F; lengths were checked.
        unsafe { i32_masks_avx512(src, dst) }
    }
}

/// All-ones for nonzero lanes, zero otherwise.
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn nonzero_lanes_avx512(v: __m512i) -> __m512 {
    // Bit i of `nonzero` is set when lane i has any bit set.
    let nonzero = _mm512_test_epi32_mask(v, v);
    _mm512_castsi512_ps(_mm512_maskz_set1_epi32(nonzero, -1))
}

/// Whole-register loop; `src.len()` is a multiple of 16 and `dst` is at least as long.
#[target_feature(enable = "avx512f")]
unsafe fn i32_masks_avx512(src: &[i32], dst: &mut [f32]) {
    for (s, d) in src.chunks_exact(16).zip(dst.chunks_exact_mut(16)) {
        let v = _mm512_loadu_si512(s.as_ptr().cast());
        _mm512_storeu_ps(d.as_mut_ptr(), nonzero_lanes_avx512(v));
    }
}

/// 16-lane f32 register for AVX-512.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct F32x16(__m512);

/// 16-lane i32 register for AVX-512.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct I32x16(__m512i);

/// 16-lane u32 register for AVX-512.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct U32x16(__m512i);

impl F32x16 {
    #[inline(always)]
    pub fn to_array(self) -> [f32; 16] {
        let mut arr = [0.0f32; 16];
        self.store(&mut arr);
        arr
    }
}

impl I32x16 {
    #[inline(always)]
    pub fn to_array(self) -> [i32; 16] {
        let mut arr = [0i32; 16];
        self.store(&mut arr);
        arr
    }
}

impl U32x16 {
    #[inline(always)]
    pub fn to_array(self) -> [u32; 16] {
        let mut arr = [0u32; 16];
        self.store(&mut arr);
        arr
    }
}

impl Debug for F32x16 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "F32x16({:?})", self.to_array())
    }
}

impl Debug for I32x16 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "I32x16({:?})", self.to_array())
    }
}

impl Debug for U32x16 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "U32x16({:?})", self.to_array())
    }
}

impl LaneVector for F32x16 {
    type Lane = f32;
    type Backend = Avx512;
    const LANES: usize = 16;

    #[inline(always)]
    fn backend(&self) -> Avx512 {
        Avx512 { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [f32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: this register could only be loaded with an Avx512 token.
        unsafe { _mm512_storeu_ps(out.as_mut_ptr(), self.0) }
    }
}

impl LaneVector for I32x16 {
    type Lane = i32;
    type Backend = Avx512;
    const LANES: usize = 16;

    #[inline(always)]
    fn backend(&self) -> Avx512 {
        Avx512 { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [i32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { _mm512_storeu_si512(out.as_mut_ptr().cast(), self.0) }
    }
}

impl LaneVector for U32x16 {
    type Lane = u32;
    type Backend = Avx512;
    const LANES: usize = 16;

    #[inline(always)]
    fn backend(&self) -> Avx512 {
        Avx512 { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [u32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { _mm512_storeu_si512(out.as_mut_ptr().cast(), self.0) }
    }
}

impl MaskVector for F32x16 {
    #[inline(always)]
    fn load(backend: Avx512, src: &[f32]) -> Self {
        backend.load_f32(src)
    }
}

impl ToFloatMask for I32x16 {
    type Mask = F32x16;

    #[inline(always)]
    fn to_float_mask(self) -> F32x16 {
        // SAFETY: this register could only be loaded with an Avx512 token.
        unsafe { F32x16(nonzero_lanes_avx512(self.0)) }
    }
}

impl ToFloatMask for U32x16 {
    type Mask = F32x16;

    #[inline(always)]
    fn to_float_mask(self) -> F32x16 {
        to_float_mask_generic(self)
    }
}

impl ToFloatMask for F32x16 {
    type Mask = F32x16;

    #[inline(always)]
    fn to_float_mask(self) -> F32x16 {
        to_float_mask_generic(self)
    }
}

// src/simd/arm.rs

//! aarch64 NEON backend (4 lanes).

use super::{to_float_mask_generic, Backend, LaneVector, MaskVector, ToFloatMask};
use crate::cpu::{cpu_features, CpuFeatures, IsaLevel};
use core::arch::aarch64::*;
use core::fmt::{Debug, Formatter};

/// NEON token (4 lanes). NEON is baseline on aarch64, but the token still
/// goes through detection like the x86 ones.
#[derive(Copy, Clone, Debug)]
pub struct Neon {
    _detected: (),
}

impl Neon {
    pub fn try_new() -> Option<Self> {
        cpu_features()
            .contains(CpuFeatures::NEON)
            .then_some(Neon { _detected: () })
    }
}

impl Backend for Neon {
    const LANES: usize = 4;
    const ISA: IsaLevel = IsaLevel::Neon;

    type F32 = F32x4;
    type I32 = I32x4;
    type U32 = U32x4;

    #[inline(always)]
    fn load_i32(self, src: &[i32]) -> I32x4 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: the token proves NEON; the length was checked.
        unsafe { I32x4(vld1q_s32(src.as_ptr())) }
    }

    #[inline(always)]
    fn load_u32(self, src: &[u32]) -> U32x4 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { U32x4(vld1q_u32(src.as_ptr())) }
    }

    #[inline(always)]
    fn load_f32(self, src: &[f32]) -> F32x4 {
        assert!(src.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { F32x4(vld1q_f32(src.as_ptr())) }
    }
}

/// 4-lane f32 register for NEON.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct F32x4(float32x4_t);

/// 4-lane i32 register for NEON.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct I32x4(int32x4_t);

/// 4-lane u32 register for NEON.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct U32x4(uint32x4_t);

impl F32x4 {
    #[inline(always)]
    pub fn to_array(self) -> [f32; 4] {
        let mut arr = [0.0f32; 4];
        self.store(&mut arr);
        arr
    }
}

impl I32x4 {
    #[inline(always)]
    pub fn to_array(self) -> [i32; 4] {
        let mut arr = [0i32; 4];
        self.store(&mut arr);
        arr
    }
}

impl U32x4 {
    #[inline(always)]
    pub fn to_array(self) -> [u32; 4] {
        let mut arr = [0u32; 4];
        self.store(&mut arr);
        arr
    }
}

impl Debug for F32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "F32x4({:?})", self.to_array())
    }
}

impl Debug for I32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "I32x4({:?})", self.to_array())
    }
}

impl Debug for U32x4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "U32x4({:?})", self.to_array())
    }
}

impl LaneVector for F32x4 {
    type Lane = f32;
    type Backend = Neon;
    const LANES: usize = 4;

    #[inline(always)]
    fn backend(&self) -> Neon {
        Neon { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [f32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: this register could only be loaded with a Neon token.
        unsafe { vst1q_f32(out.as_mut_ptr(), self.0) }
    }
}

impl LaneVector for I32x4 {
    type Lane = i32;
    type Backend = Neon;
    const LANES: usize = 4;

    #[inline(always)]
    fn backend(&self) -> Neon {
        Neon { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [i32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { vst1q_s32(out.as_mut_ptr(), self.0) }
    }
}

impl LaneVector for U32x4 {
    type Lane = u32;
    type Backend = Neon;
    const LANES: usize = 4;

    #[inline(always)]
    fn backend(&self) -> Neon {
        Neon { _detected: () }
    }

    #[inline(always)]
    fn store(self, out: &mut [u32]) {
        assert!(out.len() >= Self::LANES);
        // SAFETY: as above.
        unsafe { vst1q_u32(out.as_mut_ptr(), self.0) }
    }
}

impl MaskVector for F32x4 {
    #[inline(always)]
    fn load(backend: Neon, src: &[f32]) -> Self {
        backend.load_f32(src)
    }
}

impl ToFloatMask for I32x4 {
    type Mask = F32x4;

    #[inline(always)]
    fn to_float_mask(self) -> F32x4 {
        // SAFETY: this register could only be loaded with a Neon token.
        // vtst sets a lane to all-ones when (a & b) != 0.
        unsafe { F32x4(vreinterpretq_f32_u32(vtstq_s32(self.0, self.0))) }
    }
}

impl ToFloatMask for U32x4 {
    type Mask = F32x4;

    #[inline(always)]
    fn to_float_mask(self) -> F32x4 {
        to_float_mask_generic(self)
    }
}

impl ToFloatMask for F32x4 {
    type Mask = F32x4;

    #[inline(always)]
    fn to_float_mask(self) -> F32x4 {
        to_float_mask_generic(self)
    }
}

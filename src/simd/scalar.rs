// src/simd/scalar.rs

//! Scalar backend (LANES=1). Always available; the reference the vector
//! backends are checked against.

use super::{to_float_mask_generic, Backend, LaneVector, MaskVector, ToFloatMask};
use crate::cpu::IsaLevel;
use crate::mask::mask_bits;

/// A scalar backend with 1 lane.
#[derive(Copy, Clone, Debug, Default)]
pub struct Scalar;

impl Backend for Scalar {
    const LANES: usize = 1;
    const ISA: IsaLevel = IsaLevel::Scalar;

    type F32 = ScalarBatch<f32>;
    type I32 = ScalarBatch<i32>;
    type U32 = ScalarBatch<u32>;

    #[inline(always)]
    fn load_i32(self, src: &[i32]) -> ScalarBatch<i32> {
        ScalarBatch(src[0])
    }

    #[inline(always)]
    fn load_u32(self, src: &[u32]) -> ScalarBatch<u32> {
        ScalarBatch(src[0])
    }

    #[inline(always)]
    fn load_f32(self, src: &[f32]) -> ScalarBatch<f32> {
        ScalarBatch(src[0])
    }
}

/// A batch containing a single value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(transparent)]
pub struct ScalarBatch<T>(pub T);

macro_rules! impl_scalar_lane {
    ($t:ty) => {
        impl LaneVector for ScalarBatch<$t> {
            type Lane = $t;
            type Backend = Scalar;
            const LANES: usize = 1;

            #[inline(always)]
            fn backend(&self) -> Scalar {
                Scalar
            }

            #[inline(always)]
            fn store(self, out: &mut [$t]) {
                out[0] = self.0;
            }
        }
    };
}

impl_scalar_lane!(f32);
impl_scalar_lane!(i32);
impl_scalar_lane!(u32);

impl MaskVector for ScalarBatch<f32> {
    #[inline(always)]
    fn load(_backend: Scalar, src: &[f32]) -> Self {
        ScalarBatch(src[0])
    }
}

impl ToFloatMask for ScalarBatch<i32> {
    type Mask = ScalarBatch<f32>;

    #[inline(always)]
    fn to_float_mask(self) -> ScalarBatch<f32> {
        ScalarBatch(mask_bits(self.0 != 0))
    }
}

impl ToFloatMask for ScalarBatch<u32> {
    type Mask = ScalarBatch<f32>;

    #[inline(always)]
    fn to_float_mask(self) -> ScalarBatch<f32> {
        to_float_mask_generic(self)
    }
}

impl ToFloatMask for ScalarBatch<f32> {
    type Mask = ScalarBatch<f32>;

    #[inline(always)]
    fn to_float_mask(self) -> ScalarBatch<f32> {
        to_float_mask_generic(self)
    }
}

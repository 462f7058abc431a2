// src/alias.rs

//! Maps each scalar type to an integer type of identical width.
//!
//! Hardware atomics and vector blend masks work on integer bit patterns, so
//! every float type gets an unsigned alias it can be punned to:
//!
//! ```text
//! f32  -> u32
//! f64  -> u64
//! f16  -> u16
//! bf16 -> u16
//! ```
//!
//! Integer types alias to themselves. The alias is never used for
//! arithmetic, only to move bits around.

use core::fmt::Debug;
use half::{bf16, f16};

/// A scalar with an equal-width integer view of its bits.
pub trait AsInteger: Copy + Send + Sync + 'static {
    /// Integer type with the same size as `Self`.
    type Int: Copy + Eq + Debug + Send + Sync + 'static;

    /// Every bit set. Reinterpreted as a float this is a NaN pattern.
    const ALL_ONES: Self::Int;

    /// Every bit clear (`0.0` for floats).
    const ALL_ZEROS: Self::Int;

    fn to_int_bits(self) -> Self::Int;

    fn from_int_bits(bits: Self::Int) -> Self;
}

macro_rules! impl_float_alias {
    ($t:ty, $int:ty) => {
        const _: () = assert!(core::mem::size_of::<$t>() == core::mem::size_of::<$int>());

        impl AsInteger for $t {
            type Int = $int;
            const ALL_ONES: $int = <$int>::MAX;
            const ALL_ZEROS: $int = 0;

            #[inline(always)]
            fn to_int_bits(self) -> $int {
                self.to_bits()
            }

            #[inline(always)]
            fn from_int_bits(bits: $int) -> Self {
                <$t>::from_bits(bits)
            }
        }
    };
}

// Integers are their own alias; `!0` is the all-ones pattern for both signednesses.
macro_rules! impl_identity_alias {
    ($t:ty) => {
        impl AsInteger for $t {
            type Int = $t;
            const ALL_ONES: $t = !0;
            const ALL_ZEROS: $t = 0;

            #[inline(always)]
            fn to_int_bits(self) -> $t {
                self
            }

            #[inline(always)]
            fn from_int_bits(bits: $t) -> Self {
                bits
            }
        }
    };
}

impl_float_alias!(f32, u32);
impl_float_alias!(f64, u64);
impl_float_alias!(f16, u16);
impl_float_alias!(bf16, u16);

impl_identity_alias!(i32);
impl_identity_alias!(u32);
impl_identity_alias!(i64);
impl_identity_alias!(u64);

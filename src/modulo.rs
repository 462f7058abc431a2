// src/modulo.rs

//! Type-generic modulo.
//!
//! Integers get the truncating remainder, floats get `fmod` (the result
//! carries the sign of the dividend). The choice is made per type at compile
//! time; there is no runtime branch.

use half::{bf16, f16};

/// Remainder with the semantics native to the operand's domain.
pub trait Modulo: Copy {
    fn modulo(self, rhs: Self) -> Self;
}

/// `a mod b` for any supported scalar.
///
/// # Panics
/// Integer division by zero panics, as Rust's `%` does. So does
/// `MIN % -1` on signed integers, whose quotient overflows. Float division
/// by zero returns NaN.
#[inline(always)]
pub fn modulo<T: Modulo>(a: T, b: T) -> T {
    a.modulo(b)
}

macro_rules! impl_modulo_native {
    ($($t:ty),*) => {
        $(
            impl Modulo for $t {
                #[inline(always)]
                fn modulo(self, rhs: Self) -> Self {
                    self % rhs
                }
            }
        )*
    };
}

// Rust's `%` is truncating for integers and fmod for floats.
impl_modulo_native!(i32, u32, i64, u64, f32, f64);

macro_rules! impl_modulo_half {
    ($t:ty) => {
        impl Modulo for $t {
            #[inline(always)]
            fn modulo(self, rhs: Self) -> Self {
                <$t>::from_f32(self.to_f32() % rhs.to_f32())
            }
        }
    };
}

impl_modulo_half!(f16);
impl_modulo_half!(bf16);

// src/mask.rs

//! Flag → float mask conversion, scalar and batch forms.
//!
//! Vector select/blend instructions test mask bits, not values, so a true
//! flag becomes a float slot with every bit set and a false flag becomes
//! `0.0`. The destination is written through its integer alias; the all-ones
//! pattern reads back as NaN and must never be compared numerically.
//!
//! The register-level forms live in [`crate::simd`].

use crate::alias::AsInteger;

/// A value with a truthiness: non-zero is true.
pub trait Flag: Copy + Default {
    fn is_set(self) -> bool;
}

impl Flag for bool {
    #[inline(always)]
    fn is_set(self) -> bool {
        self
    }
}

macro_rules! impl_flag_int {
    ($($t:ty),*) => {
        $(
            impl Flag for $t {
                #[inline(always)]
                fn is_set(self) -> bool {
                    self != 0
                }
            }
        )*
    };
}

impl_flag_int!(u8, i32, u32);

impl Flag for f32 {
    /// `-0.0` is false, NaN is true.
    #[inline(always)]
    fn is_set(self) -> bool {
        self != 0.0
    }
}

/// The mask pattern for `flag` in a `D` slot.
#[inline(always)]
pub fn mask_bits<D: AsInteger>(flag: bool) -> D {
    D::from_int_bits(if flag { D::ALL_ONES } else { D::ALL_ZEROS })
}

/// Writes the mask for one flag.
#[inline(always)]
pub fn flag_to_float<S: Flag, D: AsInteger>(src: S, dst: &mut D) {
    *dst = mask_bits(src.is_set());
}

/// Converts `src.len()` flags into masks, position by position.
///
/// # Panics
/// Panics if `dst` is shorter than `src`.
#[inline]
pub fn flag_to_float_batch<S: Flag, D: AsInteger>(src: &[S], dst: &mut [D]) {
    assert!(
        dst.len() >= src.len(),
        "mask destination holds {} slots, need {}",
        dst.len(),
        src.len()
    );
    for (s, d) in src.iter().zip(dst.iter_mut()) {
        flag_to_float(*s, d);
    }
}

/// Broadcasts one flag's mask into every slot of `dst`.
#[inline]
pub fn splat_flag_to_float<S: Flag, D: AsInteger>(src: S, dst: &mut [D]) {
    dst.fill(mask_bits(src.is_set()));
}

// src/atomic.rs

//! Lock-free `+=` for scalar types without a native atomic add.
//!
//! The slot is viewed as an atomic integer of the same width (see
//! [`crate::alias`]). Each attempt loads the current bits, decodes them,
//! adds in the value's own domain, re-encodes, and publishes with a
//! compare-exchange on the integer view. A failed exchange means another
//! writer got there first; we spin briefly and retry with the bits it left.
//!
//! There is no retry bound and no fallback lock. Under adversarial
//! contention a caller can spin indefinitely; reduction kernels only see
//! light to moderate contention.

use core::fmt::{Debug, Formatter};
use core::mem::size_of;
use core::sync::atomic::{AtomicI32, AtomicI64, AtomicU16, AtomicU32, AtomicU64, Ordering};
use half::{bf16, f16};

use crate::alias::AsInteger;

/// Uniform interface over the std atomic integers used as alias cells.
pub trait AtomicCell: Send + Sync + Sized {
    type Value: Copy + Eq;

    fn new(value: Self::Value) -> Self;

    fn load(&self, order: Ordering) -> Self::Value;

    fn store(&self, value: Self::Value, order: Ordering);

    fn compare_exchange_weak(
        &self,
        current: Self::Value,
        new: Self::Value,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self::Value, Self::Value>;

    fn into_inner(self) -> Self::Value;

    /// # Safety
    /// `ptr` must be valid for reads and writes for `'a`, aligned to
    /// `align_of::<Self>()`, and only accessed atomically while the
    /// reference lives.
    unsafe fn from_ptr<'a>(ptr: *mut Self::Value) -> &'a Self;
}

macro_rules! impl_atomic_cell {
    ($atomic:ty, $int:ty) => {
        impl AtomicCell for $atomic {
            type Value = $int;

            #[inline(always)]
            fn new(value: $int) -> Self {
                <$atomic>::new(value)
            }

            #[inline(always)]
            fn load(&self, order: Ordering) -> $int {
                <$atomic>::load(self, order)
            }

            #[inline(always)]
            fn store(&self, value: $int, order: Ordering) {
                <$atomic>::store(self, value, order)
            }

            #[inline(always)]
            fn compare_exchange_weak(
                &self,
                current: $int,
                new: $int,
                success: Ordering,
                failure: Ordering,
            ) -> Result<$int, $int> {
                <$atomic>::compare_exchange_weak(self, current, new, success, failure)
            }

            #[inline(always)]
            fn into_inner(self) -> $int {
                <$atomic>::into_inner(self)
            }

            #[inline(always)]
            unsafe fn from_ptr<'a>(ptr: *mut $int) -> &'a Self {
                // SAFETY: forwarded to the caller.
                unsafe { <$atomic>::from_ptr(ptr) }
            }
        }
    };
}

impl_atomic_cell!(AtomicU16, u16);
impl_atomic_cell!(AtomicU32, u32);
impl_atomic_cell!(AtomicU64, u64);
impl_atomic_cell!(AtomicI32, i32);
impl_atomic_cell!(AtomicI64, i64);

/// A scalar that can be accumulated through its integer alias.
pub trait AtomicAdd: AsInteger {
    /// Atomic integer cell punned over the value's storage.
    type Atomic: AtomicCell<Value = Self::Int>;

    /// Fails the build for any implementation whose cell is not exactly as
    /// wide as the value. Evaluated at each monomorphization that uses it.
    const WIDTH_MATCHES: () = assert!(
        size_of::<Self::Atomic>() == size_of::<Self>(),
        "atomic alias must be exactly as wide as the value"
    );

    /// The reduction step: `self + rhs` in the value's own domain.
    fn accumulate(self, rhs: Self) -> Self;
}

macro_rules! impl_atomic_add_float {
    ($t:ty, $atomic:ty) => {
        impl AtomicAdd for $t {
            type Atomic = $atomic;

            #[inline(always)]
            fn accumulate(self, rhs: Self) -> Self {
                self + rhs
            }
        }
    };
}

macro_rules! impl_atomic_add_half {
    ($t:ty) => {
        impl AtomicAdd for $t {
            type Atomic = AtomicU16;

            #[inline(always)]
            fn accumulate(self, rhs: Self) -> Self {
                <$t>::from_f32(self.to_f32() + rhs.to_f32())
            }
        }
    };
}

// Integer slots wrap like the hardware add would.
macro_rules! impl_atomic_add_int {
    ($t:ty, $atomic:ty) => {
        impl AtomicAdd for $t {
            type Atomic = $atomic;

            #[inline(always)]
            fn accumulate(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }
        }
    };
}

impl_atomic_add_float!(f32, AtomicU32);
impl_atomic_add_float!(f64, AtomicU64);
impl_atomic_add_half!(f16);
impl_atomic_add_half!(bf16);
impl_atomic_add_int!(i32, AtomicI32);
impl_atomic_add_int!(u32, AtomicU32);
impl_atomic_add_int!(i64, AtomicI64);
impl_atomic_add_int!(u64, AtomicU64);

/// The retry loop. Returns the value that was replaced.
#[inline]
fn add_in_place<T: AtomicAdd>(cell: &T::Atomic, offset: T) -> T {
    let () = T::WIDTH_MATCHES;

    let mut expected = cell.load(Ordering::Relaxed);
    loop {
        let desired = T::from_int_bits(expected).accumulate(offset).to_int_bits();
        match cell.compare_exchange_weak(expected, desired, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(previous) => return T::from_int_bits(previous),
            Err(current) => {
                // PAUSE on x86, YIELD on aarch64.
                std::hint::spin_loop();
                expected = current;
            }
        }
    }
}

/// Atomically performs `*addr += offset`.
///
/// This is the entry point generated kernels call with raw tensor pointers.
/// Atomicity holds against every other caller updating the same location
/// through this function or [`AtomicFloat`].
///
/// # Safety
/// - `addr` must be valid for reads and writes for the whole call and must
///   not be freed concurrently.
/// - `addr` must be aligned to the alias cell (`align_of::<T::Atomic>()`),
///   which can be stricter than `align_of::<T>()` for 64-bit types on
///   32-bit targets.
/// - Concurrent accesses to `*addr` must all be atomic.
#[inline]
pub unsafe fn atomic_add<T: AtomicAdd>(addr: *mut T, offset: T) {
    debug_assert!(addr.cast::<T::Atomic>().is_aligned(), "misaligned atomic_add target");
    // SAFETY: validity, alignment and atomic-only access are the caller's contract.
    let cell = unsafe { T::Atomic::from_ptr(addr.cast::<T::Int>()) };
    add_in_place::<T>(cell, offset);
}

/// A shared accumulation slot with a safe API.
///
/// Layout-compatible with `T` (it wraps the equal-width atomic integer), so a
/// `&mut [T]` tensor buffer can be shared across threads with
/// [`AtomicFloat::from_mut_slice`].
#[repr(transparent)]
pub struct AtomicFloat<T: AtomicAdd>(T::Atomic);

impl<T: AtomicAdd> AtomicFloat<T> {
    pub fn new(value: T) -> Self {
        let () = T::WIDTH_MATCHES;
        Self(T::Atomic::new(value.to_int_bits()))
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> T {
        T::from_int_bits(self.0.load(order))
    }

    #[inline]
    pub fn store(&self, value: T, order: Ordering) {
        self.0.store(value.to_int_bits(), order)
    }

    /// Adds `offset` and returns the previous value.
    #[inline]
    pub fn fetch_add(&self, offset: T) -> T {
        add_in_place::<T>(&self.0, offset)
    }

    pub fn into_inner(self) -> T {
        T::from_int_bits(self.0.into_inner())
    }

    /// Views an exclusively borrowed buffer as shared accumulation slots.
    ///
    /// # Panics
    /// Panics if the buffer is not aligned for the alias cell. This only
    /// happens for 64-bit values on targets where `u64` is less aligned than
    /// `AtomicU64`.
    pub fn from_mut_slice(slice: &mut [T]) -> &[Self] {
        let () = T::WIDTH_MATCHES;
        assert!(
            slice.as_ptr().cast::<T::Atomic>().is_aligned(),
            "buffer is not aligned for atomic access"
        );
        // SAFETY: `Self` is a transparent wrapper over a cell of the same
        // size as `T`, alignment was checked above, and the exclusive borrow
        // guarantees all access for the returned lifetime goes through it.
        unsafe { core::slice::from_raw_parts(slice.as_mut_ptr().cast::<Self>(), slice.len()) }
    }
}

impl<T: AtomicAdd + Default> Default for AtomicFloat<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: AtomicAdd + Debug> Debug for AtomicFloat<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "AtomicFloat({:?})", self.load(Ordering::Relaxed))
    }
}

// src/lib.rs

//! Runtime primitives for generated numeric kernels.
//!
//! Everything here is called per element (or per vector register) from loop
//! bodies produced by a code generator:
//!
//! - [`modulo`]: `%` with integer or `fmod` semantics picked by type.
//! - [`alias`]: the float → equal-width integer mapping used for bit tricks.
//! - [`atomic`]: lock-free `+=` into shared float slots.
//! - [`random`]: stateless uniform/normal draws keyed by `(seed, offset)`.
//! - [`mask`] and [`simd`]: flags → all-ones/all-zeros float masks.
//!
//! The only process-wide state is the detected CPU feature set and the
//! configuration, both computed once and read-only afterwards.

pub mod alias;
pub mod atomic;
pub mod config;
pub mod cpu;
pub mod mask;
pub mod modulo;
pub mod philox;
pub mod random;
pub mod simd;

pub use alias::AsInteger;
pub use atomic::{atomic_add, AtomicAdd, AtomicFloat};
pub use config::{Config, CONFIG};
pub use cpu::{cpu_features, isa_level, CpuFeatures, IsaLevel};
pub use mask::{flag_to_float, flag_to_float_batch, mask_bits, splat_flag_to_float, Flag};
pub use modulo::{modulo, Modulo};
pub use philox::Philox4x32;
pub use random::{normalized_rand, randint64, randn, uint32_to_uniform_float};
pub use simd::{flags_to_float_mask, to_float_mask_generic, ToFloatMask};

pub use half::{bf16, f16};

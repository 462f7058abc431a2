// src/cpu.rs

//! CPU feature detection and vector backend selection.
//!
//! Features are probed once per process. The backend used by the mask
//! dispatcher is derived from them and from [`crate::config::CONFIG`], then
//! cached; callers never pay for detection on a hot path.

use bitflags::bitflags;
use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::{SimdConfig, CONFIG};

bitflags! {
    /// Vector instruction sets relevant to the mask backends.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CpuFeatures: u32 {
        const AVX2    = 1 << 0;
        const AVX512F = 1 << 1;
        const NEON    = 1 << 2;
    }
}

impl CpuFeatures {
    /// Probes the running CPU.
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        let mut features = CpuFeatures::empty();
        if std::arch::is_x86_feature_detected!("avx2") {
            features |= CpuFeatures::AVX2;
        }
        if std::arch::is_x86_feature_detected!("avx512f") {
            features |= CpuFeatures::AVX512F;
        }
        features
    }

    /// Probes the running CPU.
    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Self {
        if std::arch::is_aarch64_feature_detected!("neon") {
            CpuFeatures::NEON
        } else {
            CpuFeatures::empty()
        }
    }

    /// Probes the running CPU. No vector backends exist for this architecture.
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn detect() -> Self {
        CpuFeatures::empty()
    }
}

/// The backend the mask dispatcher runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsaLevel {
    Scalar,
    Avx2,
    Avx512,
    Neon,
}

impl IsaLevel {
    /// Picks the widest backend the features and config allow.
    pub fn select(features: CpuFeatures, config: &SimdConfig) -> Self {
        if config.force_scalar {
            IsaLevel::Scalar
        } else if features.contains(CpuFeatures::AVX512F) && config.allow_avx512 {
            IsaLevel::Avx512
        } else if features.contains(CpuFeatures::AVX2) {
            IsaLevel::Avx2
        } else if features.contains(CpuFeatures::NEON) {
            IsaLevel::Neon
        } else {
            IsaLevel::Scalar
        }
    }

    /// f32 lanes per register.
    pub fn lanes(self) -> usize {
        match self {
            IsaLevel::Scalar => 1,
            IsaLevel::Neon => 4,
            IsaLevel::Avx2 => 8,
            IsaLevel::Avx512 => 16,
        }
    }
}

static CPU_FEATURES: Lazy<CpuFeatures> = Lazy::new(|| {
    let features = CpuFeatures::detect();
    debug!("Detected CPU features: {:?}", features);
    features
});

static ISA_LEVEL: Lazy<IsaLevel> = Lazy::new(|| {
    let level = IsaLevel::select(*CPU_FEATURES, &CONFIG.simd);
    info!(
        "Mask backend: {:?} ({} lanes), features {:?}",
        level,
        level.lanes(),
        *CPU_FEATURES
    );
    level
});

/// Features of the running CPU, probed on first call.
pub fn cpu_features() -> CpuFeatures {
    *CPU_FEATURES
}

/// The backend selected for this process.
pub fn isa_level() -> IsaLevel {
    *ISA_LEVEL
}

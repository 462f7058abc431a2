// src/config.rs

//! Process-wide settings for the primitives.
//!
//! The primitives themselves are pure; the only tunable is which vector
//! backend the mask dispatcher may use. Settings come from the environment:
//!
//! - `KERNEL_PRIMS_CONFIG`: a JSON document matching [`Config`].
//! - `KERNEL_PRIMS_FORCE_SCALAR`: overrides `simd.force_scalar`
//!   (`1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`).
//!
//! Missing fields take their defaults, so `{}` is a valid document.

use anyhow::{anyhow, Context, Result};
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Environment variable holding a JSON [`Config`].
pub const CONFIG_ENV_VAR: &str = "KERNEL_PRIMS_CONFIG";

/// Environment variable overriding [`SimdConfig::force_scalar`].
pub const FORCE_SCALAR_ENV_VAR: &str = "KERNEL_PRIMS_FORCE_SCALAR";

/// Global configuration, loaded from the environment on first use.
///
/// An invalid environment is logged and replaced by the defaults; the
/// primitives never fail because of configuration.
pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::from_env().unwrap_or_else(|e| {
        warn!("Ignoring invalid kernel-prims configuration: {:#}", e);
        Config::default()
    })
});

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Vector backend selection.
    pub simd: SimdConfig,
}

// --- SIMD Configuration ---

/// Limits on which vector backend the dispatcher may pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimdConfig {
    /// Use the portable scalar path even when vector units are present.
    pub force_scalar: bool,
    /// Permit the 16-lane AVX-512 backend. When false, AVX-512 machines use AVX2.
    pub allow_avx512: bool,
}

impl Default for SimdConfig {
    fn default() -> Self {
        SimdConfig {
            force_scalar: false,
            allow_avx512: true,
        }
    }
}

impl Config {
    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse kernel-prims config JSON")
    }

    /// Builds the configuration from [`CONFIG_ENV_VAR`] and [`FORCE_SCALAR_ENV_VAR`].
    pub fn from_env() -> Result<Self> {
        let json = std::env::var(CONFIG_ENV_VAR).ok();
        let force_scalar = std::env::var(FORCE_SCALAR_ENV_VAR).ok();
        Self::from_sources(json.as_deref(), force_scalar.as_deref())
    }

    fn from_sources(json: Option<&str>, force_scalar: Option<&str>) -> Result<Self> {
        let mut config = match json {
            Some(text) if !text.trim().is_empty() => {
                Self::from_json(text).with_context(|| format!("while reading {}", CONFIG_ENV_VAR))?
            }
            _ => Config::default(),
        };
        if let Some(value) = force_scalar {
            config.simd.force_scalar = parse_switch(value)
                .with_context(|| format!("while reading {}", FORCE_SCALAR_ENV_VAR))?;
        }
        Ok(config)
    }
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean switch, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_allow_every_backend() {
        let config = Config::default();
        assert!(!config.simd.force_scalar);
        assert!(config.simd.allow_avx512);
    }

    #[test_log::test]
    fn empty_document_uses_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::from_json(r#"{"simd": {}}"#).unwrap(), Config::default());
    }

    #[test_log::test]
    fn partial_document_keeps_other_defaults() {
        let config = Config::from_json(r#"{"simd": {"allow_avx512": false}}"#).unwrap();
        assert!(!config.simd.allow_avx512);
        assert!(!config.simd.force_scalar);
    }

    #[test_log::test]
    fn malformed_document_is_an_error() {
        let err = Config::from_json(r#"{"simd": {"force_scalar": "maybe"}}"#).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test_log::test]
    fn switch_overrides_document() {
        let config =
            Config::from_sources(Some(r#"{"simd": {"force_scalar": false}}"#), Some("on")).unwrap();
        assert!(config.simd.force_scalar);

        let config = Config::from_sources(None, Some(" 0 ")).unwrap();
        assert!(!config.simd.force_scalar);
    }

    #[test_log::test]
    fn bad_switch_names_the_variable() {
        let err = Config::from_sources(None, Some("sometimes")).unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.contains(FORCE_SCALAR_ENV_VAR), "{}", text);
        assert!(text.contains("sometimes"), "{}", text);
    }

    #[test_log::test]
    fn config_serializes_round_trip() {
        let config = Config {
            simd: SimdConfig {
                force_scalar: true,
                allow_avx512: false,
            },
        };
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(Config::from_json(&text).unwrap(), config);
    }
}

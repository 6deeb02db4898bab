//! Centralized configuration for the descriptor sniffer.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - `SnifferConfig::from_env()` reads FRMDEF_* variables; builder-style setters override them.
//!
//! Defaults:
//! - legacy_fallback = true (old descriptors with dynamic engines still report their engine)
//! - max_image_bytes = 16 MiB (upper bound for whole-file reads on the fallback path)
//! - decode_extra2 = true

use std::fmt;

/// Default cap for whole-image reads.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

/// Tunables for `Sniffer`.
#[derive(Clone, Debug)]
pub struct SnifferConfig {
    /// Read the whole descriptor to find a dynamic engine's name.
    /// Env: FRMDEF_LEGACY_FALLBACK = 0|1|true|false (default true)
    pub legacy_fallback: bool,

    /// Descriptors larger than this are not read in full; the engine error is
    /// `ImageTooLarge` instead.
    /// Env: FRMDEF_MAX_IMAGE_BYTES (default 16 MiB)
    pub max_image_bytes: u64,

    /// Also decode the extra2 segment into `Classification::metadata`.
    /// Env: FRMDEF_DECODE_EXTRA2 = 0|1|true|false (default true)
    pub decode_extra2: bool,
}

impl Default for SnifferConfig {
    fn default() -> Self {
        Self {
            legacy_fallback: true,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            decode_extra2: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let v = std::env::var(name).ok()?;
    let s = v.trim().to_ascii_lowercase();
    Some(s == "1" || s == "true" || s == "yes" || s == "on")
}

impl SnifferConfig {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(on) = env_flag("FRMDEF_LEGACY_FALLBACK") {
            cfg.legacy_fallback = on;
        }

        if let Ok(v) = std::env::var("FRMDEF_MAX_IMAGE_BYTES") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.max_image_bytes = n;
            }
        }

        if let Some(on) = env_flag("FRMDEF_DECODE_EXTRA2") {
            cfg.decode_extra2 = on;
        }

        cfg
    }

    pub fn with_legacy_fallback(mut self, on: bool) -> Self {
        self.legacy_fallback = on;
        self
    }

    pub fn with_max_image_bytes(mut self, bytes: u64) -> Self {
        self.max_image_bytes = bytes;
        self
    }

    pub fn with_decode_extra2(mut self, on: bool) -> Self {
        self.decode_extra2 = on;
        self
    }
}

impl fmt::Display for SnifferConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "legacy_fallback={} max_image_bytes={} decode_extra2={}",
            self.legacy_fallback, self.max_image_bytes, self.decode_extra2
        )
    }
}

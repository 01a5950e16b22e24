//! Decoder configuration: optional overrides resolved against documented
//! defaults.
//!
//! The harness never reads the environment itself. The binary passes the
//! raw `NETWORK` value into [`DecoderConfig::resolve`], so library callers
//! and tests get the same result for the same inputs.

use metadecode_kernel::compression::{DecompressLimits, DEFAULT_MAX_DECOMPRESSED_BYTES};
use metadecode_kernel::recovery::budget::{RecoveryLimits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_STEPS};
use metadecode_registration::address::Network;
use metadecode_registration::normalize::NormalizerConfig;

/// Default cap on raw input size (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Environment variable selecting the network (`0` = testnet).
pub const NETWORK_ENV: &str = "NETWORK";

/// Configuration that can override defaults. `None` means "use default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum recursion depth of one recovery pass. Default 10.
    pub max_depth: Option<u32>,
    /// Node visits shared by one recovery pass. Default 1000.
    pub max_steps: Option<u32>,
    /// Raw input cap in bytes. Default 10 MiB.
    pub max_input_bytes: Option<usize>,
    /// Per-stream decompression cap in bytes. Default 64 MiB.
    pub max_decompressed_bytes: Option<usize>,
    /// Explicit network; wins over the environment value.
    pub network: Option<Network>,
}

/// A [`DecoderConfig`] with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub limits: RecoveryLimits,
    pub max_input_bytes: usize,
    pub network: Network,
}

impl DecoderConfig {
    /// Fill in defaults. `network_env` is the raw `NETWORK` value, if set.
    #[must_use]
    pub fn resolve(&self, network_env: Option<&str>) -> ResolvedConfig {
        ResolvedConfig {
            limits: RecoveryLimits {
                max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
                max_steps: self.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
                decompress: DecompressLimits {
                    max_output_bytes: self
                        .max_decompressed_bytes
                        .unwrap_or(DEFAULT_MAX_DECOMPRESSED_BYTES),
                },
            },
            max_input_bytes: self.max_input_bytes.unwrap_or(DEFAULT_MAX_INPUT_BYTES),
            network: self
                .network
                .unwrap_or_else(|| Network::from_env_value(network_env)),
        }
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        DecoderConfig::default().resolve(None)
    }
}

impl ResolvedConfig {
    #[must_use]
    pub fn normalizer_config(&self) -> NormalizerConfig {
        NormalizerConfig {
            network: self.network,
            limits: self.limits,
        }
    }

    /// Snapshot embedded in every report.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "max_depth": self.limits.max_depth,
            "max_steps": self.limits.max_steps,
            "max_decompressed_bytes": self.limits.decompress.max_output_bytes,
            "max_input_bytes": self.max_input_bytes,
            "network": self.network.label(),
        })
    }
}

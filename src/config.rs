//! Configuration for cidkv
//!
//! Centralized configuration with sensible defaults. Everything the adapter
//! would otherwise keep as process-wide state (the codec tag stamped on
//! derived CIDs, the default batch capacity) is passed in here at
//! construction time.

use crate::error::{CidKvError, Result};
use crate::keys::ETH_STATE_TRIE;

/// Main configuration for a cidkv database
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Content Addressing
    // -------------------------------------------------------------------------
    /// Multicodec tag stamped on every derived CID.
    ///
    /// Lookup is multihash-only, so the tag never affects retrieval; it only
    /// has to be constant across all reads and writes.
    pub codec: u64,

    /// Reject puts whose key is not the keccak-256 digest of the value.
    ///
    /// Off by default: the caller is trusted to supply `key == keccak(value)`.
    pub verify_digests: bool,

    // -------------------------------------------------------------------------
    // Batch Configuration
    // -------------------------------------------------------------------------
    /// Pre-allocated operation capacity for `Database::new_batch` (a hint, not a cap)
    pub batch_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codec: ETH_STATE_TRIE,
            verify_digests: false,
            batch_capacity: 1024,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the multicodec tag used for derived CIDs
    pub fn codec(mut self, codec: u64) -> Self {
        self.config.codec = codec;
        self
    }

    /// Enable or disable keccak-256 verification of `key == hash(value)` on put
    pub fn verify_digests(mut self, verify: bool) -> Self {
        self.config.verify_digests = verify;
        self
    }

    /// Set the default batch capacity
    pub fn batch_capacity(mut self, capacity: usize) -> Self {
        self.config.batch_capacity = capacity;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Parse a multicodec tag given as decimal or `0x`-prefixed hex
///
/// "0x96" → 150, "150" → 150
pub fn parse_codec(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|e| CidKvError::Config(format!("invalid codec {:?}: {}", input, e)))
}

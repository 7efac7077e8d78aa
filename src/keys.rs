//! Key → CID derivation
//!
//! Keys handed to the database are the keccak-256 digests the node already
//! computed for its state/trie data. A key is turned into a CIDv1 by wrapping
//! the digest bytes, unchanged, in a keccak-256 multihash and stamping a fixed
//! codec tag on it.
//!
//! ```text
//! key (32 bytes) ──► multihash [0x1b | 0x20 | key] ──► CIDv1 [codec | multihash]
//! ```
//!
//! The codec tag is the same for every key: block stores index by multihash
//! only, so any constant tag addresses the same block.

use cid::multihash::Multihash;
use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};

use crate::blockstore::Block;
use crate::config::Config;
use crate::error::{CidKvError, Result};

/// Multihash code for keccak-256
pub const KECCAK_256: u64 = 0x1b;

/// Multicodec tag for Ethereum state trie nodes (the default codec)
pub const ETH_STATE_TRIE: u64 = 0x96;

/// Length of a keccak-256 digest, and so of every valid key
pub const KEY_LEN: usize = 32;

/// Derive the CID addressing `key`
///
/// Fails with [`CidKvError::InvalidKey`] if the key is not a 32 byte digest.
pub fn derive_cid(key: &[u8], codec: u64) -> Result<Cid> {
    if key.len() != KEY_LEN {
        return Err(CidKvError::InvalidKey(format!(
            "expected {} byte keccak-256 digest, got {} bytes",
            KEY_LEN,
            key.len()
        )));
    }

    let hash = Multihash::<64>::wrap(KECCAK_256, key)
        .map_err(|e| CidKvError::InvalidKey(e.to_string()))?;

    Ok(Cid::new_v1(codec, hash))
}

/// Compute the keccak-256 digest of `data`
pub fn keccak256(data: &[u8]) -> [u8; KEY_LEN] {
    let hash = Code::Keccak256.digest(data);
    let mut out = [0u8; KEY_LEN];
    out.copy_from_slice(hash.digest());
    out
}

/// CID derivation bound to a database configuration
#[derive(Debug, Clone, Copy)]
pub struct CidDeriver {
    codec: u64,
    verify_digests: bool,
}

impl CidDeriver {
    pub fn new(codec: u64, verify_digests: bool) -> Self {
        Self {
            codec,
            verify_digests,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.codec, config.verify_digests)
    }

    /// The codec tag stamped on derived CIDs
    pub fn codec(&self) -> u64 {
        self.codec
    }

    /// Derive the CID for `key`
    pub fn derive(&self, key: &[u8]) -> Result<Cid> {
        derive_cid(key, self.codec)
    }

    /// Build the block that stores `value` under `key`
    ///
    /// With digest verification off this trusts that `key == keccak256(value)`;
    /// a store that checks content integrity may still reject the block later.
    pub fn block(&self, key: &[u8], value: &[u8]) -> Result<Block> {
        let cid = self.derive(key)?;

        if self.verify_digests {
            let computed = keccak256(value);
            if computed.as_slice() != key {
                return Err(CidKvError::DigestMismatch {
                    expected: hex::encode(key),
                    computed: hex::encode(computed),
                });
            }
        }

        Ok(Block::new(cid, value.to_vec()))
    }
}

impl Default for CidDeriver {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

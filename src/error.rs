//! Error types for cidkv
//!
//! Provides a unified error type for all operations.
//!
//! Callers of the node storage interface pattern-match on the rendered
//! message, so the text of [`CidKvError::BlockNotFound`] always contains
//! "not found" and [`CidKvError::NotSupported`] always reads
//! "this operation is not supported".

use cid::Cid;
use thiserror::Error;

/// Result type alias using CidKvError
pub type Result<T> = std::result::Result<T, CidKvError>;

/// Unified error type for cidkv operations
#[derive(Debug, Error)]
pub enum CidKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("block not found: {0}")]
    BlockNotFound(Cid),

    // -------------------------------------------------------------------------
    // Capability Errors
    // -------------------------------------------------------------------------
    #[error("this operation is not supported")]
    NotSupported,

    #[error("unknown database property: {0}")]
    UnknownProperty(String),

    // -------------------------------------------------------------------------
    // Key Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Digest mismatch: key {expected}, keccak-256 of value {computed}")]
    DigestMismatch { expected: String, computed: String },

    // -------------------------------------------------------------------------
    // Upstream Errors
    // -------------------------------------------------------------------------
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Block store error: {0}")]
    BlockStore(String),

    #[error("Exchange error: {0}")]
    Exchange(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CidKvError {
    /// True when the requested block is absent from the store
    pub fn is_not_found(&self) -> bool {
        matches!(self, CidKvError::BlockNotFound(_))
    }

    /// True when the operation lies outside the flat key-value capability set
    pub fn is_not_supported(&self) -> bool {
        matches!(self, CidKvError::NotSupported)
    }
}

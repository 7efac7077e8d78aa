//! # cidkv
//!
//! An Ethereum-style key-value store served from a content-addressed
//! block store:
//! - Keys (keccak-256 digests) map to CIDs deterministically
//! - Write batches with size accounting and best-effort sequential flush
//! - Ordered prefix iteration through a relational preimage index
//! - Tiered ("ancient") storage is refused with `NotSupported`
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Blockchain Node                        │
//! │            (has / get / put / delete / iterate)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Database                              │
//! │                  (key → CID per call)                        │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!     ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!     │    Batch    │───►│ Block Store │    │ KeyIterator │
//!     │  (buffer)   │    │   (CID)     │    │             │
//!     └─────────────┘    └──────┬──────┘    └──────┬──────┘
//!                               │                  │
//!                               ▼                  ▼
//!                        ┌─────────────┐    ┌─────────────┐
//!                        │  Exchange   │    │  Preimage   │
//!                        │ (optional)  │    │   Index     │
//!                        └─────────────┘    └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keys;
pub mod schema;
pub mod blockstore;
pub mod index;
pub mod interface;
pub mod batch;
pub mod iterator;
pub mod database;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CidKvError, Result};
pub use config::Config;
pub use database::{Database, DatabaseProperty};
pub use batch::Batch;
pub use iterator::KeyIterator;
pub use keys::{derive_cid, keccak256, CidDeriver};
pub use interface::{AncientStore, KeyValueReader, KeyValueWriter};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cidkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

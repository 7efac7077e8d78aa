//! Block Store Module
//!
//! The content-addressed storage the database delegates to.
//!
//! ## Responsibilities
//! - Store and return opaque byte blobs keyed by CID
//! - Report a missing block as [`CidKvError::BlockNotFound`]
//! - Optionally fetch missing blocks from peers ([`BlockService`])
//!
//! ## Implementations
//! - [`MemBlockStore`]: in-memory, for tests and ephemeral nodes
//! - [`SqliteBlockStore`]: `blocks` table in a SQLite file, shared with the
//!   preimage index
//! - [`BlockService`]: wraps a local store with a peer [`Exchange`]
//!
//! [`CidKvError::BlockNotFound`]: crate::CidKvError::BlockNotFound

mod memory;
mod service;
mod sqlite;

use bytes::Bytes;
use cid::Cid;

use crate::error::Result;

pub use memory::MemBlockStore;
pub use service::{BlockService, Exchange};
pub use sqlite::SqliteBlockStore;

/// A (CID, raw bytes) pair: the unit of storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    cid: Cid,
    data: Bytes,
}

impl Block {
    pub fn new(cid: Cid, data: impl Into<Bytes>) -> Self {
        Self {
            cid,
            data: data.into(),
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }
}

/// A content-addressed block store
///
/// Implementations must be safe to share between a database, its batches and
/// any number of threads.
pub trait BlockStore: Send + Sync {
    /// Whether the block is present locally. Never goes to the network.
    fn has(&self, cid: &Cid) -> Result<bool>;

    /// Fetch a block, failing with `BlockNotFound` when absent.
    fn get(&self, cid: &Cid) -> Result<Block>;

    /// Store a block. Storing an existing block is a no-op.
    fn put(&self, block: Block) -> Result<()>;

    /// Remove a block. Removing a missing block is not an error.
    fn delete(&self, cid: &Cid) -> Result<()>;

    /// Whether a peer exchange is attached and online
    fn is_online(&self) -> bool {
        false
    }

    /// Release the store's connections
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

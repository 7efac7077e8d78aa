//! Index Module
//!
//! The relational side index that restores key order.
//!
//! CIDs bear no relation to the byte order of the keys they were derived
//! from, so the block store cannot answer "what comes after key X". The
//! preimage index joins stored blocks back to their original keys and
//! answers that question one row at a time; the iterator never sorts
//! anything in memory.
//!
//! ## Responsibilities
//! - Hand out one connection per iterator ([`PreimageIndex::connect`])
//! - Return the smallest indexed key past a lower bound, under a prefix
//!   ([`IndexConnection::next_entry`])

mod sqlite;

use std::ops::Bound;

use crate::error::{CidKvError, Result};

pub use sqlite::{SqliteIndex, SqliteIndexConnection};

/// One (original key, block data) row of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Source of index connections
pub trait PreimageIndex: Send + Sync {
    type Connection: IndexConnection;

    /// Open a connection owned exclusively by the caller
    fn connect(&self) -> Result<Self::Connection>;
}

/// A live connection to the preimage index
pub trait IndexConnection {
    /// Smallest entry whose key starts with `prefix` and lies above `lower`
    ///
    /// `Ok(None)` when no such key exists.
    fn next_entry(&mut self, prefix: &[u8], lower: Bound<&[u8]>) -> Result<Option<IndexEntry>>;

    /// Release the connection
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Index for databases built without one
///
/// Every connection attempt fails with `NotSupported`, so iterators over such
/// a database yield nothing and report the error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndex;

impl PreimageIndex for NoIndex {
    type Connection = NoIndex;

    fn connect(&self) -> Result<Self::Connection> {
        Err(CidKvError::NotSupported)
    }
}

impl IndexConnection for NoIndex {
    fn next_entry(&mut self, _prefix: &[u8], _lower: Bound<&[u8]>) -> Result<Option<IndexEntry>> {
        Err(CidKvError::NotSupported)
    }

    fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Smallest key greater than every key starting with `prefix`
///
/// `None` when no such key exists (empty prefix, or all `0xff`).
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let last = prefix.iter().rposition(|&b| b != 0xff)?;
    let mut upper = prefix[..=last].to_vec();
    upper[last] += 1;
    Some(upper)
}

//! Database Module
//!
//! The facade that satisfies the node's key-value interface with a
//! content-addressed block store.
//!
//! ## Responsibilities
//! - Derive a CID per key and delegate has/get/put/delete to the block store
//! - Hand out batches bound to the same store
//! - Hand out ordered iterators backed by the preimage index
//! - Refuse every tiered-storage operation with `NotSupported`
//!
//! ## Capability manifest
//!
//! | Operation                                   | Status          |
//! |---------------------------------------------|-----------------|
//! | `has` / `get` / `put` / `delete`            | live            |
//! | `new_batch` / `new_batch_with_size`         | live            |
//! | `new_iterator`                              | live (needs an index) |
//! | `stat("exchange")`, `stat("online")`        | live            |
//! | `stat` of any other property                | unknown property |
//! | `close`                                     | live            |
//! | `compact`                                   | not supported   |
//! | [`AncientStore`] (freezer, snapshots, sync) | not supported   |

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::batch::Batch;
use crate::blockstore::{BlockStore, SqliteBlockStore};
use crate::config::Config;
use crate::error::{CidKvError, Result};
use crate::index::{NoIndex, PreimageIndex, SqliteIndex};
use crate::interface::{AncientStore, KeyValueReader, KeyValueWriter, Snapshot};
use crate::iterator::KeyIterator;
use crate::keys::CidDeriver;

/// Key-value database over a content-addressed block store
///
/// `S` stores the blocks; `I` recovers key order for iteration. A database
/// built with [`Database::new`] has no index and cannot iterate.
pub struct Database<S, I = NoIndex> {
    /// Database configuration
    config: Config,

    /// Key → CID derivation (from `config`)
    deriver: CidDeriver,

    /// Shared with every batch created from this database
    store: Arc<S>,

    /// Source of per-iterator index connections
    index: I,
}

impl<S: BlockStore> Database<S, NoIndex> {
    /// Database without an ordering index
    pub fn new(store: S, config: Config) -> Self {
        Self::with_index(store, NoIndex, config)
    }
}

impl Database<SqliteBlockStore, SqliteIndex> {
    /// Open a SQLite-backed database (blocks and preimage index in one file)
    pub fn open_path(path: &Path, config: Config) -> Result<Self> {
        let store = SqliteBlockStore::open(path)?;
        let index = SqliteIndex::new(path);
        Ok(Self::with_index(store, index, config))
    }
}

impl<S: BlockStore, I: PreimageIndex> Database<S, I> {
    /// Database with an ordering index
    pub fn with_index(store: S, index: I, config: Config) -> Self {
        Self::from_shared(Arc::new(store), index, config)
    }

    /// Database over a block store that is also used elsewhere
    pub fn from_shared(store: Arc<S>, index: I, config: Config) -> Self {
        let deriver = CidDeriver::from_config(&config);
        Self {
            config,
            deriver,
            store,
            index,
        }
    }

    // =========================================================================
    // Key-Value Operations
    // =========================================================================

    /// Whether a block for `key` exists in the local store
    pub fn has(&self, key: &[u8]) -> Result<bool> {
        let cid = self.deriver.derive(key)?;
        self.store.has(&cid)
    }

    /// Value stored under `key`
    ///
    /// A block store with an exchange may fetch a locally missing block from
    /// peers. Fails with `BlockNotFound` if it cannot be found anywhere.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let cid = self.deriver.derive(key)?;
        let block = self.store.get(&cid)?;
        Ok(block.into_data().to_vec())
    }

    /// Store `value` under `key`
    ///
    /// `key` is expected to be the keccak-256 digest of `value`. This is only
    /// checked when `verify_digests` is enabled.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let block = self.deriver.block(key, value)?;
        tracing::debug!(cid = %block.cid(), bytes = value.len(), "put");
        self.store.put(block)
    }

    /// Remove the block stored under `key`
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        let cid = self.deriver.derive(key)?;
        tracing::debug!(%cid, "delete");
        self.store.delete(&cid)
    }

    // =========================================================================
    // Batches and Iterators
    // =========================================================================

    /// Empty batch sized by `config.batch_capacity`
    pub fn new_batch(&self) -> Batch<S> {
        self.new_batch_with_size(self.config.batch_capacity)
    }

    /// Empty batch with room for `size` operations (a hint, not a limit)
    pub fn new_batch_with_size(&self, size: usize) -> Batch<S> {
        Batch::new(Arc::clone(&self.store), self.deriver, size)
    }

    /// Iterator over keys starting with `prefix`, after `prefix ++ start`
    ///
    /// An empty `start` covers every key under `prefix`, including `prefix`
    /// itself. `start` must not include the prefix. Each iterator opens its own index
    /// connection; if that fails the iterator is empty and reports the error.
    pub fn new_iterator(&self, prefix: &[u8], start: &[u8]) -> KeyIterator<I::Connection> {
        match self.index.connect() {
            Ok(conn) => KeyIterator::new(conn, prefix, start),
            Err(e) => {
                tracing::error!("failed to open index connection: {}", e);
                KeyIterator::failed(e)
            }
        }
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Value of an internal database property
    ///
    /// Only `exchange` / `online` are known; they report whether the block
    /// store's peer exchange is online.
    pub fn stat(&self, property: &str) -> Result<String> {
        match DatabaseProperty::from_str(property)? {
            DatabaseProperty::ExchangeOnline => Ok(self.store.is_online().to_string()),
        }
    }

    /// Flatten the underlying store. Not supported.
    pub fn compact(&self, _start: &[u8], _limit: &[u8]) -> Result<()> {
        Err(CidKvError::NotSupported)
    }

    /// Close the block store and its exchange connection
    pub fn close(&self) -> Result<()> {
        self.store.close()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn deriver(&self) -> &CidDeriver {
        &self.deriver
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }
}

/// Properties recognised by [`Database::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseProperty {
    /// Whether the block exchange is online ("exchange" or "online")
    ExchangeOnline,
}

impl FromStr for DatabaseProperty {
    type Err = CidKvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exchange" | "online" => Ok(DatabaseProperty::ExchangeOnline),
            _ => Err(CidKvError::UnknownProperty(s.to_string())),
        }
    }
}

// =============================================================================
// Node Interface
// =============================================================================

impl<S: BlockStore, I: PreimageIndex> KeyValueReader for Database<S, I> {
    fn has(&self, key: &[u8]) -> Result<bool> {
        Database::has(self, key)
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        Database::get(self, key)
    }
}

impl<S: BlockStore, I: PreimageIndex> KeyValueWriter for Database<S, I> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        Database::put(self, key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        Database::delete(self, key)
    }
}

/// Tiered storage is outside the flat key-value capability set: every
/// operation fails with `NotSupported` without touching the block store.
impl<S: BlockStore, I: PreimageIndex> AncientStore for Database<S, I> {
    fn has_ancient(&self, _kind: &str, _number: u64) -> Result<bool> {
        Err(CidKvError::NotSupported)
    }

    fn ancient(&self, _kind: &str, _number: u64) -> Result<Vec<u8>> {
        Err(CidKvError::NotSupported)
    }

    fn ancients(&self) -> Result<u64> {
        Err(CidKvError::NotSupported)
    }

    fn tail(&self) -> Result<u64> {
        Err(CidKvError::NotSupported)
    }

    fn ancient_size(&self, _kind: &str) -> Result<u64> {
        Err(CidKvError::NotSupported)
    }

    fn ancient_range(
        &self,
        _kind: &str,
        _start: u64,
        _count: u64,
        _max_bytes: u64,
    ) -> Result<Vec<Vec<u8>>> {
        Err(CidKvError::NotSupported)
    }

    fn read_ancients(&self, _f: &mut dyn FnMut(&dyn AncientStore) -> Result<()>) -> Result<()> {
        Err(CidKvError::NotSupported)
    }

    fn modify_ancients(&self, _f: &mut dyn FnMut() -> Result<()>) -> Result<i64> {
        Err(CidKvError::NotSupported)
    }

    fn truncate_head(&self, _n: u64) -> Result<u64> {
        Err(CidKvError::NotSupported)
    }

    fn truncate_tail(&self, _n: u64) -> Result<u64> {
        Err(CidKvError::NotSupported)
    }

    fn sync(&self) -> Result<()> {
        Err(CidKvError::NotSupported)
    }

    fn migrate_table(
        &self,
        _kind: &str,
        _convert: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<()> {
        Err(CidKvError::NotSupported)
    }

    fn new_snapshot(&self) -> Result<Box<dyn Snapshot>> {
        Err(CidKvError::NotSupported)
    }

    fn ancient_datadir(&self) -> Result<PathBuf> {
        Err(CidKvError::NotSupported)
    }
}

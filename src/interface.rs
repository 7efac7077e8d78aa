//! Node storage interface
//!
//! The traits a blockchain node programs against. [`Database`] implements
//! the key-value traits for real and [`AncientStore`] as a fixed refusal.
//!
//! [`Database`]: crate::Database

use std::path::PathBuf;

use crate::error::Result;

/// Read access to a key-value store
pub trait KeyValueReader {
    /// Whether `key` is present
    fn has(&self, key: &[u8]) -> Result<bool>;

    /// Value stored under `key`
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;
}

/// Write access to a key-value store
pub trait KeyValueWriter {
    /// Insert `value` under `key`
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key`
    fn delete(&mut self, key: &[u8]) -> Result<()>;
}

/// Point-in-time read view of a store
pub trait Snapshot: KeyValueReader {
    fn release(self: Box<Self>);
}

/// Tiered ("ancient") storage: the append-only freezer for old chain data
pub trait AncientStore {
    /// Whether item `number` of table `kind` exists
    fn has_ancient(&self, kind: &str, number: u64) -> Result<bool>;

    /// Item `number` of table `kind`
    fn ancient(&self, kind: &str, number: u64) -> Result<Vec<u8>>;

    /// Number of items in the freezer
    fn ancients(&self) -> Result<u64>;

    /// Number of the first stored item
    fn tail(&self) -> Result<u64>;

    /// Byte size of table `kind`
    fn ancient_size(&self, kind: &str) -> Result<u64>;

    /// Up to `count` items from `start`, bounded by `max_bytes` (at least one item)
    fn ancient_range(&self, kind: &str, start: u64, count: u64, max_bytes: u64)
        -> Result<Vec<Vec<u8>>>;

    /// Run `f` against a consistent view of the freezer
    fn read_ancients(&self, f: &mut dyn FnMut(&dyn AncientStore) -> Result<()>) -> Result<()>;

    /// Run a batch of appends, returning the total bytes written
    fn modify_ancients(&self, f: &mut dyn FnMut() -> Result<()>) -> Result<i64>;

    /// Discard all but the first `n` items, returning the old head
    fn truncate_head(&self, n: u64) -> Result<u64>;

    /// Discard the first `n` items, returning the old tail
    fn truncate_tail(&self, n: u64) -> Result<u64>;

    /// Flush freezer data to disk
    fn sync(&self) -> Result<()>;

    /// Rewrite every item of table `kind` through `convert`
    fn migrate_table(
        &self,
        kind: &str,
        convert: &mut dyn FnMut(&[u8]) -> Result<Vec<u8>>,
    ) -> Result<()>;

    /// Snapshot of the current state
    fn new_snapshot(&self) -> Result<Box<dyn Snapshot>>;

    /// Directory holding the freezer files
    fn ancient_datadir(&self) -> Result<PathBuf>;
}

//! Tests for the block stores
//!
//! These tests verify:
//! - MemBlockStore / SqliteBlockStore basic behavior
//! - BlockService falling back to the exchange for missing blocks
//! - Integrity checks on fetched blocks
//! - Exchange state reported through Database::stat

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use cid::Cid;
use cidkv::blockstore::{Block, BlockService, BlockStore, Exchange, MemBlockStore, SqliteBlockStore};
use cidkv::keys::ETH_STATE_TRIE;
use cidkv::{derive_cid, CidKvError, Config, Database, Result};
use tempfile::TempDir;

use common::entry;

// =============================================================================
// Helper Types
// =============================================================================

/// Exchange serving blocks from a fixed map
#[derive(Default)]
struct MapExchange {
    blocks: HashMap<Cid, Bytes>,
    fetches: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl MapExchange {
    fn with_block(mut self, cid: Cid, data: &[u8]) -> Self {
        self.blocks.insert(cid, Bytes::copy_from_slice(data));
        self
    }
}

impl Exchange for MapExchange {
    fn fetch(&self, cid: &Cid) -> Result<Option<Bytes>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.blocks.get(cid).cloned())
    }

    fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn block_for(label: &str) -> Block {
    let (key, value) = entry(label);
    Block::new(derive_cid(&key, ETH_STATE_TRIE).unwrap(), value)
}

// =============================================================================
// Local Store Tests
// =============================================================================

fn exercise_store<S: BlockStore>(store: &S) {
    let block = block_for("local");
    let cid = *block.cid();

    assert!(!store.has(&cid).unwrap());
    assert!(store.get(&cid).unwrap_err().is_not_found());

    store.put(block.clone()).unwrap();
    assert!(store.has(&cid).unwrap());
    assert_eq!(store.get(&cid).unwrap(), block);

    store.delete(&cid).unwrap();
    assert!(!store.has(&cid).unwrap());
    store.delete(&cid).unwrap();
}

/// A second put under an existing CID keeps the first payload
fn exercise_first_write_wins<S: BlockStore>(store: &S) {
    let block = block_for("first");
    let cid = *block.cid();

    store.put(block.clone()).unwrap();
    store.put(Block::new(cid, &b"second payload"[..])).unwrap();

    assert_eq!(store.get(&cid).unwrap(), block);
}

#[test]
fn test_mem_block_store() {
    let store = MemBlockStore::new();
    exercise_store(&store);
    assert!(store.is_empty());
}

#[test]
fn test_sqlite_block_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteBlockStore::open(&temp_dir.path().join("nested/blocks.db")).unwrap();
    exercise_store(&store);
    assert!(!store.is_online());
}

#[test]
fn test_existing_block_not_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    exercise_first_write_wins(&MemBlockStore::new());
    exercise_first_write_wins(&SqliteBlockStore::open(&temp_dir.path().join("blocks.db")).unwrap());
}

#[test]
fn test_not_found_message_names_cid() {
    let store = MemBlockStore::new();
    let block = block_for("missing");

    let err = store.get(block.cid()).unwrap_err();

    assert_eq!(err.to_string(), format!("block not found: {}", block.cid()));
}

// =============================================================================
// Block Service Tests
// =============================================================================

#[test]
fn test_service_without_exchange() {
    let service = BlockService::new(MemBlockStore::new());
    exercise_store(&service);
    assert!(!service.is_online());
}

#[test]
fn test_service_fetches_missing_block() {
    let block = block_for("remote");
    let exchange = MapExchange::default().with_block(*block.cid(), block.data());
    let fetches = Arc::clone(&exchange.fetches);
    let service = BlockService::with_exchange(MemBlockStore::new(), exchange);

    // has() is local only
    assert!(!service.has(block.cid()).unwrap());
    assert_eq!(fetches.load(Ordering::SeqCst), 0);

    assert_eq!(service.get(block.cid()).unwrap(), block);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    // Cached locally after the fetch
    assert!(service.local().has(block.cid()).unwrap());
    service.get(block.cid()).unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn test_service_block_missing_everywhere() {
    let block = block_for("nowhere");
    let service = BlockService::with_exchange(MemBlockStore::new(), MapExchange::default());

    let err = service.get(block.cid()).unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_service_rejects_corrupt_remote_block() {
    let block = block_for("genuine");
    let exchange = MapExchange::default().with_block(*block.cid(), b"tampered bytes");
    let service = BlockService::with_exchange(MemBlockStore::new(), exchange);

    let err = service.get(block.cid()).unwrap_err();

    assert!(matches!(err, CidKvError::Exchange(_)));
    assert!(!service.local().has(block.cid()).unwrap());
}

#[test]
fn test_service_close_closes_exchange() {
    let exchange = MapExchange::default();
    let closed = Arc::clone(&exchange.closed);
    let service = BlockService::with_exchange(MemBlockStore::new(), exchange);

    service.close().unwrap();

    assert!(closed.load(Ordering::SeqCst));
}

// =============================================================================
// Database Over Block Service Tests
// =============================================================================

#[test]
fn test_database_reads_through_exchange() {
    let (key, value) = entry("peer data");
    let cid = derive_cid(&key, ETH_STATE_TRIE).unwrap();
    let exchange = MapExchange::default().with_block(cid, &value);
    let db = Database::new(
        BlockService::with_exchange(MemBlockStore::new(), exchange),
        Config::default(),
    );

    assert!(!db.has(&key).unwrap());
    assert_eq!(db.get(&key).unwrap(), value);
    assert!(db.has(&key).unwrap());
}

#[test]
fn test_stat_reports_exchange_online() {
    let online = Database::new(
        BlockService::with_exchange(MemBlockStore::new(), MapExchange::default()),
        Config::default(),
    );
    let offline = Database::new(BlockService::new(MemBlockStore::new()), Config::default());

    assert_eq!(online.stat("online").unwrap(), "true");
    assert_eq!(online.stat("EXCHANGE").unwrap(), "true");
    assert_eq!(offline.stat("online").unwrap(), "false");
}

//! Shared fixtures for the cidkv integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use cidkv::blockstore::{MemBlockStore, SqliteBlockStore};
use cidkv::index::SqliteIndex;
use cidkv::keys::ETH_STATE_TRIE;
use cidkv::{derive_cid, keccak256, Config, Database};
use rusqlite::Connection;
use tempfile::TempDir;

// =============================================================================
// Fixture Data
// =============================================================================

/// A (keccak-256(value), value) pair
pub fn entry(label: &str) -> (Vec<u8>, Vec<u8>) {
    let value = format!("rlp-encoded trie node: {}", label).into_bytes();
    (keccak256(&value).to_vec(), value)
}

/// `count` distinct entries
pub fn entries(count: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    (0..count).map(|i| entry(&format!("node-{:04}", i))).collect()
}

// =============================================================================
// Database Setup
// =============================================================================

pub fn setup_mem_database() -> Database<MemBlockStore> {
    Database::new(MemBlockStore::new(), Config::default())
}

pub fn setup_sqlite_database() -> (TempDir, PathBuf, Database<SqliteBlockStore, SqliteIndex>) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cidkv.db");
    let db = Database::open_path(&path, Config::default()).unwrap();
    (temp_dir, path, db)
}

/// Do what the external indexer does: record `key` as a preimage
pub fn index_keys(path: &Path, keys: &[Vec<u8>]) {
    let conn = Connection::open(path).unwrap();
    for key in keys {
        let cid = derive_cid(key, ETH_STATE_TRIE).unwrap();
        cidkv::schema::insert_preimage(&conn, key, &cid).unwrap();
    }
}

/// Put every entry and index it
pub fn load_indexed(
    path: &Path,
    db: &Database<SqliteBlockStore, SqliteIndex>,
    entries: &[(Vec<u8>, Vec<u8>)],
) {
    for (key, value) in entries {
        db.put(key, value).unwrap();
    }
    let keys: Vec<Vec<u8>> = entries.iter().map(|(k, _)| k.clone()).collect();
    index_keys(path, &keys);
}

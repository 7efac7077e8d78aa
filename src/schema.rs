//! SQLite schema shared by the block store and the preimage index
//!
//! ```text
//! blocks                          key_preimages
//! ┌──────────────┬──────────┐     ┌─────────────────┬──────────────┐
//! │ key (BLOB PK)│ data     │◄────│ ipfs_key (BLOB) │ eth_key (PK) │
//! └──────────────┴──────────┘     └─────────────────┴──────────────┘
//! ```
//!
//! `blocks.key` is the multihash of the block's CID, so the same block is
//! found whatever codec tag the CID carries. `key_preimages` is written by
//! an external indexer; this crate only reads it.

use cid::Cid;
use rusqlite::{params, Connection};

use crate::error::Result;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS blocks (
        key  BLOB PRIMARY KEY,
        data BLOB NOT NULL
    );
    CREATE TABLE IF NOT EXISTS key_preimages (
        eth_key  BLOB PRIMARY KEY,
        ipfs_key BLOB NOT NULL
    );
    CREATE INDEX IF NOT EXISTS key_preimages_ipfs_key ON key_preimages (ipfs_key);
";

/// Create both tables if they do not exist yet
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

/// Datastore key for a CID: its multihash bytes
pub fn block_key(cid: &Cid) -> Vec<u8> {
    cid.hash().to_bytes()
}

/// Record that `eth_key` is the preimage of the block addressed by `cid`
pub fn insert_preimage(conn: &Connection, eth_key: &[u8], cid: &Cid) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO key_preimages (eth_key, ipfs_key) VALUES (?1, ?2)",
        params![eth_key, block_key(cid)],
    )?;
    Ok(())
}

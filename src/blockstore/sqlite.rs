//! SQLite block store
//!
//! Persists blocks in the `blocks` table (see [`crate::schema`]). A single
//! connection is shared behind a mutex; SQLite serializes writers anyway.

use std::path::{Path, PathBuf};

use cid::Cid;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CidKvError, Result};
use crate::schema;

use super::{Block, BlockStore};

/// Block store over a SQLite database file
pub struct SqliteBlockStore {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl SqliteBlockStore {
    /// Open or create the database at `path` and ensure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        schema::create_tables(&conn)?;

        tracing::info!("Block store opened at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the open connection
    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| CidKvError::BlockStore("block store is closed".to_string()))?;
        f(conn)
    }
}

impl BlockStore for SqliteBlockStore {
    fn has(&self, cid: &Cid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM blocks WHERE key = ?1",
                    params![schema::block_key(cid)],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn get(&self, cid: &Cid) -> Result<Block> {
        self.with_conn(|conn| {
            let data: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT data FROM blocks WHERE key = ?1",
                    params![schema::block_key(cid)],
                    |row| row.get(0),
                )
                .optional()?;
            data.map(|data| Block::new(*cid, data))
                .ok_or(CidKvError::BlockNotFound(*cid))
        })
    }

    fn put(&self, block: Block) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO blocks (key, data) VALUES (?1, ?2)",
                params![schema::block_key(block.cid()), &block.data()[..]],
            )?;
            Ok(())
        })
    }

    fn delete(&self, cid: &Cid) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM blocks WHERE key = ?1",
                params![schema::block_key(cid)],
            )?;
            Ok(())
        })
    }

    fn close(&self) -> Result<()> {
        if let Some(conn) = self.conn.lock().take() {
            conn.close().map_err(|(_, e)| CidKvError::Sqlite(e))?;
            tracing::debug!("Block store at {} closed", self.path.display());
        }
        Ok(())
    }
}

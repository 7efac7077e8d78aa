//! SQLite preimage index
//!
//! Reads the `key_preimages` ⋈ `blocks` join from the database file the
//! [`SqliteBlockStore`](crate::blockstore::SqliteBlockStore) writes to.
//! BLOBs compare with memcmp, so `ORDER BY eth_key` is byte-lexicographic.

use std::ops::Bound;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{CidKvError, Result};

use super::{prefix_upper_bound, IndexConnection, IndexEntry, PreimageIndex};

const JOIN: &str = "
    SELECT key_preimages.eth_key, blocks.data
    FROM blocks
    INNER JOIN key_preimages ON (key_preimages.ipfs_key = blocks.key)
";

/// Smallest `eth_key` from `?1` (inclusive or not) and, when bounded, below `?2`
///
/// A prefix becomes a key range so the primary-key index bounds the scan.
fn next_entry_query(inclusive: bool, bounded: bool) -> String {
    let op = if inclusive { ">=" } else { ">" };
    let upper = if bounded {
        " AND key_preimages.eth_key < ?2"
    } else {
        ""
    };
    format!(
        "{JOIN} WHERE key_preimages.eth_key {op} ?1{upper} ORDER BY key_preimages.eth_key LIMIT 1"
    )
}

fn read_entry(row: &Row<'_>) -> rusqlite::Result<IndexEntry> {
    Ok(IndexEntry {
        key: row.get(0)?,
        value: row.get(1)?,
    })
}

/// Preimage index stored in a SQLite file
#[derive(Debug, Clone)]
pub struct SqliteIndex {
    path: PathBuf,
}

impl SqliteIndex {
    /// Index over the database file at `path`
    ///
    /// Nothing is opened until an iterator asks for a connection.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreimageIndex for SqliteIndex {
    type Connection = SqliteIndexConnection;

    fn connect(&self) -> Result<Self::Connection> {
        let conn = Connection::open(&self.path)?;
        tracing::debug!("Index connection opened on {}", self.path.display());
        Ok(SqliteIndexConnection { conn })
    }
}

/// Connection owned by a single iterator
pub struct SqliteIndexConnection {
    conn: Connection,
}

impl IndexConnection for SqliteIndexConnection {
    fn next_entry(&mut self, prefix: &[u8], lower: Bound<&[u8]>) -> Result<Option<IndexEntry>> {
        let (inclusive, from) = match lower {
            Bound::Included(key) => (true, key),
            Bound::Excluded(key) => (false, key),
            Bound::Unbounded => (true, &[][..]),
        };
        // Nothing under the prefix sorts below the prefix itself
        let (inclusive, from) = if from < prefix {
            (true, prefix)
        } else {
            (inclusive, from)
        };
        let upper = prefix_upper_bound(prefix);

        let mut stmt = self
            .conn
            .prepare_cached(&next_entry_query(inclusive, upper.is_some()))?;
        let entry = match &upper {
            Some(upper) => stmt.query_row(params![from, upper], read_entry),
            None => stmt.query_row(params![from], read_entry),
        }
        .optional()?;
        Ok(entry)
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| CidKvError::Sqlite(e))
    }
}

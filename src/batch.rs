//! Write batch
//!
//! Buffers puts and deletes until `write()` replays them against the
//! block store.
//!
//! ## Semantics
//! - Operations replay in insertion order; duplicates are kept
//! - `value_size()` sums the value lengths of buffered puts (deletes add 0)
//! - `write()` is NOT atomic: it stops at the first failing operation,
//!   leaving every earlier one applied
//! - `write()` leaves the buffer intact; only `reset()` clears it

use std::sync::Arc;

use cid::Cid;

use crate::blockstore::{Block, BlockStore};
use crate::error::Result;
use crate::interface::KeyValueWriter;
use crate::keys::CidDeriver;

/// Kind of batch operation
#[derive(Debug, Clone)]
pub enum OperationKind {
    /// Store a block
    Put { block: Block },
    /// Remove a block
    Delete { cid: Cid },
}

/// A single buffered operation
#[derive(Debug, Clone)]
pub struct BatchOperation {
    /// Original key as supplied by the caller
    pub key: Vec<u8>,
    /// What to do with it
    pub kind: OperationKind,
}

/// A write-only buffer of operations over a block store
///
/// Single writer: mutation takes `&mut self`.
pub struct Batch<S> {
    store: Arc<S>,
    deriver: CidDeriver,
    operations: Vec<BatchOperation>,
    value_size: usize,
}

impl<S: BlockStore> Batch<S> {
    /// Create an empty batch with room for `capacity` operations
    pub fn new(store: Arc<S>, deriver: CidDeriver, capacity: usize) -> Self {
        Self {
            store,
            deriver,
            operations: Vec::with_capacity(capacity),
            value_size: 0,
        }
    }

    /// Buffer a put of `value` under `key`
    ///
    /// The key is validated (and the digest checked, when enabled) now, so a
    /// malformed entry never reaches `write()`.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let block = self.deriver.block(key, value)?;
        self.operations.push(BatchOperation {
            key: key.to_vec(),
            kind: OperationKind::Put { block },
        });
        self.value_size += value.len();
        Ok(())
    }

    /// Buffer a delete of `key`
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        let cid = self.deriver.derive(key)?;
        self.operations.push(BatchOperation {
            key: key.to_vec(),
            kind: OperationKind::Delete { cid },
        });
        Ok(())
    }

    /// Total bytes of buffered put values
    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Number of buffered operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Buffered operations in replay order
    pub fn operations(&self) -> &[BatchOperation] {
        &self.operations
    }

    /// Apply every buffered operation to the block store, in order
    ///
    /// On failure the error of the first failing operation is returned;
    /// operations before it stay applied and none after it are attempted.
    pub fn write(&self) -> Result<()> {
        for (applied, op) in self.operations.iter().enumerate() {
            let result = match &op.kind {
                OperationKind::Put { block } => self.store.put(block.clone()),
                OperationKind::Delete { cid } => self.store.delete(cid),
            };

            if let Err(e) = result {
                tracing::warn!(
                    applied,
                    pending = self.operations.len() - applied,
                    "Batch write stopped: {}",
                    e
                );
                return Err(e);
            }
        }

        tracing::debug!(
            operations = self.operations.len(),
            value_size = self.value_size,
            "Batch written"
        );
        Ok(())
    }

    /// Drop all buffered operations and zero the size counter
    pub fn reset(&mut self) {
        self.operations.clear();
        self.value_size = 0;
    }

    /// Replay the buffered operations into another writer
    ///
    /// Stops at the first error, like `write()`.
    pub fn replay<W: KeyValueWriter + ?Sized>(&self, writer: &mut W) -> Result<()> {
        for op in &self.operations {
            match &op.kind {
                OperationKind::Put { block } => writer.put(&op.key, block.data())?,
                OperationKind::Delete { .. } => writer.delete(&op.key)?,
            }
        }
        Ok(())
    }
}

impl<S: BlockStore> KeyValueWriter for Batch<S> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        Batch::put(self, key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        Batch::delete(self, key)
    }
}

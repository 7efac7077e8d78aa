//! In-memory block store
//!
//! HashMap wrapped in a parking_lot RwLock, many readers / one writer.
//! Blocks are keyed by multihash, like every datastore: two CIDs that differ
//! only in codec address the same block.

use std::collections::HashMap;

use bytes::Bytes;
use cid::multihash::Multihash;
use cid::Cid;
use parking_lot::RwLock;

use crate::error::{CidKvError, Result};

use super::{Block, BlockStore};

/// Block store held entirely in memory; nothing survives a drop
#[derive(Debug, Default)]
pub struct MemBlockStore {
    blocks: RwLock<HashMap<Multihash<64>, Bytes>>,
}

impl MemBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl BlockStore for MemBlockStore {
    fn has(&self, cid: &Cid) -> Result<bool> {
        Ok(self.blocks.read().contains_key(cid.hash()))
    }

    fn get(&self, cid: &Cid) -> Result<Block> {
        self.blocks
            .read()
            .get(cid.hash())
            .map(|data| Block::new(*cid, data.clone()))
            .ok_or(CidKvError::BlockNotFound(*cid))
    }

    fn put(&self, block: Block) -> Result<()> {
        let hash = *block.cid().hash();
        self.blocks
            .write()
            .entry(hash)
            .or_insert_with(|| block.into_data());
        Ok(())
    }

    fn delete(&self, cid: &Cid) -> Result<()> {
        self.blocks.write().remove(cid.hash());
        Ok(())
    }
}

//! Block Service
//!
//! A local block store plus an optional peer exchange.
//!
//! ## Read path
//! 1. Local store
//! 2. On `BlockNotFound`, ask the exchange (if any)
//! 3. Verify fetched bytes against the CID's multihash
//! 4. Cache the block locally and return it
//!
//! `has` never consults the exchange.

use bytes::Bytes;
use cid::Cid;
use multihash_codetable::{Code, MultihashDigest};

use crate::error::{CidKvError, Result};

use super::{Block, BlockStore};

/// Fetches blocks that are missing locally from remote peers
pub trait Exchange: Send + Sync {
    /// Fetch a block's bytes. `Ok(None)` means no peer had it.
    fn fetch(&self, cid: &Cid) -> Result<Option<Bytes>>;

    /// Whether the exchange is currently connected to the network
    fn is_online(&self) -> bool {
        true
    }

    /// Disconnect from peers
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Block store backed by a local store and, optionally, a peer exchange
pub struct BlockService<S> {
    local: S,
    exchange: Option<Box<dyn Exchange>>,
}

impl<S: BlockStore> BlockService<S> {
    /// Service reading from the local store only
    pub fn new(local: S) -> Self {
        Self {
            local,
            exchange: None,
        }
    }

    /// Service that falls back to `exchange` for blocks missing locally
    pub fn with_exchange(local: S, exchange: impl Exchange + 'static) -> Self {
        Self {
            local,
            exchange: Some(Box::new(exchange)),
        }
    }

    /// The local store
    pub fn local(&self) -> &S {
        &self.local
    }

    fn fetch_remote(&self, exchange: &dyn Exchange, cid: &Cid) -> Result<Block> {
        let data = exchange
            .fetch(cid)?
            .ok_or(CidKvError::BlockNotFound(*cid))?;

        verify_block(cid, &data)?;

        let block = Block::new(*cid, data);
        self.local.put(block.clone())?;

        tracing::debug!(%cid, bytes = block.data().len(), "Fetched block from exchange");
        Ok(block)
    }
}

impl<S: BlockStore> BlockStore for BlockService<S> {
    fn has(&self, cid: &Cid) -> Result<bool> {
        self.local.has(cid)
    }

    fn get(&self, cid: &Cid) -> Result<Block> {
        match self.local.get(cid) {
            Err(CidKvError::BlockNotFound(_)) => match &self.exchange {
                Some(exchange) => self.fetch_remote(exchange.as_ref(), cid),
                None => Err(CidKvError::BlockNotFound(*cid)),
            },
            other => other,
        }
    }

    fn put(&self, block: Block) -> Result<()> {
        self.local.put(block)
    }

    fn delete(&self, cid: &Cid) -> Result<()> {
        self.local.delete(cid)
    }

    fn is_online(&self) -> bool {
        self.exchange.as_ref().is_some_and(|e| e.is_online())
    }

    fn close(&self) -> Result<()> {
        if let Some(exchange) = &self.exchange {
            exchange.close()?;
        }
        self.local.close()
    }
}

/// Check remote bytes against the digest in their CID
///
/// Hash functions outside the code table are passed through unchecked.
fn verify_block(cid: &Cid, data: &[u8]) -> Result<()> {
    let Ok(code) = Code::try_from(cid.hash().code()) else {
        return Ok(());
    };

    if code.digest(data).digest() != cid.hash().digest() {
        return Err(CidKvError::Exchange(format!(
            "block {} failed integrity check",
            cid
        )));
    }
    Ok(())
}

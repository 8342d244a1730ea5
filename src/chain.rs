use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::error::{ChainError, Result, ValidationError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// An append-only, hash-linked sequence of blocks.
///
/// Index 0 is always the genesis block. Blocks are only ever added at the
/// tail, and only after validating against it; a rejected append leaves the
/// chain exactly as it was.
pub struct Chain {
    blocks: Vec<Block>,
    clock: Box<dyn Clock>,
}

impl Chain {
    /// Start a new chain stamped by the wall clock.
    pub fn init() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Start a new chain whose timestamps come from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        let genesis = Block::genesis(clock.now());
        info!(hash = %hex::encode(&genesis.hash), "initialized chain");
        Self {
            blocks: vec![genesis],
            clock: Box::new(clock),
        }
    }

    /// Build a candidate on top of `previous`. The chain is not modified.
    pub fn create_block(&self, previous: &Block, data: impl Into<Vec<u8>>) -> Block {
        Block::successor(previous, data.into(), self.clock.now())
    }

    /// Validate `candidate` against the current tail and append it.
    pub fn append(&mut self, candidate: Block) -> std::result::Result<(), ValidationError> {
        if let Err(e) = candidate.validate(self.tail()) {
            debug!(height = self.blocks.len(), error = %e, "rejected block");
            return Err(e);
        }
        debug!(
            height = self.blocks.len(),
            hash = %hex::encode(&candidate.hash),
            "appended block"
        );
        self.blocks.push(candidate);
        Ok(())
    }

    /// Create a block from the current tail and append it in one step.
    pub fn push(&mut self, data: impl Into<Vec<u8>>) -> std::result::Result<&Block, ValidationError> {
        let candidate = self.create_block(self.tail(), data);
        self.append(candidate)?;
        Ok(self.tail())
    }

    /// Re-check every link from genesis to tail.
    ///
    /// `append` only looks at the last link; this walks the whole history and
    /// reports the first block that does not hold.
    pub fn verify(&self) -> Result<()> {
        let genesis = &self.blocks[0];
        genesis
            .check_hash()
            .map_err(|source| ChainError::InvalidBlock { index: 0, source })?;
        if !genesis.is_genesis() {
            return Err(ChainError::InvalidBlock {
                index: 0,
                source: ValidationError::PrevHashMismatch {
                    expected: Vec::new(),
                    actual: genesis.prev_hash.clone(),
                },
            });
        }
        for (i, pair) in self.blocks.windows(2).enumerate() {
            pair[1]
                .validate(&pair[0])
                .map_err(|source| ChainError::InvalidBlock {
                    index: i + 1,
                    source,
                })?;
        }
        Ok(())
    }

    /// The most recently appended block.
    pub fn tail(&self) -> &Block {
        // Never empty: genesis is inserted at construction and nothing is removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false once initialized.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::init()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("blocks", &self.blocks).finish()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// A chain shared between threads.
///
/// Reading the tail, validating and appending happen under one lock, so two
/// candidates built on the same tail can never both be accepted.
#[derive(Clone)]
pub struct SharedChain {
    inner: Arc<Mutex<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(Mutex::new(chain)),
        }
    }

    /// Build a candidate on top of `previous` using the chain's clock.
    pub fn create_block(&self, previous: &Block, data: impl Into<Vec<u8>>) -> Block {
        self.inner.lock().create_block(previous, data)
    }

    pub fn append(&self, candidate: Block) -> std::result::Result<(), ValidationError> {
        self.inner.lock().append(candidate)
    }

    /// Append `data` on whatever the tail is at the moment the lock is taken.
    pub fn push(&self, data: impl Into<Vec<u8>>) -> std::result::Result<Block, ValidationError> {
        let mut chain = self.inner.lock();
        chain.push(data).cloned()
    }

    pub fn tail(&self) -> Block {
        self.inner.lock().tail().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// A copy of every block, in order.
    pub fn snapshot(&self) -> Vec<Block> {
        self.inner.lock().blocks().to_vec()
    }

    pub fn verify(&self) -> Result<()> {
        self.inner.lock().verify()
    }
}

impl From<Chain> for SharedChain {
    fn from(chain: Chain) -> Self {
        Self::new(chain)
    }
}

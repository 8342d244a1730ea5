use crate::block::Digest;
use thiserror::Error;

/// Why a candidate block was refused by a tail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Stored hash differs from the hash recomputed over the block's fields.
    #[error("Invalid hash: stored {} recomputed {}", hex::encode(.actual), hex::encode(.expected))]
    HashMismatch { expected: Digest, actual: Digest },

    /// Candidate does not point at the current tail.
    #[error(
        "Invalid previous hash: tail {} candidate {}",
        hex::encode(.expected),
        hex::encode(.actual)
    )]
    PrevHashMismatch { expected: Digest, actual: Digest },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Block {index} failed verification: {source}")]
    InvalidBlock {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

pub type Result<T> = std::result::Result<T, ChainError>;

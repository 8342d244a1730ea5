//! An append-only chain of blocks, each sealed to its predecessor by SHA-256.

pub mod block;
pub mod chain;
pub mod clock;
pub mod error;

pub use block::{compute_hash, Block, Digest};
pub use chain::{Chain, SharedChain};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ChainError, ValidationError};

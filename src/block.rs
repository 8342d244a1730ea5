use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Raw SHA-256 digest bytes. Empty for the genesis block's predecessor.
pub type Digest = Vec<u8>;

/// Payload carried by every genesis block.
pub const GENESIS_DATA: &[u8] = b"Genesis Block";

/// A record sealed to its predecessor by hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    pub data: Vec<u8>,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(with = "hex")]
    pub prev_hash: Digest,
    #[serde(with = "hex")]
    pub hash: Digest,
}

impl Block {
    /// The first block of a chain: fixed payload, no predecessor.
    pub fn genesis(timestamp: i64) -> Self {
        Self::seal(GENESIS_DATA.to_vec(), timestamp, Vec::new())
    }

    /// A block linked to `previous`. The hash is computed automatically.
    pub fn successor(previous: &Block, data: Vec<u8>, timestamp: i64) -> Self {
        Self::seal(data, timestamp, previous.hash.clone())
    }

    fn seal(data: Vec<u8>, timestamp: i64, prev_hash: Digest) -> Self {
        let hash = compute_hash(&prev_hash, &data, timestamp);
        Self {
            data,
            timestamp,
            prev_hash,
            hash,
        }
    }

    /// Recompute the hash over this block's current fields.
    pub fn compute_hash(&self) -> Digest {
        compute_hash(&self.prev_hash, &self.data, self.timestamp)
    }

    /// Verify the block's integrity.
    pub fn verify(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Like `verify`, but reports both digests on mismatch.
    pub fn check_hash(&self) -> Result<(), ValidationError> {
        let recomputed = self.compute_hash();
        if recomputed != self.hash {
            return Err(ValidationError::HashMismatch {
                expected: recomputed,
                actual: self.hash.clone(),
            });
        }
        Ok(())
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_empty()
    }

    /// Check this block as the next link after `tail`.
    ///
    /// Self-integrity is checked first; the link to `tail` is only checked
    /// when the hash holds, so at most one error is reported.
    pub fn validate(&self, tail: &Block) -> Result<(), ValidationError> {
        self.check_hash()?;
        if self.prev_hash != tail.hash {
            return Err(ValidationError::PrevHashMismatch {
                expected: tail.hash.clone(),
                actual: self.prev_hash.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prev. hash: {}", hex::encode(&self.prev_hash))?;
        writeln!(f, "Data:       {}", String::from_utf8_lossy(&self.data))?;
        writeln!(f, "Timestamp:  {}", self.timestamp)?;
        writeln!(f, "Hash:       {}", hex::encode(&self.hash))?;
        Ok(())
    }
}

/// SHA-256 over `prev_hash ∥ data ∥ decimal(timestamp)`.
pub fn compute_hash(prev_hash: &[u8], data: &[u8], timestamp: i64) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash);
    hasher.update(data);
    hasher.update(timestamp.to_string().as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Digest as _;

    const TS: i64 = 1_700_000_000;

    #[test]
    fn hash_is_deterministic() {
        let a = compute_hash(b"prev", b"data", TS);
        let b = compute_hash(b"prev", b"data", TS);
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn hash_covers_concatenation_in_order() {
        let mut hasher = Sha256::new();
        hasher.update(b"prevdata1700000000");
        let expected = hasher.finalize().to_vec();
        assert_eq!(compute_hash(b"prev", b"data", TS), expected);
    }

    #[test]
    fn known_digests() {
        assert_eq!(
            hex::encode(compute_hash(b"", b"a", 1)),
            "f55ff16f66f43360266b95db6f8fec01d76031054306ae4a4b380598f6cfd114"
        );
        assert_eq!(
            hex::encode(Block::genesis(0).hash),
            "8500b59bb5271135cd9bcbf0afd693028d76df3b9c7da58d412b13fc8a8f9394"
        );
    }

    #[test]
    fn negative_timestamp_keeps_sign() {
        assert_eq!(compute_hash(b"", b"x", -5), Sha256::digest(b"x-5").to_vec());
    }

    #[test]
    fn genesis_block() {
        let g = Block::genesis(TS);
        assert!(g.is_genesis());
        assert_eq!(g.data, GENESIS_DATA);
        assert!(g.verify());
        assert_eq!(g.hash, compute_hash(b"", GENESIS_DATA, TS));
    }

    #[test]
    fn successor_links_to_previous() {
        let g = Block::genesis(TS);
        let b = Block::successor(&g, b"a".to_vec(), TS + 1);
        assert_eq!(b.prev_hash, g.hash);
        assert!(!b.is_genesis());
        assert!(b.validate(&g).is_ok());
    }

    #[test]
    fn tampered_data_is_hash_mismatch() {
        let g = Block::genesis(TS);
        let mut b = Block::successor(&g, b"original".to_vec(), TS);
        let sealed = b.hash.clone();
        b.data = b"tampered".to_vec();
        assert!(!b.verify());
        match b.validate(&g) {
            Err(ValidationError::HashMismatch { expected, actual }) => {
                assert_eq!(actual, sealed);
                assert_eq!(expected, b.compute_hash());
            }
            other => panic!("expected HashMismatch, got {:?}", other),
        }
    }

    #[test]
    fn check_hash_reports_both_digests() {
        let mut g = Block::genesis(TS);
        assert!(g.check_hash().is_ok());
        let sealed = g.hash.clone();
        g.timestamp = TS + 1;
        assert_eq!(
            g.check_hash(),
            Err(ValidationError::HashMismatch {
                expected: compute_hash(b"", GENESIS_DATA, TS + 1),
                actual: sealed,
            })
        );
    }

    #[test]
    fn wrong_tail_is_prev_hash_mismatch() {
        let g = Block::genesis(TS);
        let b1 = Block::successor(&g, b"a".to_vec(), TS);
        let b2 = Block::successor(&g, b"b".to_vec(), TS);
        assert_eq!(
            b2.validate(&b1),
            Err(ValidationError::PrevHashMismatch {
                expected: b1.hash.clone(),
                actual: g.hash.clone(),
            })
        );
    }

    #[test]
    fn hash_mismatch_short_circuits() {
        let g = Block::genesis(TS);
        let other = Block::genesis(TS + 1);
        let mut b = Block::successor(&g, b"a".to_vec(), TS);
        b.timestamp += 1;
        // Both checks would fail; only the first is reported.
        assert!(matches!(
            b.validate(&other),
            Err(ValidationError::HashMismatch { .. })
        ));
    }

    #[test]
    fn serializes_hashes_as_hex() {
        let g = Block::genesis(TS);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["hash"], hex::encode(&g.hash));
        assert_eq!(json["prev_hash"], "");
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);
    }
}

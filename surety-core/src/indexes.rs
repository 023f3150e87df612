//! Oracle index assignment
//!
//! Indices shard query responsibility: each oracle holds three, each
//! request targets one, so only the oracles holding the matching index
//! need to answer. The drawing is pseudo-random; randomness is injected
//! through [`IndexSource`] so tests can supply a fixed sequence.

use crate::types::Address;
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of oracle indices
pub trait IndexSource: Send {
    /// Draw a single request index from `[0, space)`
    fn next_index(&mut self, requester: &Address, space: u8) -> u8;

    /// Assign three distinct indices from `[0, space)` to an oracle
    ///
    /// Callers guarantee `space >= 3` (enforced by config validation).
    fn oracle_indexes(&mut self, oracle: &Address, space: u8) -> [u8; 3];
}

/// Production source: SHA-256 over caller address, a monotonic nonce,
/// a per-process random seed, and wall-clock entropy
pub struct EntropyIndexSource {
    nonce: u64,
    seed: u64,
}

impl EntropyIndexSource {
    /// Create a source seeded from process randomness
    pub fn new() -> Self {
        Self {
            nonce: 0,
            seed: rand::random(),
        }
    }

    fn draw(&mut self, address: &Address, space: u8) -> u8 {
        let now_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        let mut hasher = Sha256::new();
        hasher.update(address.as_str().as_bytes());
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.seed.to_be_bytes());
        hasher.update(now_nanos.to_be_bytes());
        let digest = hasher.finalize();

        self.nonce = self.nonce.wrapping_add(1);
        digest[0] % space
    }
}

impl Default for EntropyIndexSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSource for EntropyIndexSource {
    fn next_index(&mut self, requester: &Address, space: u8) -> u8 {
        self.draw(requester, space)
    }

    fn oracle_indexes(&mut self, oracle: &Address, space: u8) -> [u8; 3] {
        let mut indexes = [0u8; 3];
        let mut assigned = 0;
        while assigned < 3 {
            let candidate = self.draw(oracle, space);
            if !indexes[..assigned].contains(&candidate) {
                indexes[assigned] = candidate;
                assigned += 1;
            }
        }
        indexes
    }
}

/// Deterministic source for tests: replays a fixed sequence of indices
///
/// `next_index` pops from the front; `oracle_indexes` pops three values,
/// which the caller must have supplied distinct. An exhausted sequence
/// yields zeros.
pub struct SequenceIndexSource {
    sequence: VecDeque<u8>,
}

impl SequenceIndexSource {
    /// Create from the sequence of indices to hand out
    pub fn new(sequence: impl IntoIterator<Item = u8>) -> Self {
        Self {
            sequence: sequence.into_iter().collect(),
        }
    }

    fn pop(&mut self, space: u8) -> u8 {
        self.sequence.pop_front().unwrap_or(0) % space
    }
}

impl IndexSource for SequenceIndexSource {
    fn next_index(&mut self, _requester: &Address, space: u8) -> u8 {
        self.pop(space)
    }

    fn oracle_indexes(&mut self, _oracle: &Address, space: u8) -> [u8; 3] {
        [self.pop(space), self.pop(space), self.pop(space)]
    }
}

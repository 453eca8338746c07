//! Hash-based ID generation for nodes and edges.
//!
//! IDs are `{prefix}-{hash}` (e.g. `node-3k9x`, `edge-0fa2`), where the hash is
//! a base36 rendering of a SHA256 digest over the entity's label, its kind and
//! a per-generator allocation sequence.
//!
//! # Features
//!
//! - **Adaptive length**: hash length grows with the number of live entities (4-6 characters)
//! - **Collision resistant**: nonce retry, then longer hashes
//! - **Never reused**: every ID issued or registered stays reserved for the
//!   lifetime of the generator, even after the entity it named is removed
//!
//! # Example
//!
//! ```
//! use stategraph::id_generation::{IdGenerator, validate_id};
//!
//! let mut generator = IdGenerator::new("node");
//! let id = generator.generate("cartStore", "store", 0);
//!
//! assert!(validate_id(&id, "node"));
//! ```

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;

/// Longest hash a u64 can fill with base36 digits.
const MAX_HASH_LENGTH: usize = 12;

/// Hash-based ID generator that never hands out the same ID twice
///
/// # Memory Growth Pattern
///
/// `reserved` grows with every ID generated or registered and is never
/// pruned, because removed IDs must stay unavailable. For interactive graphs
/// (thousands of entities) this is a few hundred KB at most.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    reserved: HashSet<String>,
    sequence: u64,
}

impl IdGenerator {
    /// Create a new ID generator for the given prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            reserved: HashSet::new(),
            sequence: 0,
        }
    }

    /// The prefix this generator stamps on every ID
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reserve an existing ID (e.g. one loaded from a snapshot)
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.reserved.insert(id.into());
    }

    /// Whether an ID has already been issued or registered
    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Generate a new unique ID
    ///
    /// # Arguments
    ///
    /// * `label` - Display label of the entity
    /// * `kind` - Kind tag of the entity (e.g. "store", or "edge")
    /// * `live_count` - Number of entities currently alive; drives hash length
    pub fn generate(&mut self, label: &str, kind: &str, live_count: usize) -> String {
        let sequence = self.sequence;
        self.sequence += 1;

        let mut id_length = adaptive_length(live_count);

        loop {
            for nonce in 0..MAX_NONCE {
                let id = self.hash_id(label, kind, sequence, nonce, id_length);

                if self.reserved.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(
                            nonce,
                            id_length, "Generated unique ID after {} collision retries", nonce
                        );
                    }
                    return id;
                }
            }

            if id_length >= MAX_HASH_LENGTH {
                break;
            }

            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length to {}",
                id_length + 1
            );
            id_length += 1;
        }

        // Every hash at every length is taken; the sequence suffix is unique
        // among generated IDs, so only registered IDs can still collide.
        let mut suffix = sequence;
        loop {
            let id = format!(
                "{}-{}",
                self.hash_id(label, kind, sequence, 0, MAX_HASH_LENGTH),
                suffix
            );
            if self.reserved.insert(id.clone()) {
                return id;
            }
            suffix += 1;
        }
    }

    fn hash_id(&self, label: &str, kind: &str, sequence: u64, nonce: u32, length: usize) -> String {
        let content = format!("{}|{}|{}|{}", label, kind, sequence, nonce);

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        format!("{}-{}", self.prefix, encode_base36(&hash_bytes[..8], length))
    }
}

/// Determine hash length based on the number of live entities
///
/// - 0-500: 4 chars
/// - 501-1,500: 5 chars
/// - 1,500+: 6 chars
fn adaptive_length(live_count: usize) -> usize {
    match live_count {
        0..=500 => 4,
        501..=1500 => 5,
        _ => 6,
    }
}

/// Encode bytes as a base36 string of exactly `length` digits
///
/// The caller passes at most 8 bytes so the value fits a u64; wrapping
/// arithmetic keeps the output deterministic regardless.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    let mut n = num;

    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.iter().rev().collect()
}

/// Validate ID format
///
/// Valid format: `{prefix}-{hash}` where the hash is 4-12 lowercase base36
/// characters, optionally followed by `-{sequence}`.
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(rest) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    let mut parts = rest.splitn(2, '-');
    let hash = parts.next().unwrap_or_default();

    if hash.len() < 4 || hash.len() > MAX_HASH_LENGTH {
        return false;
    }

    if !hash
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    {
        return false;
    }

    match parts.next() {
        Some(suffix) => suffix.parse::<u64>().is_ok(),
        None => true,
    }
}

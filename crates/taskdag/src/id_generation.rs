//! Hash-based task ID generation.
//!
//! IDs look like `{prefix}-{hash}` (e.g. `proj-k3x9`), where `hash` is a
//! base36 rendering of a SHA-256 digest over the title, the creation time and
//! a retry nonce. The hash starts at 4 characters and grows to 5 and 6 as the
//! number of known IDs passes 500 and 1500, keeping collisions rare without
//! making small projects carry long IDs.
//!
//! # Example
//!
//! ```
//! use taskdag::id_generation::TaskIdGenerator;
//!
//! let mut generator = TaskIdGenerator::new("proj");
//! let id = generator.generate("Write the parser").unwrap();
//! assert!(id.starts_with("proj-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MIN_HASH_LENGTH: usize = 4;
const MAX_HASH_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Every nonce at every allowed length produced a taken ID
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Total hashes tried
        attempts: u32,
    },
}

/// Generates unique task IDs for one prefix.
///
/// The generator remembers every ID it produced or was told about through
/// [`register_id`](Self::register_id), and never hands out one of those again.
#[derive(Debug, Clone)]
pub struct TaskIdGenerator {
    prefix: String,
    taken: HashSet<String>,
}

impl TaskIdGenerator {
    /// Create a generator for the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            taken: HashSet::new(),
        }
    }

    /// The prefix every generated ID starts with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Mark an existing ID as taken.
    pub fn register_id(&mut self, id: impl Into<String>) {
        self.taken.insert(id.into());
    }

    /// Generate a new unique ID for a task with the given title.
    ///
    /// # Errors
    ///
    /// Returns `CollisionExhausted` if no free ID was found, which requires
    /// hundreds of consecutive collisions at every length.
    pub fn generate(&mut self, title: &str) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let start = self.adaptive_length();
        let mut attempts = 0;

        for length in start..=MAX_HASH_LENGTH {
            if length > start {
                warn!(length, max_nonce = MAX_NONCE, "All nonces collided, growing ID length");
            }
            for nonce in 0..MAX_NONCE {
                attempts += 1;
                let id = format!(
                    "{}-{}",
                    self.prefix,
                    hash_to_base36(title, timestamp, nonce, length)
                );
                if self.taken.insert(id.clone()) {
                    if nonce > 0 {
                        debug!(nonce, length, "Generated unique ID after collision retries");
                    }
                    return Ok(id);
                }
            }
        }

        Err(IdGenerationError::CollisionExhausted { attempts })
    }

    /// Hash length for the current number of known IDs.
    ///
    /// - 0-500 IDs: 4 chars
    /// - 501-1500: 5 chars
    /// - 1501+: 6 chars
    fn adaptive_length(&self) -> usize {
        match self.taken.len() {
            0..=500 => MIN_HASH_LENGTH,
            501..=1500 => MIN_HASH_LENGTH + 1,
            _ => MAX_HASH_LENGTH,
        }
    }
}

/// Render the first 8 bytes of the digest as `length` base36 characters.
fn hash_to_base36(title: &str, timestamp: i64, nonce: u32, length: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(timestamp.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();

    let mut prefix_bytes = [0u8; 8];
    prefix_bytes.copy_from_slice(&digest[..8]);
    let mut n = u64::from_be_bytes(prefix_bytes);

    let mut out = vec![0u8; length];
    for slot in out.iter_mut().rev() {
        *slot = BASE36_CHARS[(n % 36) as usize];
        n /= 36;
    }
    out.into_iter().map(char::from).collect()
}

/// Check that `id` has the `{prefix}-{hash}` shape this module produces.
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    (MIN_HASH_LENGTH..=MAX_HASH_LENGTH).contains(&hash.len())
        && hash
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

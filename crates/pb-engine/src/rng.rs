//! Deterministic randomness keyed by a textual seed.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pb_core::EventId;

/// A reproducible pseudo-random source.
///
/// Two instances built from the same seed yield the same outputs for the
/// same call sequence, on any platform. The seed string is folded with
/// FNV-1a rather than the standard hasher, whose output is not stable
/// across releases.
pub struct SeededRng {
    seed: String,
    rng: ChaCha8Rng,
}

impl SeededRng {
    /// Build the generator from a textual seed.
    pub fn from_seed(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let rng = ChaCha8Rng::seed_from_u64(fnv1a64(seed.as_bytes()));
        Self { seed, rng }
    }

    /// The seed this generator was built from.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Pick one element, or `None` from an empty slice.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }
}

/// 64-bit FNV-1a hash.
pub(crate) fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Draw a fresh seed from the current wall time hashed with the event id.
pub fn fresh_seed(event_id: EventId) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{:016x}", fnv1a64(format!("{event_id}:{nanos}").as_bytes()))
}

//! Seed derivation for reproducible Monte-Carlo batches.

use rand::rngs::StdRng;
use rand::SeedableRng;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Derives the seed of batch `substream` from `master_seed`.
///
/// `(master_seed, substream)` is hashed with SipHash-1-3 under zero keys, so
/// the mapping is stable across platforms and releases.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}

/// Generator for batch `substream`.
pub fn substream_rng(master_seed: u64, substream: u64) -> StdRng {
    StdRng::seed_from_u64(derive_substream_seed(master_seed, substream))
}

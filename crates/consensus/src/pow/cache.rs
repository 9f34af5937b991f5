use aqua_primitives::constants::EPOCH_LENGTH;
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

use super::{HASH_BYTES, MIX_BYTES};

const CACHE_BYTES_INIT: u64 = 1 << 24;
const CACHE_BYTES_GROWTH: u64 = 1 << 17;
const DATASET_BYTES_INIT: u64 = 1 << 30;
const DATASET_BYTES_GROWTH: u64 = 1 << 23;

/// An immutable verification cache for one epoch.
///
/// Caches are shared between all verifications of the same epoch and must
/// stay resident for as long as any in-flight verification borrows them;
/// providers hand them out reference-counted for that reason.
#[derive(Debug)]
pub struct EpochCache {
    epoch: u64,
    words: Vec<u32>,
}

impl EpochCache {
    /// Wraps generated cache words for the given epoch.
    pub fn new(epoch: u64, words: Vec<u32>) -> Self {
        Self { epoch, words }
    }

    /// The epoch this cache verifies.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The cache content as native words.
    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

/// Provider of long-lived epoch caches consumed by seal verification.
///
/// Cache generation itself lives with the node; the engine only requires the
/// lookup contract below.
pub trait EpochCaches: Send + Sync {
    /// The verification cache covering the epoch of `block_number`.
    fn cache(&self, block_number: u64) -> Arc<EpochCache>;

    /// Size in bytes of the full dataset for the epoch of `block_number`.
    fn dataset_size(&self, block_number: u64) -> u64;
}

/// Size in bytes of the verification cache for the epoch of `block_number`:
/// linear growth trimmed down to the highest prime item count.
pub fn cache_size(block_number: u64) -> u64 {
    let epoch = block_number / EPOCH_LENGTH;
    let mut size = CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * epoch - HASH_BYTES as u64;
    while !is_prime(size / HASH_BYTES as u64) {
        size -= 2 * HASH_BYTES as u64;
    }
    size
}

/// Size in bytes of the full dataset for the epoch of `block_number`.
pub fn dataset_size(block_number: u64) -> u64 {
    let epoch = block_number / EPOCH_LENGTH;
    let mut size = DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * epoch - MIX_BYTES as u64;
    while !is_prime(size / MIX_BYTES as u64) {
        size -= 2 * MIX_BYTES as u64;
    }
    size
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false
    }
    if n % 2 == 0 {
        return n == 2
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false
        }
        d += 2;
    }
    true
}

/// Deterministic caches sized for the `Test` pow mode: 16 KiB caches paired
/// with the 32 KiB test dataset geometry.
#[derive(Debug, Default)]
pub struct TestCaches {
    generated: Mutex<HashMap<u64, Arc<EpochCache>>>,
}

impl TestCaches {
    /// A provider with no caches generated yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EpochCaches for TestCaches {
    fn cache(&self, block_number: u64) -> Arc<EpochCache> {
        let epoch = block_number / EPOCH_LENGTH;
        self.generated
            .lock()
            .entry(epoch)
            .or_insert_with(|| Arc::new(EpochCache::new(epoch, test_cache_words(epoch))))
            .clone()
    }

    fn dataset_size(&self, _block_number: u64) -> u64 {
        super::TEST_DATASET_SIZE
    }
}

/// 16 KiB of splitmix64 output seeded by the epoch number.
fn test_cache_words(epoch: u64) -> Vec<u32> {
    let mut state = epoch.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(1);
    let mut next = move || {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    };
    let mut words = Vec::with_capacity(4096);
    while words.len() < 4096 {
        let word = next();
        words.push(word as u32);
        words.push((word >> 32) as u32);
    }
    words
}

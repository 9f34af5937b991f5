//! Proof-of-work primitives: the hashimoto mix, the Argon2id seal function
//! and the epoch cache plumbing.

use aqua_primitives::{keccak256, B256};
use once_cell::sync::Lazy;
use sha3::{Digest, Keccak512};

mod cache;
pub use cache::{cache_size, dataset_size, EpochCache, EpochCaches, TestCaches};

/// Bytes in a dataset item group fetched per mix access.
pub(crate) const MIX_BYTES: usize = 128;
/// Bytes in a single cache/dataset item.
const HASH_BYTES: usize = 64;
/// Cache words in a single item.
const HASH_WORDS: usize = 16;
/// Number of cache parents mixed into each dataset item.
const DATASET_PARENTS: u32 = 256;
/// Number of dataset accesses per hashimoto run.
const ACCESSES: usize = 64;

const FNV_PRIME: u32 = 0x0100_0193;

/// Dataset size in bytes of the `Test` pow mode.
pub const TEST_DATASET_SIZE: u64 = 32 * 1024;

#[inline]
fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

fn fnv_hash(mix: &mut [u32], data: &[u32]) {
    for (m, d) in mix.iter_mut().zip(data) {
        *m = fnv(*m, *d);
    }
}

fn keccak512(data: &[u8]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&Keccak512::digest(data));
    out
}

/// Generates one 64-byte dataset item from the verification cache.
fn generate_dataset_item(cache: &[u32], index: u32) -> [u8; HASH_BYTES] {
    let rows = (cache.len() / HASH_WORDS) as u32;

    // seed the item from the cache row it maps onto
    let row = ((index % rows) as usize) * HASH_WORDS;
    let mut seed = [0u8; HASH_BYTES];
    seed[..4].copy_from_slice(&(cache[row] ^ index).to_le_bytes());
    for i in 1..HASH_WORDS {
        seed[i * 4..(i + 1) * 4].copy_from_slice(&cache[row + i].to_le_bytes());
    }
    let seed = keccak512(&seed);

    let mut mix = [0u32; HASH_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = u32::from_le_bytes(seed[i * 4..(i + 1) * 4].try_into().unwrap());
    }

    // fnv it with a lot of random cache nodes based on the index
    for i in 0..DATASET_PARENTS {
        let parent = ((fnv(index ^ i, mix[(i as usize) % HASH_WORDS]) % rows) as usize) * HASH_WORDS;
        fnv_hash(&mut mix, &cache[parent..parent + HASH_WORDS]);
    }

    let mut out = [0u8; HASH_BYTES];
    for (i, word) in mix.iter().enumerate() {
        out[i * 4..(i + 1) * 4].copy_from_slice(&word.to_le_bytes());
    }
    keccak512(&out)
}

/// Aggregates dataset lookups into the `(mix digest, pow result)` pair for a
/// seal attempt.
fn hashimoto(
    hash: B256,
    nonce: u64,
    size: u64,
    lookup: impl Fn(u32) -> [u32; HASH_WORDS],
) -> (B256, B256) {
    let rows = (size / MIX_BYTES as u64) as u32;

    // start the mix with a replicated seed
    let mut seed = [0u8; 40];
    seed[..32].copy_from_slice(hash.as_slice());
    seed[32..].copy_from_slice(&nonce.to_le_bytes());
    let seed = keccak512(&seed);
    let seed_head = u32::from_le_bytes(seed[..4].try_into().unwrap());

    const MIX_WORDS: usize = MIX_BYTES / 4;
    let mut mix = [0u32; MIX_WORDS];
    for (i, word) in mix.iter_mut().enumerate() {
        *word = u32::from_le_bytes(seed[(i % HASH_WORDS) * 4..(i % HASH_WORDS) * 4 + 4]
            .try_into()
            .unwrap());
    }

    // mix in random dataset item groups
    let mut temp = [0u32; MIX_WORDS];
    for i in 0..ACCESSES {
        let parent = fnv(i as u32 ^ seed_head, mix[i % MIX_WORDS]) % rows;
        for j in 0..(MIX_BYTES / HASH_BYTES) as u32 {
            let item = lookup(2 * parent + j);
            temp[(j as usize) * HASH_WORDS..(j as usize + 1) * HASH_WORDS].copy_from_slice(&item);
        }
        fnv_hash(&mut mix, &temp);
    }

    // compress the mix down to the digest
    let mut digest = [0u8; 32];
    for i in 0..MIX_WORDS / 4 {
        let word = fnv(fnv(fnv(mix[i * 4], mix[i * 4 + 1]), mix[i * 4 + 2]), mix[i * 4 + 3]);
        digest[i * 4..(i + 1) * 4].copy_from_slice(&word.to_le_bytes());
    }

    let mut preimage = [0u8; 96];
    preimage[..64].copy_from_slice(&seed);
    preimage[64..].copy_from_slice(&digest);
    (B256::from(digest), keccak256(preimage))
}

/// Hashimoto verification over the small epoch cache, synthesizing dataset
/// items on the fly rather than reading the full dataset.
pub fn hashimoto_light(size: u64, cache: &[u32], hash: B256, nonce: u64) -> (B256, B256) {
    hashimoto(hash, nonce, size, |index| {
        let raw = generate_dataset_item(cache, index);
        let mut item = [0u32; HASH_WORDS];
        for (i, word) in item.iter_mut().enumerate() {
            *word = u32::from_le_bytes(raw[i * 4..(i + 1) * 4].try_into().unwrap());
        }
        item
    })
}

static ARGON2: Lazy<argon2::Argon2<'static>> = Lazy::new(|| {
    let params =
        argon2::Params::new(1024, 1, 1, Some(32)).expect("static argon2 params are valid");
    argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
});

const ARGON2_SALT: &[u8; 8] = b"aquaseal";

/// The Argon2id seal function over the 40-byte seal seed
/// (`hash_no_nonce ‖ le64(nonce)`). Parameters are fixed: 1 MiB memory,
/// 1 pass, 1 lane.
pub fn argon2id(seed: &[u8; 40]) -> B256 {
    let mut out = [0u8; 32];
    ARGON2
        .hash_password_into(seed, ARGON2_SALT, &mut out)
        .expect("argon2 output length is valid");
    B256::from(out)
}

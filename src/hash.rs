//! Key hashing for shard routing.
//!
//! Only the contract matters to the rest of the crate: a [`KeyHasher`] maps a
//! key string to a `u64`, deterministically, with no shared mutable state.
//! Collisions are harmless; they only affect how evenly keys spread across
//! shards.

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// Deterministic `&str -> u64` mapping used to pick a shard.
pub trait KeyHasher: Send + Sync {
    fn hash_key(&self, key: &str) -> u64;
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. The default shard router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fnv1a;

impl KeyHasher for Fnv1a {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        key.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

/// `rustc_hash::FxHasher` over the key bytes.
///
/// Faster than FNV-1a on long keys; its low bits are weaker on short,
/// similar keys, which matters because routing masks the low bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FxKeyHasher;

impl KeyHasher for FxKeyHasher {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(key.as_bytes());
        hasher.finish()
    }
}

impl<F> KeyHasher for F
where
    F: Fn(&str) -> u64 + Send + Sync,
{
    fn hash_key(&self, key: &str) -> u64 {
        self(key)
    }
}

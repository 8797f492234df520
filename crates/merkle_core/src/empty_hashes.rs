//! Memoized hashes of fully empty subtrees.
//!
//! `empty(0)` is [`ZERO_HASH`], `empty(n) = hash_pair(empty(n-1), empty(n-1))`.
//! An odd trailing node at layer `n` is paired with `empty(n)` when reducing.

use std::sync::LazyLock;

use parking_lot::RwLock;
use tracing::trace;

use crate::{
    Error, Id32, Result, ZERO_HASH,
    hasher::{MerkleHasher, Sha256Hasher},
    merkle::MAX_LAYER,
};

static GLOBAL: LazyLock<EmptyHashCache> = LazyLock::new(|| EmptyHashCache::new(Sha256Hasher));

/// Append-only table of empty subtree hashes indexed by layer number.
///
/// The cache owns the hasher it extends itself with, so everything reduced
/// through it is hashed with the same primitive.
pub struct EmptyHashCache<H = Sha256Hasher> {
    hasher: H,
    hashes: RwLock<Vec<Id32>>,
}

impl EmptyHashCache<Sha256Hasher> {
    /// Process-wide sha256 cache.
    pub fn global() -> &'static EmptyHashCache<Sha256Hasher> {
        &GLOBAL
    }
}

impl Default for EmptyHashCache<Sha256Hasher> {
    fn default() -> Self {
        Self::new(Sha256Hasher)
    }
}

impl<H: MerkleHasher> EmptyHashCache<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            hasher,
            hashes: RwLock::new(vec![ZERO_HASH]),
        }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Number of memoized layers. Never less than 1.
    pub fn len(&self) -> usize {
        self.hashes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Hash of an empty subtree spanning `layer` levels.
    ///
    /// Layers above [`MAX_LAYER`] are rejected without touching the table.
    /// If the hasher fails while extending, nothing is recorded for the failed
    /// layer and the error is returned; layers below it stay memoized.
    pub fn get(&self, layer: u32) -> Result<Id32> {
        if layer > MAX_LAYER {
            return Err(Error::TargetLayerTooHigh {
                target: layer,
                max: MAX_LAYER,
            });
        }
        let idx = layer as usize;
        if let Some(h) = self.hashes.read().get(idx) {
            return Ok(*h);
        }

        let mut hashes = self.hashes.write();
        // Someone else might have extended it while we were waiting for the lock.
        while hashes.len() <= idx {
            let next_layer = hashes.len() as u32;
            let prev = hashes[hashes.len() - 1];
            let next = self
                .hasher
                .hash_pair(&prev, &prev)
                .map_err(|source| Error::EmptyHash {
                    layer: next_layer,
                    source,
                })?;
            trace!(layer = next_layer, hash = ?next, "extended empty hash cache");
            hashes.push(next);
        }
        Ok(hashes[idx])
    }

    /// Hash one leaf block. Zero-length blocks are padding and hash to [`ZERO_HASH`].
    pub fn hash_block(&self, buf: &[u8]) -> Result<Id32> {
        crate::merkle::hash_block(&self.hasher, buf)
    }
}

impl<H> std::fmt::Debug for EmptyHashCache<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmptyHashCache")
            .field("layers", &self.hashes.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::tests::test_util::BudgetHasher;

    #[test]
    fn test_layer_zero_is_zero_hash() {
        let cache = EmptyHashCache::default();
        assert_eq!(cache.get(0).unwrap(), ZERO_HASH);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_known_empty_hashes() {
        let cache = EmptyHashCache::default();
        assert_eq!(
            cache.get(1).unwrap(),
            Id32::from_str("f5a5fd42d16a20302798ef6ed309979b43003d2320d9f0e8ea9831a92759fb4b")
                .unwrap()
        );
        // Skipping ahead works.
        assert_eq!(
            cache.get(7).unwrap(),
            Id32::from_str("87eb0ddba57e35f6d286673802a4af5975e22506c7cf4c64bb6be5ee11527f2c")
                .unwrap()
        );
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn test_each_layer_is_pair_of_previous() {
        let cache = EmptyHashCache::default();
        for layer in 1..20 {
            let prev = cache.get(layer - 1).unwrap();
            let expected = Sha256Hasher.hash_pair(&prev, &prev).unwrap();
            assert_eq!(cache.get(layer).unwrap(), expected, "layer {layer}");
        }
    }

    #[test]
    fn test_query_order_does_not_matter() {
        let forward = EmptyHashCache::default();
        let l1 = forward.get(1).unwrap();

        let backward = EmptyHashCache::default();
        let _ = backward.get(7).unwrap();
        assert_eq!(backward.get(1).unwrap(), l1);
        assert_eq!(backward.get(1).unwrap(), l1);
    }

    #[test]
    fn test_global_matches_fresh_cache() {
        let fresh = EmptyHashCache::default();
        assert_eq!(
            EmptyHashCache::global().get(5).unwrap(),
            fresh.get(5).unwrap()
        );
    }

    #[test]
    fn test_failed_extension_records_nothing() {
        let cache = EmptyHashCache::new(BudgetHasher::new(3));
        let err = cache.get(7).unwrap_err();
        assert!(
            matches!(err, Error::EmptyHash { layer: 4, .. }),
            "unexpected error {err:?}"
        );
        // Layers 1..=3 were computed before the failure, nothing past them.
        assert_eq!(cache.len(), 4);
        assert_eq!(
            cache.get(3).unwrap(),
            EmptyHashCache::default().get(3).unwrap()
        );
        assert!(cache.get(4).is_err());
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_layer_above_max_is_rejected_without_extending() {
        let cache = EmptyHashCache::default();
        for layer in [MAX_LAYER + 1, 2_000_000, u32::MAX] {
            let err = cache.get(layer).unwrap_err();
            assert!(
                matches!(err, Error::TargetLayerTooHigh { target, max: MAX_LAYER } if target == layer),
                "unexpected error {err:?}"
            );
            assert_eq!(cache.len(), 1);
        }

        cache.get(MAX_LAYER).unwrap();
        assert_eq!(cache.len(), MAX_LAYER as usize + 1);
        assert!(cache.get(MAX_LAYER + 1).is_err());
        assert_eq!(cache.len(), MAX_LAYER as usize + 1);
    }

    #[test]
    fn test_concurrent_extension_is_consistent() {
        let cache = EmptyHashCache::default();
        let expected = EmptyHashCache::default().get(64).unwrap();
        std::thread::scope(|s| {
            for i in 0..8u32 {
                let cache = &cache;
                s.spawn(move || {
                    assert_eq!(cache.get(64).unwrap(), expected);
                    cache.get(i * 8).unwrap();
                });
            }
        });
        assert_eq!(cache.len(), 65);
    }
}

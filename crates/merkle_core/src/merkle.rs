//! SHA-256 merkle tree reduction and verification for BEP 52 (BitTorrent v2).
//!
//! BEP 52 uses a binary merkle tree of SHA-256 hashes over 16 KiB blocks.
//! Hashes in `piece layers` are one layer of that tree (the "piece layer"),
//! and the file's `pieces root` is the tree's root. Validating a piece layer
//! means reducing it, layer by layer, back up to the root.
//!
//! Trees are not padded up front. A layer may have any number of hashes; an
//! unpaired trailing hash at layer `n` is paired with the hash of an empty
//! subtree at layer `n`, taken from [`EmptyHashCache`].

use tracing::debug;

use crate::{
    EmptyHashCache, Error, Id32, Result, ZERO_HASH, hasher::MerkleHasher,
    lengths::layer_number_for_piece_length,
};

/// Root reduction stops at this layer. 16 KiB * 2^100 is more than anyone will
/// ever hash, so hitting it means the input is malformed.
pub const MAX_LAYER: u32 = 100;

/// One horizontal slice of a merkle tree.
///
/// Layer 0 holds the leaf hashes, layer 1 the layer above it, and so on. The
/// layer number is what tells us which empty subtree hash pads an odd layer, so
/// trailing hashes representing no data can be left out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MerkleLayer {
    pub number: u32,
    pub hashes: Vec<Id32>,
}

impl MerkleLayer {
    pub fn new(number: u32, hashes: Vec<Id32>) -> Self {
        Self { number, hashes }
    }

    /// The layer `hashes` belong to if each of them covers one piece of `piece_length` bytes.
    pub fn for_piece_length(piece_length: i64, hashes: Vec<Id32>) -> Result<Self> {
        let number = layer_number_for_piece_length(piece_length)
            .ok_or(Error::InvalidPieceLength(piece_length))?;
        Ok(Self { number, hashes })
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Hash a single leaf block (at most 16 KiB).
///
/// An empty block is padding and gets [`ZERO_HASH`], not the hash of zero bytes.
pub fn hash_block<H: MerkleHasher>(hasher: &H, buf: &[u8]) -> Result<Id32> {
    if buf.is_empty() {
        return Ok(ZERO_HASH);
    }
    hasher.hash_single(buf).map_err(Error::LeafHash)
}

/// Compute the layer above `hashes`, which are at layer `layer_number`.
///
/// The result has `ceil(hashes.len() / 2)` elements. An empty input gives an
/// empty output, failures are always `Err`.
pub fn reduce_layer<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    layer_number: u32,
    hashes: &[Id32],
) -> Result<Vec<Id32>> {
    let mut out = Vec::with_capacity(hashes.len().div_ceil(2));
    for pair in hashes.chunks(2) {
        let left = pair[0];
        let right = match pair.get(1) {
            Some(right) => *right,
            None => cache.get(layer_number)?,
        };
        let parent = cache
            .hasher()
            .hash_pair(&left, &right)
            .map_err(|source| Error::Reduction {
                layer: layer_number,
                source,
            })?;
        out.push(parent);
    }
    Ok(out)
}

/// Reduce `layer` up to `target_layer`.
///
/// Reducing "down" is a caller bug and is rejected. Reducing to the layer's own
/// number returns it unchanged.
pub fn reduce_to_layer<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    target_layer: u32,
    layer: &MerkleLayer,
) -> Result<MerkleLayer> {
    if target_layer < layer.number {
        return Err(Error::TargetLayerBelowCurrent {
            target: target_layer,
            current: layer.number,
        });
    }
    if target_layer > MAX_LAYER {
        return Err(Error::TargetLayerTooHigh {
            target: target_layer,
            max: MAX_LAYER,
        });
    }

    let mut hashes = layer.hashes.clone();
    for current in layer.number..target_layer {
        hashes = reduce_layer(cache, current, &hashes)?;
    }
    Ok(MerkleLayer {
        number: target_layer,
        hashes,
    })
}

/// Reduce `layer` all the way to the root hash of its tree.
pub fn reduce_to_root<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    layer: &MerkleLayer,
) -> Result<Id32> {
    reduce_hashes_to_root(cache, layer.number, &layer.hashes)
}

/// Like [`reduce_to_root`], for hashes at layer `number` that aren't wrapped
/// in a [`MerkleLayer`].
pub fn reduce_hashes_to_root<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    number: u32,
    hashes: &[Id32],
) -> Result<Id32> {
    let mut current = number;
    let mut hashes = std::borrow::Cow::Borrowed(hashes);
    while current < MAX_LAYER && hashes.len() > 1 {
        hashes = reduce_layer(cache, current, &hashes)?.into();
        current += 1;
    }
    match &hashes[..] {
        [root] => Ok(*root),
        [] => Err(Error::EmptyLayer),
        rest => Err(Error::LayerBoundExceeded {
            max_layer: MAX_LAYER,
            remaining: rest.len(),
        }),
    }
}

/// Check that `layer` reduces to `root`, returning why not if it doesn't.
pub fn check_piece_layers<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    root: &Id32,
    layer: &MerkleLayer,
) -> Result<()> {
    check_piece_layer_hashes(cache, root, layer.number, &layer.hashes)
}

/// [`check_piece_layers`] over borrowed hashes at layer `number`.
pub fn check_piece_layer_hashes<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    root: &Id32,
    number: u32,
    hashes: &[Id32],
) -> Result<()> {
    let found = reduce_hashes_to_root(cache, number, hashes)?;
    if found != *root {
        return Err(Error::RootMismatch {
            expected: *root,
            found,
        });
    }
    Ok(())
}

/// True only if `layer` reduces to exactly `root`. Any failure on the way is false.
pub fn validate_piece_layers<H: MerkleHasher>(
    cache: &EmptyHashCache<H>,
    root: &Id32,
    layer: &MerkleLayer,
) -> bool {
    match check_piece_layers(cache, root, layer) {
        Ok(()) => true,
        Err(e) => {
            debug!(
                layer = layer.number,
                hashes = layer.hashes.len(),
                "piece layers failed validation: {e:#}"
            );
            false
        }
    }
}

//! Structural decoding of `piece layers` entries.
//!
//! In a v2 torrent, `piece layers` maps each file's `pieces root` (32 raw
//! bytes) to the concatenated hashes of that file's piece layer. Decoding the
//! outer bencoded dictionary happens elsewhere; here we only get the raw key
//! and value buffers.

use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    DIGEST_LEN, EmptyHashCache, Error, Id32, MerkleLayer, Result, hasher::MerkleHasher,
    lengths::layer_number_for_piece_length, merkle::check_piece_layer_hashes,
};

/// One `piece layers` entry: the file's root and the hashes of its piece layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceLayersEntry {
    pub root: Id32,
    pub hashes: Vec<Id32>,
}

impl PieceLayersEntry {
    /// Decode a raw (key, value) pair, telling why it's malformed if it is.
    pub fn try_parse(key: &[u8], value: &[u8]) -> Result<Self> {
        let root = Id32::from_bytes(key).ok_or(Error::PieceLayersWrongKeySize {
            expected: DIGEST_LEN,
            actual: key.len(),
        })?;
        if value.len() % DIGEST_LEN != 0 {
            return Err(Error::PieceLayersWrongValueSize { len: value.len() });
        }
        let (digests, _) = value.as_chunks::<DIGEST_LEN>();
        let hashes = digests.iter().copied().map(Id32::new).collect();
        Ok(Self { root, hashes })
    }

    /// Decode a raw (key, value) pair. The key must be exactly one digest and
    /// the value a whole number of digests.
    pub fn parse(key: &[u8], value: &[u8]) -> Option<Self> {
        Self::try_parse(key, value)
            .inspect_err(|e| trace!("error parsing piece layers entry: {e:#}"))
            .ok()
    }

    /// Attach the layer number the hashes are at.
    pub fn into_layer(self, number: u32) -> (Id32, MerkleLayer) {
        (self.root, MerkleLayer::new(number, self.hashes))
    }
}

/// All `piece layers` entries of a torrent, keyed by root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceLayers {
    entries: BTreeMap<Id32, Vec<Id32>>,
}

impl PieceLayers {
    /// Decode every raw pair. One malformed or duplicate entry rejects the lot.
    pub fn from_raw_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let mut out = BTreeMap::new();
        for (k, v) in entries {
            let entry = PieceLayersEntry::try_parse(k.as_ref(), v.as_ref())?;
            if out.insert(entry.root, entry.hashes).is_some() {
                return Err(Error::PieceLayersDuplicateRoot(entry.root));
            }
        }
        Ok(Self { entries: out })
    }

    pub fn get(&self, root: &Id32) -> Option<&[Id32]> {
        self.entries.get(root).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id32, &[Id32])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Check every entry reduces to its root, with piece layer hashes covering
    /// `piece_length` bytes each.
    pub fn validate<H: MerkleHasher>(
        &self,
        cache: &EmptyHashCache<H>,
        piece_length: i64,
    ) -> Result<()> {
        let number = layer_number_for_piece_length(piece_length)
            .ok_or(Error::InvalidPieceLength(piece_length))?;
        for (root, hashes) in self.entries.iter() {
            check_piece_layer_hashes(cache, root, number, hashes)?;
            trace!(?root, pieces = hashes.len(), "piece layers entry ok");
        }
        Ok(())
    }
}

//! Merkle trees for BitTorrent v2 (BEP 52).
//!
//! Hashes 16 KiB leaf blocks, memoizes empty subtree hashes, reduces tree layers
//! up to the root and validates `piece layers` entries against their file's
//! `pieces root`.
//!
//! See <https://www.bittorrent.org/beps/bep_0052.html>

pub mod empty_hashes;
pub mod error;
pub mod hash_id;
pub mod hasher;
pub mod lengths;
pub mod merkle;
pub mod piece_layers;


pub use empty_hashes::EmptyHashCache;
pub use error::{Error, Result};
pub use hash_id::{Id, Id32};
pub use hasher::{HashError, MerkleHasher, Sha256Hasher};
pub use lengths::{
    MERKLE_BLOCK_SIZE, layer_number_for_piece_length, piece_length_for_layer_number,
};
pub use merkle::{
    MAX_LAYER, MerkleLayer, check_piece_layer_hashes, check_piece_layers, hash_block,
    reduce_hashes_to_root, reduce_layer, reduce_to_layer, reduce_to_root, validate_piece_layers,
};
pub use piece_layers::{PieceLayers, PieceLayersEntry};

/// Width in bytes of every digest in the tree.
pub const DIGEST_LEN: usize = 32;

/// Layer 0 sentinel: padding leaves and zero-length blocks are all-zero bytes,
/// NOT the sha256 of nothing.
pub const ZERO_HASH: Id32 = Id([0u8; DIGEST_LEN]);

assert_cfg::exactly_one! {
    feature = "sha256-crypto-hash",
    feature = "sha256-openssl",
    feature = "sha256-rust",
}

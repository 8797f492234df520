use crate::{Id32, hasher::HashError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error hashing leaf block: {0}")]
    LeafHash(#[source] HashError),
    #[error("error computing empty hash for layer {layer}: {source}")]
    EmptyHash {
        layer: u32,
        #[source]
        source: HashError,
    },
    #[error("error reducing merkle layer {layer}: {source}")]
    Reduction {
        layer: u32,
        #[source]
        source: HashError,
    },

    #[error("can't reduce layer {current} down to layer {target}")]
    TargetLayerBelowCurrent { target: u32, current: u32 },
    #[error("target layer {target} is above the maximum layer {max}")]
    TargetLayerTooHigh { target: u32, max: u32 },
    #[error("layer didn't reduce to a single hash by layer {max_layer}, {remaining} hashes left")]
    LayerBoundExceeded { max_layer: u32, remaining: usize },
    #[error("empty merkle layer has no root")]
    EmptyLayer,
    #[error("merkle root mismatch: expected {expected}, found {found}")]
    RootMismatch { expected: Id32, found: Id32 },

    #[error("piece_layers key has wrong size: expected {expected}, got {actual}")]
    PieceLayersWrongKeySize { expected: usize, actual: usize },
    #[error("piece_layers value length {len} is not a multiple of the digest size")]
    PieceLayersWrongValueSize { len: usize },
    #[error("duplicate piece_layers entry for root {0}")]
    PieceLayersDuplicateRoot(Id32),

    #[error("invalid v2 piece length {0}: must be a power of two and >= 16384")]
    InvalidPieceLength(i64),
}

pub type Result<T> = std::result::Result<T, Error>;

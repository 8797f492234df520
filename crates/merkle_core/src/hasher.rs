use crate::Id32;

pub use sha256w::Error as HashError;

/// The hash primitive the merkle tree is built from.
///
/// `hash_pair(a, b)` must equal `hash_single` over the bytes of `a` followed by
/// the bytes of `b`.
pub trait MerkleHasher: Send + Sync {
    fn hash_single(&self, buf: &[u8]) -> Result<Id32, HashError>;
    fn hash_pair(&self, left: &Id32, right: &Id32) -> Result<Id32, HashError>;
}

/// sha256 through whichever backend `sha256w` was built with.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl MerkleHasher for Sha256Hasher {
    fn hash_single(&self, buf: &[u8]) -> Result<Id32, HashError> {
        sha256w::sha256(buf).map(Id32::new)
    }

    fn hash_pair(&self, left: &Id32, right: &Id32) -> Result<Id32, HashError> {
        sha256w::sha256_concat(left.as_bytes(), right.as_bytes()).map(Id32::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair_is_hash_of_concatenation() {
        let h = Sha256Hasher;
        let a = h.hash_single(b"left").unwrap();
        let b = h.hash_single(b"right").unwrap();

        let mut joined = Vec::new();
        joined.extend_from_slice(&a.0);
        joined.extend_from_slice(&b.0);

        assert_eq!(h.hash_pair(&a, &b).unwrap(), h.hash_single(&joined).unwrap());
        // Order matters.
        assert_ne!(h.hash_pair(&a, &b).unwrap(), h.hash_pair(&b, &a).unwrap());
    }

    #[test]
    fn test_matches_backend_helpers() {
        let h = Sha256Hasher;
        assert_eq!(
            h.hash_single(b"hello world").unwrap().as_string(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
        assert_eq!(
            h.hash_single(b"hello world").unwrap().0,
            sha256w::sha256(b"hello world").unwrap()
        );
        let a = Id32::new([1u8; 32]);
        let b = Id32::new([2u8; 32]);
        assert_eq!(
            h.hash_pair(&a, &b).unwrap().0,
            sha256w::sha256_concat(&a.0, &b.0).unwrap()
        );
    }
}

// Wrapper for sha256 libraries.
// BitTorrent v2 hashes every 16 KiB block and every merkle node with sha256,
// so this is where most of the CPU goes when validating piece layers.
// The system/openssl implementations are usually faster, the pure-rust one
// is there for targets where linking them is a pain.

#[cfg(feature = "sha256-openssl")]
pub type Sha256 = Sha256Openssl;

#[cfg(all(feature = "sha256-rust", not(feature = "sha256-openssl")))]
pub type Sha256 = Sha256Rust;

#[cfg(all(
    feature = "sha256-crypto-hash",
    not(any(feature = "sha256-openssl", feature = "sha256-rust"))
))]
pub type Sha256 = Sha256System;

pub const SHA256_LEN: usize = 32;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error feeding data to sha256: {0}")]
    Io(#[from] std::io::Error),
    #[error("sha256 backend returned a digest of {0} bytes, expected 32")]
    UnexpectedDigestLength(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ISha256 {
    fn new() -> Self;
    fn update(&mut self, buf: &[u8]) -> Result<()>;
    fn finish(self) -> Result<[u8; SHA256_LEN]>;
}

/// sha256 of a single buffer.
pub fn sha256(buf: &[u8]) -> Result<[u8; SHA256_LEN]> {
    let mut h = Sha256::new();
    h.update(buf)?;
    h.finish()
}

/// sha256(left || right).
pub fn sha256_concat(left: &[u8], right: &[u8]) -> Result<[u8; SHA256_LEN]> {
    let mut h = Sha256::new();
    h.update(left)?;
    h.update(right)?;
    h.finish()
}

#[cfg(feature = "sha256-rust")]
pub struct Sha256Rust {
    inner: sha2::Sha256,
}

#[cfg(feature = "sha256-rust")]
impl ISha256 for Sha256Rust {
    fn new() -> Self {
        use sha2::Digest;
        Sha256Rust {
            inner: sha2::Sha256::new(),
        }
    }

    fn update(&mut self, buf: &[u8]) -> Result<()> {
        use sha2::Digest;
        self.inner.update(buf);
        Ok(())
    }

    fn finish(self) -> Result<[u8; SHA256_LEN]> {
        use sha2::Digest;
        Ok(self.inner.finalize().into())
    }
}

#[cfg(feature = "sha256-openssl")]
pub struct Sha256Openssl {
    inner: openssl::sha::Sha256,
}

#[cfg(feature = "sha256-openssl")]
impl ISha256 for Sha256Openssl {
    fn new() -> Self {
        Self {
            inner: openssl::sha::Sha256::new(),
        }
    }

    fn update(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.update(buf);
        Ok(())
    }

    fn finish(self) -> Result<[u8; SHA256_LEN]> {
        Ok(self.inner.finish())
    }
}

#[cfg(feature = "sha256-crypto-hash")]
pub struct Sha256System {
    inner: crypto_hash::Hasher,
}

#[cfg(feature = "sha256-crypto-hash")]
impl ISha256 for Sha256System {
    fn new() -> Self {
        Self {
            inner: crypto_hash::Hasher::new(crypto_hash::Algorithm::SHA256),
        }
    }

    fn update(&mut self, buf: &[u8]) -> Result<()> {
        use std::io::Write;
        self.inner.write_all(buf)?;
        Ok(())
    }

    fn finish(mut self) -> Result<[u8; SHA256_LEN]> {
        let result = self.inner.finish();
        if result.len() != SHA256_LEN {
            return Err(Error::UnexpectedDigestLength(result.len()));
        }
        let mut result_arr = [0u8; SHA256_LEN];
        result_arr.copy_from_slice(&result);
        Ok(result_arr)
    }
}

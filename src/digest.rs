//! Byte-oriented digests and their adapter to [`BuildHasher`].
//!
//! A [`Digest`] is a pure function from a byte string to a `u64`.
//! [`DigestBuildHasher`] buffers whatever a key's `Hash` impl writes and
//! digests the buffer on `finish`, so any digest can drive any engine.
//!
//! The bundled digests are intentionally simple. [`Addition`] in particular
//! collides on every permutation of the same bytes and is meant for watching
//! the engines degrade gracefully.

use crate::error::TableError;
use core::hash::{BuildHasher, Hasher};
use smallvec::SmallVec;

/// Deterministic `bytes -> u64`.
pub trait Digest {
    fn digest(&self, bytes: &[u8]) -> u64;
}

/// Bytes buffered inline before spilling to the heap; covers every integer
/// key and short strings.
const INLINE_BYTES: usize = 32;

/// Polynomials of degree eight or more are rejected.
const MAX_COEFFICIENTS: usize = 7;

/// [`BuildHasher`] over a [`Digest`].
#[derive(Clone, Debug, Default)]
pub struct DigestBuildHasher<D> {
    digest: D,
}

impl<D: Digest + Clone> DigestBuildHasher<D> {
    pub fn new(digest: D) -> Self {
        Self { digest }
    }

    pub fn digest(&self) -> &D {
        &self.digest
    }
}

impl<D: Digest + Clone> BuildHasher for DigestBuildHasher<D> {
    type Hasher = DigestHasher<D>;

    fn build_hasher(&self) -> DigestHasher<D> {
        DigestHasher {
            digest: self.digest.clone(),
            bytes: SmallVec::new(),
        }
    }
}

pub struct DigestHasher<D> {
    digest: D,
    bytes: SmallVec<[u8; INLINE_BYTES]>,
}

impl<D: Digest> Hasher for DigestHasher<D> {
    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        self.digest.digest(&self.bytes)
    }
}

/// Polynomial evaluated at the first eight input bytes (read little-endian,
/// zero-padded), modulo `modulus`.
///
/// Coefficients are given lowest degree first: `[3, 5, 7, 11]` is
/// `3 + 5x + 7x^2 + 11x^3`. Arithmetic wraps at 64 bits before each
/// reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    modulus: u64,
    coefficients: SmallVec<[u64; MAX_COEFFICIENTS]>,
}

impl Polynomial {
    pub const MAX_COEFFICIENTS: usize = MAX_COEFFICIENTS;

    pub fn new(modulus: u64, coefficients: &[u64]) -> Result<Self, TableError> {
        if modulus == 0 {
            return Err(TableError::InvalidHasher("polynomial modulus is zero"));
        }
        if coefficients.len() > Self::MAX_COEFFICIENTS {
            return Err(TableError::InvalidHasher(
                "polynomial needs fewer than 8 coefficients",
            ));
        }
        Ok(Self {
            modulus,
            coefficients: SmallVec::from_slice(coefficients),
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }
}

impl Default for Polynomial {
    /// `3 + 5x + 7x^2 + 11x^3 mod 1_000_000_007`.
    fn default() -> Self {
        Self {
            modulus: 1_000_000_007,
            coefficients: SmallVec::from_slice(&[3, 5, 7, 11]),
        }
    }
}

impl Digest for Polynomial {
    fn digest(&self, bytes: &[u8]) -> u64 {
        let mut word = [0u8; 8];
        let n = bytes.len().min(8);
        word[..n].copy_from_slice(&bytes[..n]);
        let x = u64::from_le_bytes(word);
        // Horner, highest degree first.
        self.coefficients
            .iter()
            .rev()
            .fold(0u64, |acc, &c| acc.wrapping_mul(x).wrapping_add(c) % self.modulus)
    }
}

/// Sum of all input bytes modulo `modulus`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Addition {
    modulus: u64,
}

impl Addition {
    pub fn new(modulus: u64) -> Result<Self, TableError> {
        if modulus == 0 {
            return Err(TableError::InvalidHasher("addition modulus is zero"));
        }
        Ok(Self { modulus })
    }
}

impl Default for Addition {
    fn default() -> Self {
        Self { modulus: u64::MAX }
    }
}

impl Digest for Addition {
    fn digest(&self, bytes: &[u8]) -> u64 {
        bytes
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_add(u64::from(b)))
            % self.modulus
    }
}

//! Hash infrastructure for blocks and nodes in the Merkle tree.

use std::fmt::Debug;
use std::hash::Hasher;

/// Digest stored in the merkle tree.
///
/// Digests are fixed size and compared by exact byte equality only.
pub trait Element: Clone + Eq + AsRef<[u8]> + Debug + Send + Sync {
    /// Returns the length of a digest when serialized as a byte slice.
    fn byte_len() -> usize;

    /// Creates the digest from its byte form. Returns `None` if the slice is
    /// not exactly `byte_len()` bytes long.
    fn from_slice(bytes: &[u8]) -> Option<Self>;
}

impl<const N: usize> Element for [u8; N] {
    #[inline]
    fn byte_len() -> usize {
        N
    }

    fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; N]>::try_from(bytes).ok()
    }
}

/// Hashing algorithm type.
///
/// Algorithm conforms standard [`Hasher`] trait (`write` consumes bytes) and
/// provides methods to return the full length digest and reset current state.
///
/// [`Algorithm::hash`] takes `&mut self` because most cryptographic digest
/// implementations consume their state on finalization. Callers should go
/// through [`Algorithm::leaf`] and [`Algorithm::node`], which reset the state
/// before writing and after reading, so that no digest is contaminated by a
/// previous computation.
///
/// ```text
/// leaf(b)    = ALG(b)
/// node(l, r) = ALG(l || r)        r may be empty for an unpaired node
/// ```
pub trait Algorithm<T: Element>: Hasher {
    /// Returns the hash value for the data stream written so far.
    fn hash(&mut self) -> T;

    /// Reset Hasher state.
    fn reset(&mut self);

    /// Returns digest of the empty thing.
    fn empty(&mut self) -> T {
        self.reset();
        let h = self.hash();
        self.reset();
        h
    }

    /// Returns the hash value for a tree leaf: the digest of the raw block.
    fn leaf(&mut self, block: &[u8]) -> T {
        self.reset();
        self.write(block);
        let h = self.hash();
        self.reset();
        h
    }

    /// Returns the hash value for an interior node: the digest of `left`
    /// concatenated with `right`, in that order.
    ///
    /// An unpaired node passes an empty `right` and is re-hashed on its own.
    fn node(&mut self, left: &[u8], right: &[u8]) -> T {
        self.reset();
        self.write(left);
        self.write(right);
        let h = self.hash();
        self.reset();
        h
    }
}

#[cfg(feature = "sha256")]
pub use self::sha256::{Sha256Algorithm, Sha256Hash};

#[cfg(feature = "sha256")]
mod sha256 {
    use super::Algorithm;
    use sha2::{Digest, Sha256};
    use std::fmt;
    use std::hash::Hasher;

    /// SHA-256 digest as produced by [`Sha256Algorithm`].
    pub type Sha256Hash = [u8; 32];

    /// Default [`Algorithm`]: plain single SHA-256.
    #[derive(Clone, Default)]
    pub struct Sha256Algorithm(Sha256);

    impl Sha256Algorithm {
        /// Creates a hasher with a clean state.
        pub fn new() -> Sha256Algorithm {
            Sha256Algorithm(Sha256::new())
        }
    }

    impl fmt::Debug for Sha256Algorithm {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Sha256Algorithm")
        }
    }

    impl Hasher for Sha256Algorithm {
        #[inline]
        fn write(&mut self, msg: &[u8]) {
            self.0.update(msg)
        }

        /// First eight bytes of the digest of everything written so far,
        /// little endian. The running state is left untouched.
        fn finish(&self) -> u64 {
            let digest = self.0.clone().finalize();
            let mut head = [0u8; 8];
            head.copy_from_slice(&digest[..8]);
            u64::from_le_bytes(head)
        }
    }

    impl Algorithm<Sha256Hash> for Sha256Algorithm {
        #[inline]
        fn hash(&mut self) -> Sha256Hash {
            let mut h = [0u8; 32];
            h.copy_from_slice(&self.0.finalize_reset());
            h
        }

        #[inline]
        fn reset(&mut self) {
            Digest::reset(&mut self.0);
        }
    }
}

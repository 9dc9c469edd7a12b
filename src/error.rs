use thiserror::Error;

/// Errors returned by tree queries and proof decoding.
///
/// A proof that does not reconstruct the trusted root is not an error: it is
/// the `false` outcome of [`crate::proof::verify`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Leaf index outside `[0, leafs)`. An empty tree has `leafs == 0`.
    #[error("leaf index {index} out of range for tree with {leafs} leafs")]
    InvalidArgument {
        /// Requested leaf index.
        index: usize,
        /// Number of leafs in the tree.
        leafs: usize,
    },

    /// A transmitted path entry is neither empty nor one digest long.
    #[error("path entry {position} has {actual} bytes, expected 0 or {expected}")]
    InvalidDigestLength {
        /// Position of the entry in the path, leaf level first.
        position: usize,
        /// Digest length of the hashing algorithm.
        expected: usize,
        /// Length of the received entry.
        actual: usize,
    },
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

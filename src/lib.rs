//! light binary _Merkle Tree_ implementation.
//!
//! Merkle tree (MT) built level by level over an ordered sequence of opaque
//! blocks, each level allocated as its own vec of statically sized digests.
//! The tree is specialized to the extent of the hashing algorithm, which is
//! an interface compatible to `std::hash::Hasher`, so any digest can be
//! plugged in. SHA-256 ships as the default.
//!
//! Hashing scheme:
//!
//! ```text
//! leaf(d)    = ALG(d)
//! node(l, r) = ALG(l || r)
//! node(l)    = ALG(l || "")      last node of an odd level
//! ```
//!
//! At every level the node at an even index is the left operand and the one
//! at an odd index the right operand. Tree construction, path generation and
//! proof verification all follow that rule, otherwise proofs fail.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Interface
//!
//! ```text
//! - MerkleTree::new (blocks, alg) -> tree
//! - root -> Option<hash>
//! - gen_path (i) -> sibling path
//! - verify (block, i, root, path, alg) -> bool
//! ```
//!
//! [`proof::verify`] needs neither the tree nor the other blocks, only the
//! trusted root, the path and the algorithm.
//!
//! # Quick start
//!
//! ```
//! # #[cfg(feature = "sha256")]
//! # fn main() {
//! use mkltree::hash::Sha256Algorithm;
//! use mkltree::merkle::MerkleTree;
//! use mkltree::proof::verify;
//!
//! let blocks = ["coin_0: A->B", "coin_1: B->C", "coin_2: B->D"];
//! let mut alg = Sha256Algorithm::new();
//!
//! let tree = MerkleTree::new(&blocks, &mut alg);
//! let root = tree.root().expect("tree is empty");
//! let path = tree.gen_path(1).expect("leaf out of range");
//!
//! assert!(verify(b"coin_1: B->C", 1, root, &path, &mut alg));
//! assert!(!verify(b"coin_1: B->C ", 1, root, &path, &mut alg));
//! # }
//! # #[cfg(not(feature = "sha256"))]
//! # fn main() {}
//! ```

#![deny(
    missing_docs, unused_qualifications,
    missing_debug_implementations, missing_copy_implementations,
    trivial_casts, trivial_numeric_casts,
    unsafe_code, unstable_features,
    unused_import_braces
)]

/// Errors returned by tree queries and proof decoding.
pub mod error;

/// Hash infrastructure for blocks and nodes in Merkle tree.
pub mod hash;

/// Merkle tree construction and sibling path generation.
pub mod merkle;

/// Merkle tree inclusion proof and standalone verification.
pub mod proof;

/// Text rendering of a tree.
pub mod render;

#[cfg(test)]
mod test_common;

pub use error::{Error, Result};
pub use hash::{Algorithm, Element};
pub use merkle::{BuildConfig, MerkleTree};
pub use proof::{verify, Proof, SiblingPath};
pub use render::Encoding;

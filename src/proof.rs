use log::trace;

use crate::error::{Error, Result};
use crate::hash::{Algorithm, Element};

/// Sibling digests needed to climb from a leaf to the root.
///
/// Path layout, leaf level first, root excluded:
///
/// ```text
/// [ sibling(leaf) sibling(parent) ... sibling(child of root) ]
/// ```
///
/// `None` marks a level where the climbed node was the last, unpaired node of
/// an odd level. On the wire it is a zero-length entry.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct SiblingPath<T: Element>(Vec<Option<T>>);

impl<T: Element> SiblingPath<T> {
    /// Creates a path from per-level siblings, leaf level first.
    pub fn new(siblings: Vec<Option<T>>) -> SiblingPath<T> {
        SiblingPath(siblings)
    }

    /// Decodes a path received as raw byte strings. Empty entries become
    /// absent siblings, anything else must be exactly one digest long.
    pub fn from_raw_parts<B: AsRef<[u8]>>(parts: &[B]) -> Result<SiblingPath<T>> {
        parts
            .iter()
            .enumerate()
            .map(|(position, part)| {
                let part = part.as_ref();
                if part.is_empty() {
                    return Ok(None);
                }
                T::from_slice(part)
                    .map(Some)
                    .ok_or(Error::InvalidDigestLength {
                        position,
                        expected: T::byte_len(),
                        actual: part.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(SiblingPath)
    }

    /// Encodes the path as raw byte strings, absent siblings as empty ones.
    pub fn to_raw_parts(&self) -> Vec<Vec<u8>> {
        self.0
            .iter()
            .map(|sibling| sibling.as_ref().map_or_else(Vec::new, |h| h.as_ref().to_vec()))
            .collect()
    }

    /// Returns the number of levels covered by the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the path of a single leaf tree.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the siblings, leaf level first.
    pub fn as_slice(&self) -> &[Option<T>] {
        &self.0
    }

    /// Iterates the siblings, leaf level first.
    pub fn iter(&self) -> std::slice::Iter<'_, Option<T>> {
        self.0.iter()
    }

    /// Unwraps the siblings.
    pub fn into_inner(self) -> Vec<Option<T>> {
        self.0
    }
}

impl<T: Element> From<Vec<Option<T>>> for SiblingPath<T> {
    fn from(siblings: Vec<Option<T>>) -> Self {
        SiblingPath(siblings)
    }
}

/// Checks that `block` sits at leaf `index` of the tree committed to by `root`.
///
/// Only the block, its claimed index, the trusted root, the sibling path and
/// the hashing algorithm are needed; the tree itself is not.
///
/// At every level an even index is the left operand and an odd index the
/// right operand, absent siblings hash as the empty byte string. This must
/// stay in lockstep with how [`crate::merkle::MerkleTree`] pairs nodes.
///
/// A tampered block, a wrong index, a tampered path or a path from another
/// tree all give `false` indistinguishably.
pub fn verify<T, A>(
    block: &[u8],
    index: usize,
    root: &T,
    path: &SiblingPath<T>,
    alg: &mut A,
) -> bool
where
    T: Element,
    A: Algorithm<T>,
{
    let mut h = alg.leaf(block);
    let mut j = index;

    for (height, sibling) in path.iter().enumerate() {
        trace!("verify index {}: level {} node {}", index, height, j);

        let sibling = sibling.as_ref().map_or(&[][..], |s| s.as_ref());
        h = if j & 1 == 0 {
            // h is left
            alg.node(h.as_ref(), sibling)
        } else {
            // h is right
            alg.node(sibling, h.as_ref())
        };
        j >>= 1;
    }

    // Index bits left over claim a level above the root.
    j == 0 && h == *root
}

/// Merkle tree inclusion proof for leaf `index`: the sibling path plus the
/// root it climbs to.
///
/// Proof validation is positioned hash against path to match root hash.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Proof<T: Element> {
    index: usize,
    path: SiblingPath<T>,
    root: T,
}

impl<T: Element> Proof<T> {
    /// Creates new MT inclusion proof
    pub fn new(index: usize, path: SiblingPath<T>, root: T) -> Proof<T> {
        Proof { index, path, root }
    }

    /// Return proof target leaf index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return tree root
    pub fn root(&self) -> &T {
        &self.root
    }

    /// Returns the sibling path of this proof.
    pub fn path(&self) -> &SiblingPath<T> {
        &self.path
    }

    /// Verifies that `block` is the leaf this proof was generated for.
    pub fn validate<A: Algorithm<T>>(&self, block: &[u8], alg: &mut A) -> bool {
        verify(block, self.index, &self.root, &self.path, alg)
    }

    /// Splits the proof into index, path and root.
    pub fn into_parts(self) -> (usize, SiblingPath<T>, T) {
        (self.index, self.path, self.root)
    }
}

#[cfg(test)]
// Break one element inside the path.
fn modify_path(path: &mut SiblingPath<crate::test_common::Item>) {
    use rand::prelude::*;

    let i = random::<usize>() % path.0.len();
    let k = random::<usize>() % crate::test_common::SIZE;
    let mask = random::<u8>() | 1;

    path.0[i] = Some(match path.0[i] {
        Some(mut h) => {
            h[k] ^= mask;
            h
        }
        None => {
            let mut h = [0u8; crate::test_common::SIZE];
            h[k] = mask;
            h
        }
    });
}

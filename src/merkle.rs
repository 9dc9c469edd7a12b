use log::{debug, trace};
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::hash::{Algorithm, Element};
#[cfg(feature = "sha256")]
use crate::hash::{Sha256Algorithm, Sha256Hash};
use crate::proof::{Proof, SiblingPath};

/// Level width from which a parallel build actually hands work to rayon.
/// Narrower levels are cheaper to hash on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 1024;

/// Options for [`MerkleTree::with_config`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Keep a copy of the original blocks in the tree (display only).
    pub retain_blocks: bool,
    /// Hash wide levels on the rayon thread pool.
    pub parallel: bool,
}

impl BuildConfig {
    /// Sets whether the original blocks are kept.
    pub fn retain_blocks(mut self, retain_blocks: bool) -> Self {
        self.retain_blocks = retain_blocks;
        self
    }

    /// Sets whether wide levels are hashed in parallel.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn use_rayon(&self, width: usize) -> bool {
        self.parallel && width >= PARALLEL_THRESHOLD
    }
}

/// Merkle Tree.
///
/// Every level is stored in its own vec, leafs first, root last.
///
/// A merkle tree is a tree in which every non-leaf node is the hash of its
/// children nodes. A diagram depicting how it works:
///
/// ```text
///         root = h123 = h(h12 + h3')
///        /                          \
///  h12 = h(h1 + h2)             h3' = h(h3 + "")
///   /            \                   |
/// h1 = h(tx1)  h2 = h(tx2)      h3 = h(tx3)
/// ```
///
/// In memory layout:
///
/// ```text
///     [[h1 h2 h3] [h12 h3'] [root]]
/// ```
///
/// The number of inputs is not always a power of two. When a level has an
/// odd number of nodes, the last one has no sibling and its parent is the
/// hash of that node concatenated with nothing. It is neither duplicated
/// nor promoted unhashed; changing that rule changes every root.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MerkleTree<T: Element> {
    levels: Vec<Vec<T>>,
    blocks: Option<Vec<Vec<u8>>>,
}

impl<T: Element> MerkleTree<T> {
    /// Creates new merkle tree from a sequence of blocks, hashing on the
    /// calling thread and without keeping the blocks.
    pub fn new<B, I, A>(blocks: I, alg: &mut A) -> MerkleTree<T>
    where
        B: AsRef<[u8]>,
        I: IntoIterator<Item = B>,
        A: Algorithm<T>,
    {
        let leafs = blocks
            .into_iter()
            .map(|block| alg.leaf(block.as_ref()))
            .collect();

        Self::from_leafs(leafs, None, false, |level| next_level(level, alg))
    }

    /// Creates new merkle tree from a sequence of blocks.
    ///
    /// With [`BuildConfig::parallel`] every rayon job hashes with its own
    /// clone of `alg`, so the result is identical to a sequential build.
    pub fn with_config<B, I, A>(blocks: I, config: BuildConfig, alg: &mut A) -> MerkleTree<T>
    where
        B: AsRef<[u8]> + Sync,
        I: IntoIterator<Item = B>,
        A: Algorithm<T> + Clone + Send + Sync,
    {
        let blocks: Vec<B> = blocks.into_iter().collect();

        alg.reset();
        let leafs: Vec<T> = if config.use_rayon(blocks.len()) {
            let proto: &A = &*alg;
            blocks
                .par_iter()
                .map_init(|| proto.clone(), |a, block| a.leaf(block.as_ref()))
                .collect()
        } else {
            blocks.iter().map(|block| alg.leaf(block.as_ref())).collect()
        };

        let retained = if config.retain_blocks {
            Some(blocks.iter().map(|block| block.as_ref().to_vec()).collect())
        } else {
            None
        };

        Self::from_leafs(leafs, retained, config.parallel, |level| {
            if config.use_rayon(level.len()) {
                par_next_level(level, alg)
            } else {
                next_level(level, alg)
            }
        })
    }

    fn from_leafs<F>(
        leafs: Vec<T>,
        blocks: Option<Vec<Vec<u8>>>,
        parallel: bool,
        mut next: F,
    ) -> MerkleTree<T>
    where
        F: FnMut(&[T]) -> Vec<T>,
    {
        let width = leafs.len();
        let mut levels = Vec::new();
        if !leafs.is_empty() {
            levels.push(leafs);
        }

        // A single node level is the root and terminates the tree.
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let parents = next(level.as_slice());
            debug_assert_eq!(parents.len(), (level.len() + 1) / 2);
            levels.push(parents);
        }

        debug!(
            "built merkle tree: leafs {}, height {}, parallel {}, blocks retained {}",
            width,
            levels.len(),
            parallel,
            blocks.is_some()
        );

        MerkleTree { levels, blocks }
    }

    /// Generate the sibling path for leaf `i`, leaf level first, root
    /// excluded. A level where the climbed node had no sibling holds `None`.
    pub fn gen_path(&self, i: usize) -> Result<SiblingPath<T>> {
        let leafs = self.leafs();
        if i >= leafs {
            return Err(Error::InvalidArgument { index: i, leafs });
        }

        let mut path = Vec::with_capacity(self.height() - 1);
        let mut j = i;

        // last level is the root, nothing to pair it with
        for (height, level) in self.levels[..self.height() - 1].iter().enumerate() {
            let sibling = if j & 1 == 0 {
                // j is left
                j + 1
            } else {
                // j is right
                j - 1
            };
            trace!(
                "leaf {}: level {} node {} sibling {} of {}",
                i,
                height,
                j,
                sibling,
                level.len()
            );

            path.push(level.get(sibling).cloned());
            j >>= 1;
        }

        debug_assert_eq!(j, 0);
        Ok(SiblingPath::new(path))
    }

    /// Generate merkle tree inclusion proof for leaf `i`.
    pub fn gen_proof(&self, i: usize) -> Result<Proof<T>> {
        let root = self.root().cloned().ok_or(Error::InvalidArgument {
            index: i,
            leafs: self.leafs(),
        })?;
        let path = self.gen_path(i)?;

        Ok(Proof::new(i, path, root))
    }

    /// Returns merkle root, `None` for a tree built from no blocks.
    #[inline]
    pub fn root(&self) -> Option<&T> {
        self.levels.last().and_then(|level| level.first())
    }

    /// Returns all levels, leafs first, root last.
    #[inline]
    pub fn levels(&self) -> &[Vec<T>] {
        &self.levels
    }

    /// Returns level `height` (0 for leafs).
    #[inline]
    pub fn level(&self, height: usize) -> Option<&[T]> {
        self.levels.get(height).map(Vec::as_slice)
    }

    /// Returns the number of nodes in the tree, leafs and root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Returns `true` if the tree was built from no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the number of levels, 0 for an empty tree.
    #[inline]
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Returns original number of blocks the tree was built upon.
    #[inline]
    pub fn leafs(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Returns the original blocks if the tree was asked to keep them.
    #[inline]
    pub fn blocks(&self) -> Option<&[Vec<u8>]> {
        self.blocks.as_deref()
    }
}

#[cfg(feature = "sha256")]
impl MerkleTree<Sha256Hash> {
    /// Creates new merkle tree from a sequence of blocks with plain SHA-256,
    /// the default algorithm.
    pub fn sha256<B, I>(blocks: I) -> MerkleTree<Sha256Hash>
    where
        B: AsRef<[u8]>,
        I: IntoIterator<Item = B>,
    {
        Self::new(blocks, &mut Sha256Algorithm::new())
    }
}

fn hash_pair<T: Element, A: Algorithm<T>>(alg: &mut A, pair: &[T]) -> T {
    let right = pair.get(1).map_or(&[][..], |right| right.as_ref());
    alg.node(pair[0].as_ref(), right)
}

fn next_level<T: Element, A: Algorithm<T>>(level: &[T], alg: &mut A) -> Vec<T> {
    level.chunks(2).map(|pair| hash_pair(alg, pair)).collect()
}

fn par_next_level<T, A>(level: &[T], alg: &A) -> Vec<T>
where
    T: Element,
    A: Algorithm<T> + Clone + Send + Sync,
{
    level
        .par_chunks(2)
        .map_init(|| alg.clone(), |a, pair| hash_pair(a, pair))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_common::{get_blocks, get_retained_tree, get_vec_tree, Item, XOR128};
    use std::hash::Hasher;

    #[test]
    fn test_empty_tree() {
        let mt: MerkleTree<Item> = MerkleTree::new(Vec::<Vec<u8>>::new(), &mut XOR128::new());
        assert!(mt.is_empty());
        assert_eq!(mt.root(), None);
        assert_eq!(mt.height(), 0);
        assert_eq!(mt.leafs(), 0);
        assert_eq!(mt.len(), 0);
        assert_eq!(
            mt.gen_path(0),
            Err(Error::InvalidArgument { index: 0, leafs: 0 })
        );
        assert_eq!(
            mt.gen_proof(0),
            Err(Error::InvalidArgument { index: 0, leafs: 0 })
        );
    }

    #[test]
    fn test_single_leaf() {
        let mut a = XOR128::new();
        let mt: MerkleTree<Item> = MerkleTree::new(vec!["only"], &mut a);

        assert_eq!(mt.height(), 1);
        assert_eq!(mt.root(), Some(&a.leaf(b"only")));
        assert!(mt.gen_path(0).unwrap().is_empty());
    }

    #[test]
    fn test_level_widths() {
        for leafs in 1..=33 {
            let mt = get_vec_tree(leafs);
            assert_eq!(mt.leafs(), leafs);

            let widths: Vec<usize> = mt.levels().iter().map(Vec::len).collect();
            for pair in widths.windows(2) {
                assert!(pair[0] > 1);
                assert_eq!(pair[1], (pair[0] + 1) / 2);
            }
            assert_eq!(widths.last(), Some(&1));
            assert_eq!(mt.len(), widths.iter().sum::<usize>());
        }
    }

    #[test]
    fn test_odd_node_is_rehashed_alone() {
        let mut a = XOR128::new();
        let blocks = get_blocks(3);
        let mt: MerkleTree<Item> = MerkleTree::new(&blocks, &mut a);

        let l0: Vec<Item> = blocks.iter().map(|b| a.leaf(b)).collect();
        assert_eq!(mt.level(0), Some(&l0[..]));

        let l1: [Item; 2] = [a.node(&l0[0], &l0[1]), a.node(&l0[2], &[])];
        assert_eq!(mt.level(1), Some(&l1[..]));
        assert_eq!(mt.root(), Some(&a.node(&l1[0], &l1[1])));
        assert_eq!(mt.level(3), None);
    }

    #[test]
    fn test_gen_path_shape() {
        let mt = get_vec_tree(5);
        // widths 5, 3, 2, 1
        let levels = mt.levels();

        let p0 = mt.gen_path(0).unwrap();
        assert_eq!(
            p0.as_slice(),
            &[Some(levels[0][1]), Some(levels[1][1]), Some(levels[2][1])]
        );

        let p4 = mt.gen_path(4).unwrap();
        assert_eq!(p4.as_slice(), &[None, None, Some(levels[2][0])]);

        let p3 = mt.gen_path(3).unwrap();
        assert_eq!(
            p3.as_slice(),
            &[Some(levels[0][2]), Some(levels[1][0]), Some(levels[2][1])]
        );

        for i in 0..mt.leafs() {
            assert_eq!(mt.gen_path(i).unwrap().len(), mt.height() - 1);
        }
    }

    #[test]
    fn test_gen_path_out_of_range() {
        let mt = get_vec_tree(4);
        assert_eq!(
            mt.gen_path(4),
            Err(Error::InvalidArgument { index: 4, leafs: 4 })
        );
        assert!(mt.gen_path(usize::MAX).is_err());
        assert!(mt.gen_proof(7).is_err());
    }

    #[test]
    fn test_gen_proof_carries_root() {
        let mt = get_vec_tree(6);
        let proof = mt.gen_proof(5).unwrap();
        assert_eq!(proof.index(), 5);
        assert_eq!(Some(proof.root()), mt.root());
        assert_eq!(proof.path(), &mt.gen_path(5).unwrap());
    }

    #[test]
    fn test_retained_blocks() {
        assert_eq!(get_vec_tree(3).blocks(), None);

        let mt = get_retained_tree(3);
        assert_eq!(mt.blocks(), Some(&get_blocks(3)[..]));
        assert_eq!(mt.levels(), get_vec_tree(3).levels());
    }

    #[test]
    fn test_deterministic() {
        let a = get_vec_tree(11);
        let b = get_vec_tree(11);
        assert_eq!(a, b);
        for i in 0..a.leafs() {
            assert_eq!(a.gen_path(i), b.gen_path(i));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let leafs = 2 * PARALLEL_THRESHOLD + 3;
        let blocks = get_blocks(leafs);

        let seq = MerkleTree::<Item>::new(&blocks, &mut XOR128::new());
        let par = MerkleTree::with_config(
            &blocks,
            BuildConfig::default().parallel(true),
            &mut XOR128::new(),
        );

        assert_eq!(seq, par);
        assert_eq!(par.level(1).map(<[_]>::len), Some(PARALLEL_THRESHOLD + 2));

        let mut a = XOR128::new();
        let l0 = par.level(0).unwrap();
        assert_eq!(par.level(1).unwrap()[0], a.node(&l0[0], &l0[1]));
        assert_eq!(par.level(1).unwrap()[PARALLEL_THRESHOLD + 1], a.node(&l0[leafs - 1], &[]));
    }

    #[test]
    fn test_hasher_left_dirty_by_caller() {
        let mut a = XOR128::new();
        a.write(b"left over from somewhere else");
        let mt = MerkleTree::with_config(get_blocks(4), BuildConfig::default(), &mut a);
        assert_eq!(mt, get_vec_tree(4));
    }
}

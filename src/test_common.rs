use crate::hash::*;
use crate::merkle::{BuildConfig, MerkleTree};
use std::hash::Hasher;

pub const SIZE: usize = 0x10;

pub type Item = [u8; SIZE];

/// Cheap position dependent xor "hash". Not collision resistant, only
/// used to check tree shape and index arithmetic.
///
/// Every 16 byte stretch of input is rotated by its stretch number before
/// folding, so `node(l, r) != node(r, l)` for distinct digests.
#[derive(Debug, Copy, Clone, Default)]
pub struct XOR128 {
    data: Item,
    i: usize,
}

impl XOR128 {
    pub fn new() -> XOR128 {
        XOR128 {
            data: [0; SIZE],
            i: 0,
        }
    }
}

impl Hasher for XOR128 {
    fn write(&mut self, bytes: &[u8]) {
        for x in bytes {
            self.data[self.i & (SIZE - 1)] ^= x.rotate_left((self.i / SIZE) as u32);
            self.i += 1;
        }
    }

    fn finish(&self) -> u64 {
        unimplemented!()
    }
}

impl Algorithm<Item> for XOR128 {
    #[inline]
    fn hash(&mut self) -> Item {
        self.data
    }

    #[inline]
    fn reset(&mut self) {
        *self = XOR128::new();
    }
}

/// Distinct blocks `"block-0"`, `"block-93"`, `"block-186"`, ...
pub fn get_blocks(leafs: usize) -> Vec<Vec<u8>> {
    (0..leafs)
        .map(|i| format!("block-{}", i * 93).into_bytes())
        .collect()
}

pub fn get_vec_tree(leafs: usize) -> MerkleTree<Item> {
    MerkleTree::new(get_blocks(leafs), &mut XOR128::new())
}

pub fn get_retained_tree(leafs: usize) -> MerkleTree<Item> {
    MerkleTree::with_config(
        get_blocks(leafs),
        BuildConfig::default().retain_blocks(true),
        &mut XOR128::new(),
    )
}

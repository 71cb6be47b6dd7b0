//! Shared fixtures for the in-crate tests.

use crate::{Blake3Hasher, MerkleTree, OddLayerPolicy, TreeOptions};

/// `count` distinct items: the big-endian bytes of `0..count` as `u32`.
pub(crate) fn numbered_items(count: u32) -> Vec<Vec<u8>> {
    (0..count).map(|i| i.to_be_bytes().to_vec()).collect()
}

/// Tree over `numbered_items(count)` with default options.
pub(crate) fn numbered_tree(count: u32) -> MerkleTree {
    MerkleTree::build(&numbered_items(count), Blake3Hasher).expect("distinct, non-empty items")
}

/// Options that reject unbalanced layers.
pub(crate) fn reject_odd_layers() -> TreeOptions {
    TreeOptions {
        odd_layers: OddLayerPolicy::Reject,
    }
}

/// Flip one bit of `bytes[index]`.
pub(crate) fn flip_byte(bytes: &mut [u8], index: usize) {
    bytes[index] ^= 0x01;
}

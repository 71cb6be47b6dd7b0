//! Bottom-up layer construction.

use crate::{hash::MerkleHasher, MerkleTreeError, Result, TaggedHasher};

/// What to do with an intermediate layer of odd length.
///
/// The normaliser only guarantees an even leaf layer. A leaf count that is
/// not a power of two (6, 10, ...) yields an odd layer further up, whose
/// last node has no partner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OddLayerPolicy {
    /// Duplicate the last node of every odd layer before pairing, so each
    /// transition is balanced. Matches verifiers that re-balance per layer.
    #[default]
    DuplicateLast,
    /// Refuse leaf counts that are not a power of two.
    Reject,
}

/// Number of layers for a leaf layer of `leaf_count` hashes, root included:
/// `ceil(log2(leaf_count)) + 1`.
pub fn layer_count(leaf_count: usize) -> usize {
    leaf_count.next_power_of_two().trailing_zeros() as usize + 1
}

/// Reduce `leaves` to a single root, keeping every intermediate layer.
///
/// Under [`OddLayerPolicy::DuplicateLast`] the padding node is stored in its
/// layer, so proof generation finds a sibling for every node below the root.
pub(crate) fn build_layers<H: MerkleHasher>(
    leaves: Vec<Vec<u8>>,
    hasher: &TaggedHasher<H>,
    policy: OddLayerPolicy,
) -> Result<Vec<Vec<Vec<u8>>>> {
    if leaves.is_empty() {
        return Err(MerkleTreeError::EmptyTree);
    }
    if policy == OddLayerPolicy::Reject && !leaves.len().is_power_of_two() {
        return Err(MerkleTreeError::UnbalancedTree {
            leaf_count: leaves.len(),
        });
    }

    let n_layers = layer_count(leaves.len());
    let mut layers = Vec::with_capacity(n_layers);
    let mut current = leaves;
    while current.len() > 1 {
        if current.len() % 2 == 1 {
            if let Some(last) = current.last().cloned() {
                current.push(last);
            }
        }
        let next = compute_layer(&current, hasher)?;
        layers.push(current);
        current = next;
    }
    layers.push(current);

    debug_assert_eq!(layers.len(), n_layers);
    Ok(layers)
}

/// Hash adjacent pairs `(layer[2k], layer[2k + 1])` into the next layer.
///
/// `layer` must have even length.
fn compute_layer<H: MerkleHasher>(
    layer: &[Vec<u8>],
    hasher: &TaggedHasher<H>,
) -> Result<Vec<Vec<u8>>> {
    layer
        .chunks_exact(2)
        .map(|pair| hasher.hash_branch(&pair[0], &pair[1]))
        .collect()
}

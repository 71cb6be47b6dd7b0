//! Proof verification.
//!
//! Replays a proof from a leaf hash: at each step the running node is
//! branch-hashed with the sibling, the sibling on the left when flagged.
//! The proof is valid iff the result equals the expected root. Standalone
//! verification needs nothing but the proof, leaf hash, root and hasher;
//! verification through a [`MerkleTree`] additionally checks that the leaf
//! is one of the tree's own leaves.

use crate::{hash::MerkleHasher, MerkleTree, MerkleTreeError, Proof, Result, TaggedHasher};

/// Deepest proof accepted without a tree to compare against. A tree this
/// deep would have `2^64` leaves.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Recompute the root implied by `proof` for `leaf_hash`.
pub fn compute_root<H: MerkleHasher>(
    proof: &Proof,
    leaf_hash: &[u8],
    hasher: &TaggedHasher<H>,
) -> Result<Vec<u8>> {
    hasher.check_width(leaf_hash)?;
    let mut node = leaf_hash.to_vec();
    for (_layer, step) in proof.iter().enumerate() {
        node = if step.sibling_is_left {
            hasher.hash_branch(&step.sibling, &node)?
        } else {
            hasher.hash_branch(&node, &step.sibling)?
        };
        #[cfg(feature = "proof_debug")]
        tracing::trace!(
            layer = _layer,
            sibling = %hex::encode(&step.sibling),
            sibling_is_left = step.sibling_is_left,
            node = %hex::encode(&node),
            "replayed proof layer"
        );
    }
    Ok(node)
}

/// Check `proof` for `leaf_hash` against an externally supplied `root`.
///
/// `leaf_hash` is the tagged leaf hash (see [`TaggedHasher::hash_leaf`]), not
/// the raw item. Returns `Ok(false)` when the replayed root differs. Since
/// no tree is at hand to fix the layer count, the proof length is only
/// bounded to `1..=MAX_PROOF_DEPTH`.
pub fn verify_proof<H: MerkleHasher>(
    proof: &Proof,
    leaf_hash: &[u8],
    root: &[u8],
    hasher: &TaggedHasher<H>,
) -> Result<bool> {
    if proof.is_empty() || proof.len() > MAX_PROOF_DEPTH {
        return Err(MerkleTreeError::ProofDepthOutOfRange {
            depth: proof.len(),
            max: MAX_PROOF_DEPTH,
        });
    }
    hasher.check_width(root)?;
    Ok(compute_root(proof, leaf_hash, hasher)? == root)
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Check `proof` for `leaf_hash` against this tree's root.
    ///
    /// Fails with [`MerkleTreeError::ProofLengthMismatch`] if the proof does
    /// not have one node per layer below the root, and with
    /// [`MerkleTreeError::LeafNotFound`] if `leaf_hash` is not one of this
    /// tree's leaves.
    pub fn verify_proof(&self, proof: &Proof, leaf_hash: &[u8]) -> Result<bool> {
        let root = self.root()?;
        self.verify_proof_with_root(proof, leaf_hash, root)
    }

    /// Check `proof` for `leaf_hash` against `root`, with the same
    /// preconditions as [`verify_proof`](Self::verify_proof).
    pub fn verify_proof_with_root(
        &self,
        proof: &Proof,
        leaf_hash: &[u8],
        root: &[u8],
    ) -> Result<bool> {
        if proof.len() != self.depth() {
            return Err(MerkleTreeError::ProofLengthMismatch {
                expected: self.depth(),
                actual: proof.len(),
            });
        }
        self.find_leaf_hash_index(leaf_hash)?;
        verify_proof(proof, leaf_hash, root, self.hasher())
    }

    /// Hash `item` into its leaf and check `proof` against this tree's root.
    pub fn verify_item(&self, proof: &Proof, item: &[u8]) -> Result<bool> {
        let leaf_hash = self.hash_leaf(item);
        self.verify_proof(proof, &leaf_hash)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{Blake3Hasher, ProofNode};

    fn hasher() -> TaggedHasher<Blake3Hasher> {
        TaggedHasher::new(Blake3Hasher).unwrap()
    }

    #[test]
    fn test_single_step_left_and_right() {
        let h = hasher();
        let a = h.hash_leaf(b"a");
        let b = h.hash_leaf(b"b");
        let root = h.hash_branch(&a, &b).unwrap();

        let proof_a = Proof::new(vec![ProofNode {
            sibling: b.clone(),
            sibling_is_left: false,
        }]);
        let proof_b = Proof::new(vec![ProofNode {
            sibling: a.clone(),
            sibling_is_left: true,
        }]);

        assert!(verify_proof(&proof_a, &a, &root, &h).unwrap());
        assert!(verify_proof(&proof_b, &b, &root, &h).unwrap());
        // wrong side flag
        assert!(!verify_proof(&proof_b, &a, &root, &h).unwrap());
    }

    #[test]
    fn test_compute_root_of_two_steps() {
        let h = hasher();
        let leaves: Vec<Vec<u8>> = (0u8..4).map(|i| h.hash_leaf(&[i])).collect();
        let left = h.hash_branch(&leaves[0], &leaves[1]).unwrap();
        let right = h.hash_branch(&leaves[2], &leaves[3]).unwrap();
        let root = h.hash_branch(&left, &right).unwrap();

        // leaf 2 is a left child whose parent is a right child
        let proof = Proof::new(vec![
            ProofNode {
                sibling: leaves[3].clone(),
                sibling_is_left: false,
            },
            ProofNode {
                sibling: left,
                sibling_is_left: true,
            },
        ]);
        assert_eq!(compute_root(&proof, &leaves[2], &h).unwrap(), root);
    }

    #[test]
    fn test_empty_proof_is_rejected() {
        let h = hasher();
        let leaf = h.hash_leaf(b"a");
        assert_matches!(
            verify_proof(&Proof::default(), &leaf, &leaf, &h),
            Err(MerkleTreeError::ProofDepthOutOfRange { depth: 0, max: 64 })
        );
    }

    #[test]
    fn test_overlong_proof_is_rejected() {
        let h = hasher();
        let leaf = h.hash_leaf(b"a");
        let node = ProofNode {
            sibling: leaf.clone(),
            sibling_is_left: false,
        };
        let proof = Proof::new(vec![node; MAX_PROOF_DEPTH + 1]);
        assert_matches!(
            verify_proof(&proof, &leaf, &leaf, &h),
            Err(MerkleTreeError::ProofDepthOutOfRange { depth: 65, .. })
        );
    }

    #[test]
    fn test_raw_item_in_place_of_leaf_hash_is_malformed() {
        let h = hasher();
        let sibling = h.hash_leaf(b"b");
        let root = h.hash_branch(&h.hash_leaf(b"a"), &sibling).unwrap();
        let proof = Proof::new(vec![ProofNode {
            sibling,
            sibling_is_left: false,
        }]);
        assert_matches!(
            verify_proof(&proof, b"a", &root, &h),
            Err(MerkleTreeError::MalformedOperand {
                expected: 32,
                actual: 1
            })
        );
    }

    #[test]
    fn test_truncated_sibling_is_malformed() {
        let h = hasher();
        let leaf = h.hash_leaf(b"a");
        let proof = Proof::new(vec![ProofNode {
            sibling: vec![0u8; 31],
            sibling_is_left: true,
        }]);
        assert_matches!(
            verify_proof(&proof, &leaf, &leaf, &h),
            Err(MerkleTreeError::MalformedOperand { actual: 31, .. })
        );
    }

    #[test]
    fn test_malformed_root_is_rejected() {
        let h = hasher();
        let leaf = h.hash_leaf(b"a");
        let proof = Proof::new(vec![ProofNode {
            sibling: leaf.clone(),
            sibling_is_left: false,
        }]);
        assert_matches!(
            verify_proof(&proof, &leaf, &[0u8; 4], &h),
            Err(MerkleTreeError::MalformedOperand { actual: 4, .. })
        );
    }
}

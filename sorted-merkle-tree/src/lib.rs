//! Sorted binary Merkle tree with domain-separated hashing.
//!
//! Items are deduplicated-checked, sorted by raw bytes and padded to an even
//! count, so any two parties holding the same item set derive the same
//! root. Hashing is tagged to keep leaves and branches in disjoint domains:
//!
//! - Leaf:   `H(0x00 || item)`
//! - Branch: `H(0x01 || left || right)`
//!
//! `H` is injected (any [`MerkleHasher`]); its output width is probed once
//! and every branch operand must match it.
//!
//! Proofs are straight sibling paths ([`Proof`]) that can be checked by a
//! [`MerkleTree`] against its own leaves and root, or by [`verify_proof`]
//! with nothing but the root, leaf hash and hash function, which is what an
//! out-of-process verifier does. Their wire form is two parallel arrays
//! (sibling hashes and left-operand flags), see [`Proof::to_wire`].

#![warn(missing_docs)]

mod error;
pub(crate) mod hash;
pub(crate) mod layers;
pub(crate) mod leaves;
pub(crate) mod proof;
pub(crate) mod tree;
mod verify;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{MerkleTreeError, Result};
#[cfg(feature = "keccak")]
pub use hash::Keccak256Hasher;
#[cfg(feature = "sha256")]
pub use hash::Sha256Hasher;
pub use hash::{Blake3Hasher, MerkleHasher, TaggedHasher, BRANCH_TAG, LEAF_TAG};
pub use layers::{layer_count, OddLayerPolicy};
pub use proof::{Proof, ProofNode};
pub use tree::{compute_merkle_root, MerkleTree, TreeOptions};
pub use verify::{compute_root, verify_proof, MAX_PROOF_DEPTH};

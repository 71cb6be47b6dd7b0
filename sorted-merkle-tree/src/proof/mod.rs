//! Inclusion proofs.
//!
//! A [`Proof`] is the straight sibling path from one leaf to the root: one
//! [`ProofNode`] per layer below the root, each carrying the sibling hash
//! and whether that sibling is the left operand of the branch hash. It
//! holds no reference to the tree and can be checked with only the root,
//! the leaf hash and the hash function.

use std::fmt;

use bincode::{Decode, Encode};

use crate::{hash::MerkleHasher, MerkleTree, MerkleTreeError, Result};


/// Largest encoded proof accepted by [`Proof::decode_from_slice`].
const MAX_ENCODED_PROOF_BYTES: usize = 16 * 1024 * 1024;

/// One step of a proof: the sibling of the current node.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ProofNode {
    /// Hash of the sibling node.
    pub sibling: Vec<u8>,
    /// `true` when the sibling is hashed as the left operand, i.e. the node
    /// being proved is a right child.
    pub sibling_is_left: bool,
}

/// Sibling path from a leaf to the root, ordered leaf first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct Proof {
    nodes: Vec<ProofNode>,
}

impl Proof {
    /// Wrap an ordered list of proof nodes.
    pub fn new(nodes: Vec<ProofNode>) -> Self {
        Self { nodes }
    }

    /// The proof nodes, leaf first.
    pub fn nodes(&self) -> &[ProofNode] {
        &self.nodes
    }

    /// Mutable access to the nodes.
    pub fn nodes_mut(&mut self) -> &mut [ProofNode] {
        &mut self.nodes
    }

    /// Consume the proof, returning its nodes.
    pub fn into_nodes(self) -> Vec<ProofNode> {
        self.nodes
    }

    /// Number of nodes; equals `layer_count - 1` of the tree that produced it.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the proof has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over the nodes, leaf first.
    pub fn iter(&self) -> std::slice::Iter<'_, ProofNode> {
        self.nodes.iter()
    }

    /// Split into the two parallel arrays remote verifiers consume: sibling
    /// hashes, and whether each sibling is the left operand.
    pub fn to_wire(&self) -> (Vec<Vec<u8>>, Vec<bool>) {
        self.nodes
            .iter()
            .map(|node| (node.sibling.clone(), node.sibling_is_left))
            .unzip()
    }

    /// Rebuild a proof from the parallel wire arrays, matched by index.
    pub fn from_wire(siblings: Vec<Vec<u8>>, sibling_is_left: Vec<bool>) -> Result<Self> {
        if siblings.len() != sibling_is_left.len() {
            return Err(MerkleTreeError::InvalidProof(format!(
                "{} sibling hashes but {} side flags",
                siblings.len(),
                sibling_is_left.len()
            )));
        }
        let nodes = siblings
            .into_iter()
            .zip(sibling_is_left)
            .map(|(sibling, sibling_is_left)| ProofNode {
                sibling,
                sibling_is_left,
            })
            .collect();
        Ok(Self { nodes })
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| MerkleTreeError::InvalidProof(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects trailing bytes and siblings of differing widths.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ MAX_ENCODED_PROOF_BYTES }>();
        let (proof, read): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| MerkleTreeError::InvalidProof(format!("decode error: {}", e)))?;
        if read != bytes.len() {
            return Err(MerkleTreeError::InvalidProof(format!(
                "{} trailing bytes after proof",
                bytes.len() - read
            )));
        }
        if let Some(first) = proof.nodes.first() {
            let width = first.sibling.len();
            if let Some(node) = proof.nodes.iter().find(|n| n.sibling.len() != width) {
                return Err(MerkleTreeError::InvalidProof(format!(
                    "sibling widths differ ({} and {} bytes)",
                    width,
                    node.sibling.len()
                )));
            }
        }
        Ok(proof)
    }
}

impl<'a> IntoIterator for &'a Proof {
    type Item = &'a ProofNode;
    type IntoIter = std::slice::Iter<'a, ProofNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            let side = if node.sibling_is_left { "L" } else { "R" };
            writeln!(f, "{}: {} {}", i, side, hex::encode(&node.sibling))?;
        }
        Ok(())
    }
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Generate a proof for `item`.
    ///
    /// When the item was duplicated as padding, the proof is for its first
    /// position. Fails with [`MerkleTreeError::LeafNotFound`] if the item is
    /// not in the tree.
    pub fn generate_proof(&self, item: &[u8]) -> Result<Proof> {
        let index = self.find_leaf_index(item)?;
        self.generate_proof_at(index)
    }

    /// Generate a proof for the leaf at `index` in layer 0.
    pub fn generate_proof_at(&self, index: usize) -> Result<Proof> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleTreeError::IndexOutOfRange { index, leaf_count });
        }

        let mut idx = index;
        let mut nodes = Vec::with_capacity(self.depth());
        // every layer below the root has even length
        for layer in &self.layers()[..self.depth()] {
            let sibling_is_left = idx % 2 == 1;
            let sibling_index = if sibling_is_left { idx - 1 } else { idx + 1 };
            nodes.push(ProofNode {
                sibling: layer[sibling_index].clone(),
                sibling_is_left,
            });
            idx /= 2;
        }

        Ok(Proof { nodes })
    }
}

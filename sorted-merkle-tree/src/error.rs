use thiserror::Error;

/// Alias for `core::result::Result<T, MerkleTreeError>`.
pub type Result<T> = core::result::Result<T, MerkleTreeError>;

/// Errors from building trees, generating proofs and verifying them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MerkleTreeError {
    /// No items were supplied, or the leaf layer is empty.
    #[error("tree has no leaves")]
    EmptyTree,
    /// Two input items are byte-identical.
    #[error("duplicate item at position {position} (first seen at {first_position})")]
    DuplicateItem {
        /// Input position of the repeated item.
        position: usize,
        /// Input position of its first occurrence.
        first_position: usize,
    },
    /// The leaf count is not a power of two and odd layers are rejected.
    #[error("{leaf_count} leaves cannot be paired into a balanced tree")]
    UnbalancedTree {
        /// Length of the padded leaf layer.
        leaf_count: usize,
    },
    /// A branch operand is not exactly one hash wide.
    #[error("operand is {actual} bytes, expected a {expected}-byte hash")]
    MalformedOperand {
        /// Output width of the hash function.
        expected: usize,
        /// Width of the rejected operand.
        actual: usize,
    },
    /// The requested item or leaf hash is not in the leaf layer.
    #[error("leaf not found in tree")]
    LeafNotFound,
    /// An explicit leaf index is past the end of the leaf layer.
    #[error("leaf index {index} is out of range (leaf count {leaf_count})")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Length of the leaf layer.
        leaf_count: usize,
    },
    /// The proof length does not match the tree's layer count.
    #[error("proof has {actual} nodes, expected {expected}")]
    ProofLengthMismatch {
        /// `layer_count - 1` for the tree in question.
        expected: usize,
        /// Number of nodes in the supplied proof.
        actual: usize,
    },
    /// A proof checked without a tree is empty or deeper than any tree can be.
    #[error("proof depth {depth} is outside 1..={max}")]
    ProofDepthOutOfRange {
        /// Number of nodes in the supplied proof.
        depth: usize,
        /// Largest depth accepted.
        max: usize,
    },
    /// The injected hash function cannot be used.
    #[error("invalid hash function: {0}")]
    InvalidHashFunction(String),
    /// A proof could not be decoded.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

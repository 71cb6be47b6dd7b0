//! Domain-separated hashing.
//!
//! - Leaves:   `H(0x00 || item)`
//! - Branches: `H(0x01 || left || right)`
//!
//! The tags keep leaf-space and branch-space disjoint, so no item can be
//! crafted whose leaf hash doubles as an internal node (second-preimage
//! forgery). Remote verifiers must use the same tag bytes and the same
//! concatenation order.

use crate::{MerkleTreeError, Result};

/// Tag prepended to every item before hashing it into a leaf.
pub const LEAF_TAG: u8 = 0x00;
/// Tag prepended to every pair of child hashes before hashing them into a
/// branch.
pub const BRANCH_TAG: u8 = 0x01;

/// A deterministic hash function with a fixed output width.
///
/// The tree treats it as an opaque capability. Any
/// `Fn(&[u8]) -> Vec<u8>` closure implements it.
pub trait MerkleHasher {
    /// Hash `data`.
    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Hash the concatenation of `parts`.
    ///
    /// Hashers with an incremental interface override this to avoid
    /// materialising the concatenation.
    fn hash_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        self.hash(&parts.concat())
    }
}

impl<F> MerkleHasher for F
where
    F: Fn(&[u8]) -> Vec<u8>,
{
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        self(data)
    }
}

/// Blake3 with a 32-byte output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Blake3Hasher;

impl MerkleHasher for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        blake3::hash(data).as_bytes().to_vec()
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().as_bytes().to_vec()
    }
}

/// SHA-256 (requires the `sha256` feature).
#[cfg(feature = "sha256")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sha256Hasher;

#[cfg(feature = "sha256")]
impl MerkleHasher for Sha256Hasher {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(data).to_vec()
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        use sha2::Digest;
        let mut hasher = sha2::Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().to_vec()
    }
}

/// Keccak-256 as used by the EVM (requires the `keccak` feature).
///
/// This is the hash an on-chain verifier computes with `keccak256`.
#[cfg(feature = "keccak")]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keccak256Hasher;

#[cfg(feature = "keccak")]
impl MerkleHasher for Keccak256Hasher {
    fn hash(&self, data: &[u8]) -> Vec<u8> {
        self.hash_parts(&[data])
    }

    fn hash_parts(&self, parts: &[&[u8]]) -> Vec<u8> {
        use tiny_keccak::{Hasher, Keccak};
        let mut output = [0u8; 32];
        let mut hasher = Keccak::v256();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize(&mut output);
        output.to_vec()
    }
}

/// Wraps a [`MerkleHasher`] with the leaf/branch domain tags and the output
/// width discovered at construction.
#[derive(Debug, Clone)]
pub struct TaggedHasher<H> {
    inner: H,
    width: usize,
}

impl<H: MerkleHasher> TaggedHasher<H> {
    /// Wrap `inner`, probing its output width once by hashing
    /// `[BRANCH_TAG]`.
    pub fn new(inner: H) -> Result<Self> {
        let width = inner.hash(&[BRANCH_TAG]).len();
        if width == 0 {
            return Err(MerkleTreeError::InvalidHashFunction(
                "hash function returned an empty digest".to_string(),
            ));
        }
        Ok(Self { inner, width })
    }

    /// Output width of the wrapped hash function in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// `H(LEAF_TAG || item)`.
    pub fn hash_leaf(&self, item: &[u8]) -> Vec<u8> {
        self.inner.hash_parts(&[&[LEAF_TAG], item])
    }

    /// `H(BRANCH_TAG || left || right)`.
    ///
    /// Both operands must already be hashes of exactly [`width`](Self::width)
    /// bytes.
    pub fn hash_branch(&self, left: &[u8], right: &[u8]) -> Result<Vec<u8>> {
        self.check_width(left)?;
        self.check_width(right)?;
        Ok(self.inner.hash_parts(&[&[BRANCH_TAG], left, right]))
    }

    /// Fail with [`MerkleTreeError::MalformedOperand`] unless `operand` is
    /// exactly one hash wide.
    pub fn check_width(&self, operand: &[u8]) -> Result<()> {
        if operand.len() != self.width {
            return Err(MerkleTreeError::MalformedOperand {
                expected: self.width,
                actual: operand.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_blake3_width_is_probed() {
        let hasher = TaggedHasher::new(Blake3Hasher).expect("blake3 is usable");
        assert_eq!(hasher.width(), 32);
    }

    #[test]
    fn test_closure_hasher_width_is_probed() {
        let truncated = |data: &[u8]| blake3::hash(data).as_bytes()[..20].to_vec();
        let hasher = TaggedHasher::new(truncated).expect("closure is usable");
        assert_eq!(hasher.width(), 20);
        assert_eq!(hasher.hash_leaf(b"abc").len(), 20);
    }

    #[test]
    fn test_empty_digest_is_rejected() {
        let empty = |_: &[u8]| Vec::<u8>::new();
        assert_matches!(
            TaggedHasher::new(empty).err(),
            Some(MerkleTreeError::InvalidHashFunction(_))
        );
    }

    #[test]
    fn test_leaf_hash_is_tagged_concatenation() {
        let hasher = TaggedHasher::new(Blake3Hasher).unwrap();
        let mut expected = blake3::Hasher::new();
        expected.update(&[0x00]);
        expected.update(b"foobar");
        assert_eq!(hasher.hash_leaf(b"foobar"), expected.finalize().as_bytes());
    }

    #[test]
    fn test_branch_hash_is_tagged_concatenation() {
        let hasher = TaggedHasher::new(Blake3Hasher).unwrap();
        let left = hasher.hash_leaf(b"left");
        let right = hasher.hash_leaf(b"right");

        let mut expected = blake3::Hasher::new();
        expected.update(&[0x01]);
        expected.update(&left);
        expected.update(&right);

        let branch = hasher.hash_branch(&left, &right).unwrap();
        assert_eq!(branch, expected.finalize().as_bytes());
        // operand order matters
        assert_ne!(branch, hasher.hash_branch(&right, &left).unwrap());
    }

    #[test]
    fn test_default_hash_parts_matches_incremental() {
        let plain = |data: &[u8]| blake3::hash(data).as_bytes().to_vec();
        let via_closure = TaggedHasher::new(plain).unwrap();
        let via_blake3 = TaggedHasher::new(Blake3Hasher).unwrap();
        assert_eq!(via_closure.hash_leaf(b"x"), via_blake3.hash_leaf(b"x"));
    }

    #[test]
    fn test_leaf_and_branch_domains_differ() {
        // An "item" that is the concatenation of two hashes must not hash to
        // the branch over those two hashes.
        let hasher = TaggedHasher::new(Blake3Hasher).unwrap();
        let left = hasher.hash_leaf(b"a");
        let right = hasher.hash_leaf(b"b");
        let forged_item = [left.as_slice(), right.as_slice()].concat();
        assert_ne!(
            hasher.hash_leaf(&forged_item),
            hasher.hash_branch(&left, &right).unwrap()
        );
    }

    #[test]
    fn test_branch_rejects_unhashed_operands() {
        let hasher = TaggedHasher::new(Blake3Hasher).unwrap();
        let leaf = hasher.hash_leaf(b"a");
        assert_matches!(
            hasher.hash_branch(b"raw item", &leaf),
            Err(MerkleTreeError::MalformedOperand {
                expected: 32,
                actual: 8
            })
        );
        assert_matches!(
            hasher.hash_branch(&leaf, &[0u8; 33]),
            Err(MerkleTreeError::MalformedOperand {
                expected: 32,
                actual: 33
            })
        );
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn test_sha256_parts_match_whole() {
        use sha2::Digest;
        let hasher = TaggedHasher::new(Sha256Hasher).unwrap();
        assert_eq!(hasher.width(), 32);
        let expected = sha2::Sha256::digest([&[0x00u8][..], &b"item"[..]].concat()).to_vec();
        assert_eq!(hasher.hash_leaf(b"item"), expected);
    }

    #[cfg(feature = "keccak")]
    #[test]
    fn test_keccak_empty_input() {
        // keccak256("") as returned by the EVM
        assert_eq!(
            hex::encode(Keccak256Hasher.hash(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}

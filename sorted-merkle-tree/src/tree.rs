use std::{collections::HashMap, fmt};

use tracing::debug;

use crate::{
    hash::{Blake3Hasher, MerkleHasher, TaggedHasher},
    layers::{build_layers, OddLayerPolicy},
    leaves::normalize_leaves,
    MerkleTreeError, Result,
};

/// Build-time options for [`MerkleTree`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Handling of odd-length intermediate layers.
    pub odd_layers: OddLayerPolicy,
}

/// A Merkle tree over a fixed set of distinct items.
///
/// Layer 0 holds the domain-tagged leaf hashes of the items in ascending
/// byte order (the greatest item repeated when the count is odd); the last
/// layer holds the root. The tree is immutable once built, so a shared
/// `Arc<MerkleTree<H>>` can serve proofs from many threads without locking.
///
/// ```
/// use sorted_merkle_tree::{verify_proof, Blake3Hasher, MerkleTree};
///
/// let tree = MerkleTree::build(&[b"123".as_slice(), b"foobar"], Blake3Hasher).unwrap();
/// let proof = tree.generate_proof(b"foobar").unwrap();
/// let leaf = tree.find_leaf(b"foobar").unwrap();
/// assert!(verify_proof(&proof, leaf, tree.root().unwrap(), tree.hasher()).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct MerkleTree<H = Blake3Hasher> {
    hasher: TaggedHasher<H>,
    layers: Vec<Vec<Vec<u8>>>,
    /// Leaf hash -> first position in layer 0.
    leaf_index: HashMap<Vec<u8>, usize>,
    options: TreeOptions,
}

impl<H: MerkleHasher> MerkleTree<H> {
    /// Build a tree from `items` with default options.
    pub fn build<T: AsRef<[u8]>>(items: &[T], hasher: H) -> Result<Self> {
        Self::build_with_options(items, hasher, TreeOptions::default())
    }

    /// Build a tree from `items`.
    ///
    /// Fails with [`MerkleTreeError::DuplicateItem`] if two items are
    /// byte-equal, [`MerkleTreeError::EmptyTree`] if there are none, and
    /// [`MerkleTreeError::UnbalancedTree`] if `options` reject odd layers and
    /// the padded leaf count is not a power of two.
    pub fn build_with_options<T: AsRef<[u8]>>(
        items: &[T],
        hasher: H,
        options: TreeOptions,
    ) -> Result<Self> {
        let hasher = TaggedHasher::new(hasher)?;
        let leaves = normalize_leaves(items, &hasher)?;
        let leaf_count = leaves.len();

        let mut leaf_index = HashMap::with_capacity(leaves.len());
        for (position, leaf) in leaves.iter().enumerate() {
            leaf_index.entry(leaf.clone()).or_insert(position);
        }

        let layers = build_layers(leaves, &hasher, options.odd_layers)?;
        debug!(
            items = items.len(),
            leaves = leaf_count,
            layers = layers.len(),
            policy = ?options.odd_layers,
            "built merkle tree"
        );

        Ok(Self {
            hasher,
            layers,
            leaf_index,
            options,
        })
    }

    /// The single hash in the top layer.
    pub fn root(&self) -> Result<&[u8]> {
        match (self.layers.first(), self.layers.last()) {
            (Some(leaves), Some(top)) if !leaves.is_empty() => {
                top.first().map(Vec::as_slice).ok_or(MerkleTreeError::EmptyTree)
            }
            _ => Err(MerkleTreeError::EmptyTree),
        }
    }

    /// Every layer, leaves first.
    pub fn layers(&self) -> &[Vec<Vec<u8>>] {
        &self.layers
    }

    /// Number of layers including leaves and root: `ceil(log2(leaf_count)) + 1`.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Number of hashes on the path from a leaf to the root; also the length
    /// of every proof this tree produces.
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// The leaf layer, including any padding duplicate.
    pub fn leaves(&self) -> &[Vec<u8>] {
        self.layers.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Length of the leaf layer (always even).
    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// The domain-separated hasher the tree was built with.
    pub fn hasher(&self) -> &TaggedHasher<H> {
        &self.hasher
    }

    /// Options the tree was built with.
    pub fn options(&self) -> TreeOptions {
        self.options
    }

    /// `H(LEAF_TAG || item)` with this tree's hash function.
    pub fn hash_leaf(&self, item: &[u8]) -> Vec<u8> {
        self.hasher.hash_leaf(item)
    }

    /// `H(BRANCH_TAG || left || right)` with this tree's hash function.
    pub fn hash_branch(&self, left: &[u8], right: &[u8]) -> Result<Vec<u8>> {
        self.hasher.hash_branch(left, right)
    }

    /// Whether `item` is one of the items the tree was built from.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.leaf_index.contains_key(&self.hash_leaf(item))
    }

    /// First position of `item`'s leaf in layer 0.
    pub fn find_leaf_index(&self, item: &[u8]) -> Result<usize> {
        self.find_leaf_hash_index(&self.hash_leaf(item))
    }

    /// First position of an already hashed leaf in layer 0.
    pub fn find_leaf_hash_index(&self, leaf_hash: &[u8]) -> Result<usize> {
        self.leaf_index.get(leaf_hash).copied().ok_or_else(|| {
            debug!(leaf = %hex::encode(leaf_hash), "leaf not in tree");
            MerkleTreeError::LeafNotFound
        })
    }

    /// The leaf hash stored for `item`, suitable for passing to
    /// [`verify_proof`](crate::verify_proof).
    pub fn find_leaf(&self, item: &[u8]) -> Result<&[u8]> {
        let index = self.find_leaf_index(item)?;
        Ok(self.leaves()[index].as_slice())
    }
}

impl<H> fmt::Display for MerkleTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "Layer {} -", i)?;
            for node in layer {
                writeln!(f, "\t {}", hex::encode(node))?;
            }
        }
        Ok(())
    }
}

/// Build a tree over `items` with default options and return its root.
pub fn compute_merkle_root<T, H>(items: &[T], hasher: H) -> Result<Vec<u8>>
where
    T: AsRef<[u8]>,
    H: MerkleHasher,
{
    let tree = MerkleTree::build(items, hasher)?;
    Ok(tree.root()?.to_vec())
}

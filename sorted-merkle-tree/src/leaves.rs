//! Leaf-set normalisation: reject duplicates, sort ascending, pad to an even
//! count, then hash every item into the leaf layer.

use std::collections::HashMap;

use crate::{hash::MerkleHasher, MerkleTreeError, Result, TaggedHasher};

/// Canonical leaf layer for `items`.
///
/// Two parties holding the same set of items, in any order, derive the same
/// layer. An odd item count is made even by appending a copy of the greatest
/// item, which keeps every index from 0 stable.
pub(crate) fn normalize_leaves<T, H>(items: &[T], hasher: &TaggedHasher<H>) -> Result<Vec<Vec<u8>>>
where
    T: AsRef<[u8]>,
    H: MerkleHasher,
{
    check_unique(items)?;
    if items.is_empty() {
        return Err(MerkleTreeError::EmptyTree);
    }

    let mut sorted: Vec<&[u8]> = items.iter().map(AsRef::as_ref).collect();
    // items are distinct, so stability is irrelevant
    sorted.sort_unstable();
    if sorted.len() % 2 == 1 {
        if let Some(&greatest) = sorted.last() {
            sorted.push(greatest);
        }
    }

    Ok(sorted.into_iter().map(|item| hasher.hash_leaf(item)).collect())
}

/// Fail with [`MerkleTreeError::DuplicateItem`] on the first item (in input
/// order) that repeats an earlier one.
fn check_unique<T: AsRef<[u8]>>(items: &[T]) -> Result<()> {
    let mut seen: HashMap<&[u8], usize> = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        if let Some(&first_position) = seen.get(item.as_ref()) {
            return Err(MerkleTreeError::DuplicateItem {
                position,
                first_position,
            });
        }
        seen.insert(item.as_ref(), position);
    }
    Ok(())
}

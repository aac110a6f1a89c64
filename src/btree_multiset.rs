use std::cmp::Ordering;

use crate::btree_base::{
    btree::BTree,
    btree_traits::BTreeParams,
    iter::{BTreeIterator, BTreeReverseIterator, Iter},
    DefaultMultisetConfig, TreeStats,
};

/// Ordered multi-key container: the same engine as [`crate::BTreeSet`]
/// with the duplicate-keeping policy. Repeatedly inserted equal keys are
/// placed at the end of their equal run.
pub struct BTreeMultiset<P: BTreeParams> {
    _tree: BTree<P>,
}

impl<P: BTreeParams> BTreeMultiset<P> {
    pub fn new() -> Self {
        Self {
            _tree: BTree::new(),
        }
    }

    pub fn with_comparator(key_less: P::KeyCompareType) -> Self {
        Self {
            _tree: BTree::with_comparator(key_less),
        }
    }

    pub fn len(&self) -> usize {
        self._tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self._tree.empty()
    }

    pub fn contains(&self, key: &P::KeyType) -> bool {
        self._tree.exists(key)
    }

    /// Number of entries equal to `key`.
    pub fn count(&self, key: &P::KeyType) -> usize {
        self._tree.count(key)
    }

    /// Inserts the key, returning its position; multi policy always
    /// inserts.
    pub fn insert(&mut self, key: P::KeyType) -> BTreeIterator<P> {
        self._tree.insert(key).0
    }

    /// Removes one entry equal to `key`; false if none was present.
    pub fn remove_one(&mut self, key: &P::KeyType) -> bool {
        self._tree.erase_one(key)
    }

    /// Removes every entry equal to `key`, returning how many there were.
    pub fn remove_all(&mut self, key: &P::KeyType) -> usize {
        self._tree.erase(key)
    }

    pub fn clear(&mut self) {
        self._tree.clear()
    }

    pub fn iter(&self) -> Iter<'_, P> {
        self._tree.iter()
    }

    pub fn find(&self, key: &P::KeyType) -> BTreeIterator<P> {
        self._tree.find(key)
    }

    pub fn lower_bound(&self, key: &P::KeyType) -> BTreeIterator<P> {
        self._tree.lower_bound(key)
    }

    pub fn upper_bound(&self, key: &P::KeyType) -> BTreeIterator<P> {
        self._tree.upper_bound(key)
    }

    pub fn equal_range(&self, key: &P::KeyType) -> (BTreeIterator<P>, BTreeIterator<P>) {
        self._tree.equal_range(key)
    }

    pub fn begin(&self) -> BTreeIterator<P> {
        self._tree.begin()
    }

    pub fn end(&self) -> BTreeIterator<P> {
        self._tree.end()
    }

    pub fn rbegin(&self) -> BTreeReverseIterator<P> {
        self._tree.rbegin()
    }

    pub fn rend(&self) -> BTreeReverseIterator<P> {
        self._tree.rend()
    }

    pub fn swap(&mut self, other: &mut Self) {
        self._tree.swap(&mut other._tree)
    }

    pub fn stats(&self) -> &TreeStats<P> {
        self._tree.get_stats()
    }

    pub fn tree(&self) -> &BTree<P> {
        &self._tree
    }
}

impl<P: BTreeParams> Default for BTreeMultiset<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: BTreeParams> Clone for BTreeMultiset<P> {
    fn clone(&self) -> Self {
        Self {
            _tree: self._tree.clone(),
        }
    }
}

impl<P: BTreeParams> std::fmt::Debug for BTreeMultiset<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<P: BTreeParams> PartialEq for BTreeMultiset<P> {
    fn eq(&self, other: &Self) -> bool {
        self._tree.eq_tree(&other._tree)
    }
}

impl<P: BTreeParams> PartialOrd for BTreeMultiset<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self._tree.lt_tree(&other._tree) {
            Some(Ordering::Less)
        } else if other._tree.lt_tree(&self._tree) {
            Some(Ordering::Greater)
        } else {
            Some(Ordering::Equal)
        }
    }
}

impl<P: BTreeParams> Extend<P::KeyType> for BTreeMultiset<P> {
    fn extend<I: IntoIterator<Item = P::KeyType>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<P: BTreeParams> FromIterator<P::KeyType> for BTreeMultiset<P> {
    fn from_iter<I: IntoIterator<Item = P::KeyType>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, P: BTreeParams> IntoIterator for &'a BTreeMultiset<P> {
    type Item = &'a P::KeyType;
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub type DefaultBTreeMultiset<K> = BTreeMultiset<DefaultMultisetConfig<K>>;

pub mod btree;
pub mod btree_traits;
pub mod iter;
pub mod node;
mod tree_stats;
pub mod verify;

use self::{
    btree::BTree,
    btree_traits::{DefaultBTreeTraits, KeyComparator, _BTree},
};
use std::{fmt::Debug, marker::PhantomData};

pub use self::tree_stats::TreeStats;

#[derive(Clone, Debug)]
pub struct DefaultKeyComparator<T> {
    _t: PhantomData<T>,
}
impl<T> KeyComparator<T> for DefaultKeyComparator<T>
where
    T: Ord + Clone + Debug,
{
    fn new() -> Self {
        Self { _t: PhantomData }
    }
    fn less(&self, lhs: &T, rhs: &T) -> bool {
        lhs < rhs
    }
}

pub type DefaultSetConfig<K> = _BTree<K, DefaultKeyComparator<K>, DefaultBTreeTraits<K>, false>;
pub type DefaultMultisetConfig<K> = _BTree<K, DefaultKeyComparator<K>, DefaultBTreeTraits<K>, true>;

pub type DefaultBTree<K> = BTree<DefaultSetConfig<K>>;
pub type DefaultMultiBTree<K> = BTree<DefaultMultisetConfig<K>>;

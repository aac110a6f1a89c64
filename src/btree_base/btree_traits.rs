use std::fmt::Debug;
use std::{marker::PhantomData, mem::size_of};

/// Strict-weak-order predicate injected into the tree. The engine derives
/// every other comparison (equal, less-equal, ...) from `less`.
pub trait KeyComparator<T>: Clone + Debug {
    fn new() -> Self;
    fn less(&self, lhs: &T, rhs: &T) -> bool;
}

pub trait BTreeTraits: Clone + Debug {
    /// Upper bound on keys per node, usually derived from a target node
    /// byte size. Larger nodes mean a shallower tree but more per-node
    /// shifting on insert/erase.
    const NODE_SLOTS: usize;
    /// Nodes whose key array is larger than this many bytes are searched
    /// with binary search, smaller ones with a linear scan.
    const BINSEARCH_THRESHOLD: usize;
}

#[derive(Clone, Debug)]
pub struct DefaultBTreeTraits<K: Clone + Debug> {
    _k: PhantomData<K>,
}

const fn _max(a: usize, b: usize) -> usize {
    [a, b][(a < b) as usize]
}

impl<K: Clone + Debug> BTreeTraits for DefaultBTreeTraits<K> {
    const NODE_SLOTS: usize = _max(8, 256 / size_of::<K>());
    const BINSEARCH_THRESHOLD: usize = 256;
}

pub trait BTreeParams: Clone + Debug {
    type KeyType: Clone + Debug;
    type KeyCompareType: KeyComparator<Self::KeyType>;
    type Traits: BTreeTraits;
    const SLOTMAX: usize;
    const SLOTMIN: usize;
    /// Multi policy keeps equal keys; unique policy rejects them.
    const ALLOW_DUPLICATE: bool;
    /// Run the full invariant check after every mutation.
    const SELF_VERIFY: bool;
}

#[derive(Clone, Debug)]
pub struct _BTree<TKey, TCompare, TTraits, const MULTI: bool, const VERIFY: bool = false>
where
    TKey: Clone + Debug,
    TTraits: BTreeTraits,
{
    _phantom_key: PhantomData<TKey>,
    _phantom_compare: PhantomData<TCompare>,
    _phantom_traits: PhantomData<TTraits>,
}

impl<TKey, TCompare, TTraits, const MULTI: bool, const VERIFY: bool> BTreeParams
    for _BTree<TKey, TCompare, TTraits, MULTI, VERIFY>
where
    TKey: Clone + Debug,
    TCompare: KeyComparator<TKey>,
    TTraits: BTreeTraits,
{
    type KeyType = TKey;
    type KeyCompareType = TCompare;
    type Traits = TTraits;
    const SLOTMAX: usize = TTraits::NODE_SLOTS;
    const SLOTMIN: usize = TTraits::NODE_SLOTS / 2;
    const ALLOW_DUPLICATE: bool = MULTI;
    const SELF_VERIFY: bool = VERIFY;
}

#[cfg(test)]
#[test]
fn test_btree_traits() {
    assert_eq!(DefaultBTreeTraits::<u64>::NODE_SLOTS, 32);
    assert_eq!(DefaultBTreeTraits::<u8>::NODE_SLOTS, 256);
    assert_eq!(DefaultBTreeTraits::<[u8; 64]>::NODE_SLOTS, 8);
    assert_eq!(DefaultBTreeTraits::<u64>::BINSEARCH_THRESHOLD, 256);
}

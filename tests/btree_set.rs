use std::collections::HashSet;

use compact_btree::btree_base::{
    btree_traits::{BTreeTraits, KeyComparator, _BTree},
    iter::TreeIterator,
    DefaultKeyComparator,
};
use compact_btree::{BTreeSet, DefaultBTreeSet};
use rand::{seq::SliceRandom, thread_rng, Rng};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn btree_set_works() {
    init_logs();
    let mut set = DefaultBTreeSet::<i32>::new();

    for i in 0..1000 {
        assert!(set.insert(i));
    }
    assert_eq!(set.len(), 1000);

    for i in 0..1000 {
        assert!(set.contains(&i));
    }
    assert!(!set.contains(&1000));

    assert!(set.remove(&12));
    assert!(!set.contains(&12));
    assert!(!set.remove(&12));
    assert!(set.insert(12));
    assert!(set.contains(&12));
    assert_eq!(set.len(), 1000);

    set.tree().verify();
}

#[test]
fn works_on_pointer_types() {
    let mut set = DefaultBTreeSet::<String>::new();
    assert!(!set.contains(&"test".to_string()));
    assert!(set.insert("test".into()));
    assert!(!set.insert("test".into()));

    for i in 0..100 {
        set.insert(i.to_string());
    }
    for i in 0..100 {
        assert!(set.contains(&i.to_string()));
    }
    set.tree().verify();
}

#[test]
fn reinsert_leaves_size_unchanged() {
    let mut set = DefaultBTreeSet::<i32>::new();
    for i in 0..100 {
        set.insert(i);
    }
    for i in 0..100 {
        assert!(!set.insert(i));
        assert_eq!(set.len(), 100);
    }
}

#[test]
fn insert_erase_roundtrip() {
    let mut set: DefaultBTreeSet<i32> = (0..50).step_by(2).collect();
    let before = set.len();

    assert!(set.insert(31));
    assert_eq!(*set.find(&31).key(), 31);
    assert_eq!(set.len(), before + 1);

    set.remove(&31);
    assert_eq!(set.len(), before);
    assert!(set.iter().all(|&k| k != 31));
}

#[test]
fn ordered_traversal() {
    let mut rng = thread_rng();
    let mut keys: Vec<i32> = (0..2000).collect();
    keys.shuffle(&mut rng);

    let set: DefaultBTreeSet<i32> = keys.iter().copied().collect();

    let forward: Vec<i32> = set.iter().copied().collect();
    assert_eq!(forward.len(), 2000);
    assert!(forward.windows(2).all(|w| w[0] < w[1]));

    let mut backward: Vec<i32> = set.iter().rev().copied().collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[test]
fn cursor_traversal_matches_iter() {
    let set: DefaultBTreeSet<i32> = (0..500).map(|k| k * 3).collect();

    let mut it = set.begin();
    let end = set.end();
    let mut via_cursor = Vec::new();
    while !it.equals(&end) {
        via_cursor.push(*it.key());
        it.forward();
    }
    assert_eq!(via_cursor, set.iter().copied().collect::<Vec<_>>());

    let mut rit = set.rbegin();
    let rend = set.rend();
    let mut via_rcursor = Vec::new();
    while !rit.equals(&rend) {
        via_rcursor.push(*rit.key());
        rit.forward();
    }
    via_rcursor.reverse();
    assert_eq!(via_cursor, via_rcursor);
}

#[test]
fn bounds_and_find() {
    let set: DefaultBTreeSet<i32> = (0..100).map(|k| k * 2).collect();

    assert_eq!(*set.find(&42).key(), 42);
    assert!(set.find(&43).equals(&set.end()));

    assert_eq!(*set.lower_bound(&43).key(), 44);
    assert_eq!(*set.lower_bound(&44).key(), 44);
    assert_eq!(*set.upper_bound(&44).key(), 46);
    assert!(set.lower_bound(&199).equals(&set.end()));

    let (lo, hi) = set.equal_range(&44);
    assert_eq!(*lo.key(), 44);
    assert_eq!(*hi.key(), 46);
}

#[test]
fn random_op_test() {
    init_logs();
    let mut set = DefaultBTreeSet::<i32>::new();

    let n = 50000;

    let mut rng = thread_rng();

    let mut keys = HashSet::new();
    while keys.len() < n {
        keys.insert(rng.gen::<u16>() as i32 * 1000 + rng.gen_range(0..1000));
    }
    let mut keys: Vec<_> = keys.into_iter().collect();

    for &key in keys.iter() {
        set.insert(key);
    }
    assert_eq!(set.len(), n);
    set.tree().verify();

    for &key in keys.iter() {
        assert!(set.contains(&key));
    }

    keys.shuffle(&mut rng);
    let removed_keys = keys.split_off(n / 2);
    for &key in removed_keys.iter() {
        assert!(set.remove(&key));
    }
    set.tree().verify();

    for &key in removed_keys.iter() {
        assert!(!set.contains(&key));
    }

    for &key in keys.iter() {
        assert!(set.contains(&key));
    }

    for &key in keys.iter() {
        assert!(set.remove(&key));
    }
    assert!(set.is_empty());
    assert_eq!(set.tree().height(), 0);
    set.tree().verify();
}

#[test]
fn random_interleaved_ops_keep_invariants() {
    let mut set = DefaultBTreeSet::<i32>::new();
    let mut model = std::collections::BTreeSet::new();
    let mut rng = thread_rng();

    for round in 0..20 {
        for _ in 0..500 {
            let key = rng.gen_range(0..800);
            if rng.gen_bool(0.6) {
                assert_eq!(set.insert(key), model.insert(key));
            } else {
                assert_eq!(set.remove(&key), model.remove(&key));
            }
        }
        assert_eq!(set.len(), model.len(), "round {}", round);
        set.tree().verify();
        let ours: Vec<i32> = set.iter().copied().collect();
        let theirs: Vec<i32> = model.iter().copied().collect();
        assert_eq!(ours, theirs);
    }
}

#[test]
fn clone_is_deep() {
    let set: DefaultBTreeSet<i32> = (0..1000).collect();
    let mut copy = set.clone();

    assert_eq!(set, copy);
    copy.remove(&500);
    copy.insert(5000);

    assert!(set.contains(&500));
    assert!(!set.contains(&5000));
    assert_ne!(set, copy);
    copy.tree().verify();
    set.tree().verify();
}

#[test]
fn swap_exchanges_contents() {
    let mut a: DefaultBTreeSet<i32> = (0..100).collect();
    let mut b: DefaultBTreeSet<i32> = (1000..1003).collect();

    a.swap(&mut b);

    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 100);
    assert!(a.contains(&1000));
    assert!(b.contains(&42));
}

#[test]
fn comparisons_are_size_then_lexicographic() {
    let a: DefaultBTreeSet<i32> = [1, 2, 3].into_iter().collect();
    let b: DefaultBTreeSet<i32> = [3, 2, 1].into_iter().collect();
    let c: DefaultBTreeSet<i32> = [1, 2, 4].into_iter().collect();
    let d: DefaultBTreeSet<i32> = [1, 2].into_iter().collect();

    assert_eq!(a, b);
    assert!(a < c);
    assert!(d < a);
    assert_ne!(a, d);
}

#[test]
fn clear_resets_everything() {
    let mut set: DefaultBTreeSet<i32> = (0..300).collect();
    set.clear();

    assert!(set.is_empty());
    assert_eq!(set.tree().height(), 0);
    assert_eq!(set.stats().nodes(), 0);
    set.tree().verify();

    assert!(set.insert(1));
    assert_eq!(set.len(), 1);
}

#[derive(Clone, Debug)]
struct ReverseComparator;
impl KeyComparator<i32> for ReverseComparator {
    fn new() -> Self {
        Self
    }
    fn less(&self, lhs: &i32, rhs: &i32) -> bool {
        rhs < lhs
    }
}

#[derive(Clone, Debug)]
struct SmallTraits;
impl BTreeTraits for SmallTraits {
    const NODE_SLOTS: usize = 8;
    const BINSEARCH_THRESHOLD: usize = 256;
}

#[test]
fn custom_comparator_reverses_the_order() {
    type ReverseConfig = _BTree<i32, ReverseComparator, SmallTraits, false>;

    let mut set = BTreeSet::<ReverseConfig>::new();
    for k in [5, 1, 9, 3, 7] {
        set.insert(k);
    }

    let keys: Vec<i32> = set.iter().copied().collect();
    assert_eq!(keys, vec![9, 7, 5, 3, 1]);
    set.tree().verify();
}

#[test]
fn small_nodes_grow_and_shrink_in_height() {
    type SmallConfig = _BTree<i32, DefaultKeyComparator<i32>, SmallTraits, false, true>;

    let mut set = BTreeSet::<SmallConfig>::new();
    for k in 0..200 {
        set.insert(k);
    }
    assert!(set.tree().height() >= 2);

    let mut keys: Vec<i32> = (0..200).collect();
    keys.shuffle(&mut thread_rng());
    for k in keys {
        assert!(set.remove(&k));
    }
    assert_eq!(set.tree().height(), 0);
}

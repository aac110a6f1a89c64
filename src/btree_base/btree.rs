use std::{mem::size_of, ptr::null_mut};

use super::{
    btree_traits::{BTreeParams, BTreeTraits, KeyComparator},
    iter::{BTreeIterator, BTreeReverseIterator, Iter, TreeIterator},
    node::Node,
    tree_stats::TreeStats,
};

/// B-tree engine shared by the set and multiset adapters. Keys live in
/// leaves and in internal nodes (as separators that are real elements);
/// the `ALLOW_DUPLICATE` hook on the params decides unique vs. multi
/// behavior inside the shared insert/erase routines.
pub struct BTree<P: BTreeParams> {
    pub(super) root_: *mut Node<P>,
    pub(super) stats_: TreeStats<P>,
    key_less: P::KeyCompareType,
}

/// Convenient key comparison functions generated from key_less
impl<P: BTreeParams> BTree<P> {
    pub fn key_comp(&self) -> &P::KeyCompareType {
        &self.key_less
    }

    pub(super) fn key_less(&self, a: &P::KeyType, b: &P::KeyType) -> bool {
        self.key_less.less(a, b)
    }

    fn key_lessequal(&self, a: &P::KeyType, b: &P::KeyType) -> bool {
        !self.key_less.less(b, a)
    }

    #[allow(dead_code)]
    fn key_greater(&self, a: &P::KeyType, b: &P::KeyType) -> bool {
        self.key_less.less(b, a)
    }

    #[allow(dead_code)]
    fn key_greaterequal(&self, a: &P::KeyType, b: &P::KeyType) -> bool {
        !self.key_less.less(a, b)
    }

    pub(super) fn key_equal(&self, a: &P::KeyType, b: &P::KeyType) -> bool {
        !self.key_less.less(a, b) && !self.key_less.less(b, a)
    }
}

impl<P: BTreeParams> BTree<P> {
    pub fn new() -> Self {
        Self::with_comparator(P::KeyCompareType::new())
    }

    pub fn with_comparator(key_less: P::KeyCompareType) -> Self {
        Self {
            root_: null_mut(),
            stats_: TreeStats::new(),
            key_less,
        }
    }
}

impl<P: BTreeParams> Default for BTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: BTreeParams> Drop for BTree<P> {
    fn drop(&mut self) {
        self.clear();
        debug_assert!(self.stats_.size == 0);
    }
}

/// Node object allocation and deallocation functions
impl<P: BTreeParams> BTree<P> {
    fn new_leaf(&mut self) -> *mut Node<P> {
        let new_node = Node::new_leaf();
        self.stats_.leaves += 1;

        new_node
    }

    fn new_inner(&mut self, level: u16) -> *mut Node<P> {
        let new_node = Node::new_inner(level);
        self.stats_.inner_nodes += 1;

        new_node
    }

    fn free_node(&mut self, node: *mut Node<P>) {
        let n = unsafe { Box::from_raw(node) };
        if n.is_leaf() {
            self.stats_.leaves -= 1;
        } else {
            self.stats_.inner_nodes -= 1;
        }
    }

    fn clear_recursive(&mut self, node: *mut Node<P>) {
        let n = unsafe { &*node };
        if !n.is_leaf() {
            for i in 0..n.children.len() {
                let child = n.children[i];
                self.clear_recursive(child);
                self.free_node(child);
            }
        }
    }
}

/// B-tree node binary search functions
impl<P: BTreeParams> BTree<P> {
    /// First slot whose key is not less than `key`.
    fn find_lower(&self, n: &Node<P>, key: &P::KeyType) -> u16 {
        if P::SLOTMAX * size_of::<P::KeyType>() > P::Traits::BINSEARCH_THRESHOLD {
            let slotuse = n.slotuse();
            if slotuse == 0 {
                return 0;
            }
            let mut lo: u16 = 0;
            let mut hi: u16 = slotuse;
            while lo < hi {
                let mid = (lo + hi) >> 1;
                if self.key_lessequal(key, n.key(mid as usize)) {
                    hi = mid
                } else {
                    lo = mid + 1
                }
            }
            lo
        } else {
            // for small nodes a linear scan beats binary search
            let mut lo: u16 = 0;
            while lo < n.slotuse() && self.key_less(n.key(lo as usize), key) {
                lo += 1;
            }
            lo
        }
    }

    /// First slot whose key is greater than `key`.
    fn find_upper(&self, n: &Node<P>, key: &P::KeyType) -> u16 {
        if P::SLOTMAX * size_of::<P::KeyType>() > P::Traits::BINSEARCH_THRESHOLD {
            let slotuse = n.slotuse();
            if slotuse == 0 {
                return 0;
            }
            let mut lo: u16 = 0;
            let mut hi: u16 = slotuse;
            while lo < hi {
                let mid = (lo + hi) >> 1;
                if self.key_less(key, n.key(mid as usize)) {
                    hi = mid
                } else {
                    lo = mid + 1
                }
            }
            lo
        } else {
            let mut lo: u16 = 0;
            while lo < n.slotuse() && self.key_lessequal(n.key(lo as usize), key) {
                lo += 1;
            }
            lo
        }
    }
}

/// Access functions to the item count
impl<P: BTreeParams> BTree<P> {
    pub fn size(&self) -> usize {
        self.stats_.size
    }

    pub fn empty(&self) -> bool {
        self.size() == 0
    }

    pub fn max_size(&self) -> usize {
        usize::MAX
    }

    /// Number of edges from the root to any leaf; 0 for the empty tree.
    pub fn height(&self) -> u16 {
        if self.root_.is_null() {
            0
        } else {
            unsafe { &*self.root_ }.level
        }
    }

    pub fn get_stats(&self) -> &TreeStats<P> {
        &self.stats_
    }
}

/// Access functions querying the tree by descending to a leaf
impl<P: BTreeParams> BTree<P> {
    /// Checks whether a key is in the B-tree. The same as
    /// (find(k) != end()) or (count() != 0).
    pub fn exists(&self, key: &P::KeyType) -> bool {
        let mut n = self.root_;
        if n.is_null() {
            return false;
        }

        loop {
            let node = unsafe { &*n };
            let slot = self.find_lower(node, key);
            if (slot as usize) < node.keys.len() && self.key_equal(key, node.key(slot as usize)) {
                return true;
            }
            if node.is_leaf() {
                return false;
            }
            n = node.child(slot as usize);
        }
    }

    pub fn begin(&self) -> BTreeIterator<P> {
        if self.root_.is_null() {
            return BTreeIterator::new(null_mut(), 0);
        }
        let mut n = self.root_;
        while !unsafe { &*n }.is_leaf() {
            n = unsafe { &*n }.child(0);
        }
        BTreeIterator::new(n, 0)
    }

    /// One past the last key: the one-past-last slot of the rightmost leaf.
    pub fn end(&self) -> BTreeIterator<P> {
        if self.root_.is_null() {
            return BTreeIterator::new(null_mut(), 0);
        }
        let mut n = self.root_;
        loop {
            let node = unsafe { &*n };
            if node.is_leaf() {
                return BTreeIterator::new(n, node.slotuse());
            }
            n = node.child(node.keys.len());
        }
    }

    pub fn rbegin(&self) -> BTreeReverseIterator<P> {
        BTreeReverseIterator::new(self.end())
    }

    pub fn rend(&self) -> BTreeReverseIterator<P> {
        BTreeReverseIterator::new(self.begin())
    }

    pub fn iter(&self) -> Iter<'_, P> {
        Iter::new(self.begin(), self.end())
    }

    /// Tries to locate a key in the B-tree and returns an iterator to the
    /// first matching element. If unsuccessful it returns end().
    pub fn find(&self, key: &P::KeyType) -> BTreeIterator<P> {
        let it = self.lower_bound(key);
        if !it.equals(&self.end()) && self.key_equal(key, it.key()) {
            it
        } else {
            self.end()
        }
    }

    /// Tries to locate a key in the B-tree and returns the number of
    /// identical key entries found.
    pub fn count(&self, key: &P::KeyType) -> usize {
        let mut it = self.lower_bound(key);
        let end = self.end();
        let mut num: usize = 0;
        while !it.equals(&end) && self.key_equal(key, it.key()) {
            num += 1;
            it.forward();
        }
        num
    }

    /// Searches the B-tree and returns an iterator to the first element
    /// equal to or greater than key, or end() if all keys are smaller.
    pub fn lower_bound(&self, key: &P::KeyType) -> BTreeIterator<P> {
        let mut n = self.root_;
        if n.is_null() {
            return self.end();
        }

        let mut slot;
        loop {
            let node = unsafe { &*n };
            slot = self.find_lower(node, key);
            if node.is_leaf() {
                break;
            }
            n = node.child(slot as usize);
        }

        self.normalize(BTreeIterator::new(n, slot))
    }

    /// Searches the B-tree and returns an iterator to the first element
    /// greater than key, or end() if all keys are smaller or equal.
    pub fn upper_bound(&self, key: &P::KeyType) -> BTreeIterator<P> {
        let mut n = self.root_;
        if n.is_null() {
            return self.end();
        }

        let mut slot;
        loop {
            let node = unsafe { &*n };
            slot = self.find_upper(node, key);
            if node.is_leaf() {
                break;
            }
            n = node.child(slot as usize);
        }

        self.normalize(BTreeIterator::new(n, slot))
    }

    /// Searches the B-tree and returns both lower_bound() and upper_bound().
    pub fn equal_range(&self, key: &P::KeyType) -> (BTreeIterator<P>, BTreeIterator<P>) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Resolve a one-past-leaf position to the next unvisited ancestor
    /// separator, or to end() when the position is past the last key.
    fn normalize(&self, mut it: BTreeIterator<P>) -> BTreeIterator<P> {
        loop {
            let node = unsafe { &*it.curr_node };
            if (it.curr_slot as usize) < node.keys.len() {
                return it;
            }
            if node.is_root() {
                return self.end();
            }
            it.curr_slot = node.position;
            it.curr_node = node.parent;
        }
    }
}

/// Insertion
impl<P: BTreeParams> BTree<P> {
    /// Attempt to insert a key into the B-tree. If the tree does not
    /// allow duplicate keys and the key is already present, nothing is
    /// inserted and the existing position is returned with `false`.
    ///
    /// Splits performed on the way up re-point the returned iterator, so
    /// it always denotes the inserted key; other outstanding iterators
    /// are invalidated by the structural moves.
    pub fn insert(&mut self, key: P::KeyType) -> (BTreeIterator<P>, bool) {
        if self.root_.is_null() {
            self.root_ = self.new_leaf();
        }

        // descend to the target leaf; the unique policy may stop early on
        // an equal separator, the multi policy aims past the run of equals
        let mut n = self.root_;
        let mut slot;
        loop {
            let node = unsafe { &*n };
            if P::ALLOW_DUPLICATE {
                slot = self.find_upper(node, &key);
            } else {
                slot = self.find_lower(node, &key);
                if (slot as usize) < node.keys.len()
                    && self.key_equal(&key, node.key(slot as usize))
                {
                    return (BTreeIterator::new(n, slot), false);
                }
            }
            if node.is_leaf() {
                break;
            }
            n = node.child(slot as usize);
        }

        log::debug!("BTree::insert {:?} into leaf {:p} at slot {}", key, n, slot);

        unsafe { &mut *n }.keys.insert(slot as usize, key);
        self.stats_.size += 1;

        let mut iter = BTreeIterator::new(n, slot);
        let mut node = n;
        while unsafe { &*node }.is_overflow() {
            node = self.split_node(node, &mut iter);
        }

        if P::SELF_VERIFY {
            self.verify();
        }

        (iter, true)
    }

    /// Split an overfull node around its median key. The lower half stays
    /// in place, the upper half moves into a fresh right sibling, and the
    /// median is promoted into the parent as the separator between the
    /// two. Returns the parent so the caller can continue the upward walk.
    fn split_node(&mut self, n: *mut Node<P>, iter: &mut BTreeIterator<P>) -> *mut Node<P> {
        let (is_leaf, level) = {
            let node = unsafe { &*n };
            debug_assert!(node.is_overflow());
            (node.is_leaf(), node.level)
        };

        // the sibling is allocated before the overfull node is touched,
        // so an allocation abort cannot leave a half-split structure
        let s = if is_leaf {
            self.new_leaf()
        } else {
            self.new_inner(level)
        };

        let node = unsafe { &mut *n };
        let sibling = unsafe { &mut *s };
        let mid = node.keys.len() / 2;

        log::debug!(
            "BTree::split_node {:p} (slotuse {}) at mid {} into sibling {:p}",
            node,
            node.keys.len(),
            mid,
            sibling
        );

        let separator = node.keys.remove(mid);
        sibling.keys.extend(node.keys.drain(mid..));
        if !is_leaf {
            sibling.children.extend(node.children.drain(mid + 1..));
            sibling.relink_children(0);
        }

        // re-point the result cursor through the move
        let on_separator = iter.curr_node == n && iter.curr_slot as usize == mid;
        if iter.curr_node == n && iter.curr_slot as usize > mid {
            iter.curr_node = s;
            iter.curr_slot -= mid as u16 + 1;
        }

        if node.is_root() {
            let r = self.new_inner(level + 1);
            let root = unsafe { &mut *r };
            root.keys.push(separator);
            root.children.push(n);
            root.children.push(s);
            root.relink_children(0);
            self.root_ = r;
            if on_separator {
                iter.curr_node = r;
                iter.curr_slot = 0;
            }
            r
        } else {
            let p = node.parent;
            let pos = node.position as usize;
            let parent = unsafe { &mut *p };
            parent.keys.insert(pos, separator);
            parent.children.insert(pos + 1, s);
            parent.relink_children(pos + 1);
            if on_separator {
                iter.curr_node = p;
                iter.curr_slot = pos as u16;
            }
            p
        }
    }
}

/// Erase
impl<P: BTreeParams> BTree<P> {
    /// Erases one (the first) of possibly many entries with the given key.
    pub fn erase_one(&mut self, key: &P::KeyType) -> bool {
        log::debug!("BTree::erase_one({:?}) on btree size {}", key, self.size());
        if self.root_.is_null() {
            return false;
        }

        let it = self.find(key);
        if it.equals(&self.end()) {
            log::debug!("Could not find key {:?} to erase.", key);
            return false;
        }

        self.erase_at(it);
        true
    }

    /// Erases all entries with the given key and returns how many were
    /// removed. At most one entry is removed under the unique policy.
    pub fn erase(&mut self, key: &P::KeyType) -> usize {
        let mut c = 0;
        while self.erase_one(key) {
            c += 1;
            if !P::ALLOW_DUPLICATE {
                break;
            }
        }
        c
    }

    /// Erase the element the iterator points at and return the next valid
    /// position. Only the passed iterator is invalidated by the removal;
    /// rebalancing may additionally relocate other iterators' nodes.
    pub fn erase_at(&mut self, it: BTreeIterator<P>) -> BTreeIterator<P> {
        debug_assert!(!it.curr_node.is_null());

        let mut internal_delete = false;
        let mut cur = it;

        if !unsafe { &*cur.curr_node }.is_leaf() {
            // swap the separator with its in-order predecessor, the
            // rightmost key of the left child subtree, reducing the
            // problem to a leaf deletion
            let node = unsafe { &mut *cur.curr_node };
            let mut p = node.child(cur.curr_slot as usize);
            loop {
                let c = unsafe { &*p };
                if c.is_leaf() {
                    break;
                }
                p = c.child(c.keys.len());
            }
            let pred = unsafe { &mut *p };
            let last = pred.keys.len() - 1;
            std::mem::swap(&mut node.keys[cur.curr_slot as usize], &mut pred.keys[last]);
            cur = BTreeIterator::new(p, last as u16);
            internal_delete = true;
        }

        log::debug!(
            "BTree::erase_at leaf {:p} slot {}",
            cur.curr_node,
            cur.curr_slot
        );

        unsafe { &mut *cur.curr_node }
            .keys
            .remove(cur.curr_slot as usize);
        self.stats_.size -= 1;

        // `res` keeps the slot just after the removed key while the
        // rebalancing walk moves `cur` up the tree
        let mut res = cur.clone();
        loop {
            if cur.curr_node == self.root_ {
                self.try_shrink();
                if self.root_.is_null() {
                    return BTreeIterator::new(null_mut(), 0);
                }
                break;
            }
            if !unsafe { &*cur.curr_node }.is_underflow() {
                break;
            }
            let merged = self.rebalance_or_merge(&mut cur);
            if unsafe { &*cur.curr_node }.is_leaf() {
                res = cur.clone();
            }
            if !merged {
                break;
            }
            cur.curr_node = unsafe { &*cur.curr_node }.parent;
            cur.curr_slot = 0;
        }

        // the next element is an ancestor separator when `res` ran off
        // its leaf; for an internal delete the erased key's successor
        // sits one step further still
        let mut res = if res.curr_slot as usize == unsafe { &*res.curr_node }.keys.len() {
            self.normalize(res)
        } else {
            res
        };
        if internal_delete {
            res.forward();
        }

        if P::SELF_VERIFY {
            self.verify();
        }

        res
    }

    /// Restore minimum occupancy of `cur`'s node: move one key over from
    /// an adjacent sibling holding spare keys, or merge with a sibling
    /// when both are at the minimum. Returns true when a merge removed a
    /// separator from the parent, which must then be checked itself.
    fn rebalance_or_merge(&mut self, cur: &mut BTreeIterator<P>) -> bool {
        let n = cur.curr_node;
        let (p, pos) = unsafe { ((*n).parent, (*n).position as usize) };
        debug_assert!(!p.is_null());

        if pos > 0 {
            let left = unsafe { (&(*p).children)[pos - 1] };
            if !unsafe { &*left }.is_few() {
                self.rotate_from_left(left, n, p, pos - 1);
                cur.curr_slot += 1;
                return false;
            }
        }
        let parent_slots = unsafe { (*p).keys.len() };
        if pos < parent_slots {
            let right = unsafe { (&(*p).children)[pos + 1] };
            if !unsafe { &*right }.is_few() {
                self.rotate_from_right(n, right, p, pos);
                return false;
            }
        }

        // both siblings at minimum occupancy: merge across the nearer
        // parent separator
        if pos > 0 {
            let left = unsafe { (&(*p).children)[pos - 1] };
            cur.curr_slot += unsafe { (*left).keys.len() } as u16 + 1;
            cur.curr_node = left;
            self.merge_nodes(left, n, p, pos - 1);
        } else {
            let right = unsafe { (&(*p).children)[pos + 1] };
            self.merge_nodes(n, right, p, pos);
        }
        true
    }

    /// Move the left sibling's last key up into the parent separator and
    /// the separator down to the front of `n`, with the corresponding
    /// child link for inner nodes.
    fn rotate_from_left(
        &mut self,
        l: *mut Node<P>,
        n: *mut Node<P>,
        p: *mut Node<P>,
        parentslot: usize,
    ) {
        let left = unsafe { &mut *l };
        let node = unsafe { &mut *n };
        let parent = unsafe { &mut *p };

        log::debug!(
            "BTree::rotate_from_left {:p} -> {:p} via parent {:p} slot {}",
            left,
            node,
            parent,
            parentslot
        );
        debug_assert!(left.level == node.level);
        debug_assert!(!left.is_few());

        let up = left.keys.pop().expect("rotation source must hold a key");
        let down = std::mem::replace(&mut parent.keys[parentslot], up);
        node.keys.insert(0, down);
        if !node.is_leaf() {
            let child = left
                .children
                .pop()
                .expect("inner node keeps one child past its keys");
            node.children.insert(0, child);
            node.relink_children(0);
        }
    }

    /// Mirror image of rotate_from_left.
    fn rotate_from_right(
        &mut self,
        n: *mut Node<P>,
        r: *mut Node<P>,
        p: *mut Node<P>,
        parentslot: usize,
    ) {
        let node = unsafe { &mut *n };
        let right = unsafe { &mut *r };
        let parent = unsafe { &mut *p };

        log::debug!(
            "BTree::rotate_from_right {:p} <- {:p} via parent {:p} slot {}",
            node,
            right,
            parent,
            parentslot
        );
        debug_assert!(right.level == node.level);
        debug_assert!(!right.is_few());

        let up = right.keys.remove(0);
        let down = std::mem::replace(&mut parent.keys[parentslot], up);
        node.keys.push(down);
        if !node.is_leaf() {
            let child = right.children.remove(0);
            node.children.push(child);
            node.relink_children(node.children.len() - 1);
            right.relink_children(0);
        }
    }

    /// Merge `right` into `left`, pulling the separating key out of the
    /// parent down into the merged node. The parent loses one key and one
    /// child and may underflow in turn.
    fn merge_nodes(
        &mut self,
        l: *mut Node<P>,
        r: *mut Node<P>,
        p: *mut Node<P>,
        parentslot: usize,
    ) {
        let left = unsafe { &mut *l };
        let right = unsafe { &mut *r };
        let parent = unsafe { &mut *p };

        log::debug!(
            "BTree::merge_nodes {:p} <- {:p} via parent {:p} slot {}",
            left,
            right,
            parent,
            parentslot
        );
        debug_assert!(left.level == right.level);
        debug_assert!(left.keys.len() + right.keys.len() < P::SLOTMAX);
        debug_assert!(parent.child(parentslot) == l);
        debug_assert!(parent.child(parentslot + 1) == r);

        left.keys.push(parent.keys.remove(parentslot));
        left.keys.append(&mut right.keys);
        if !left.is_leaf() {
            let from = left.children.len();
            left.children.append(&mut right.children);
            left.relink_children(from);
        }

        parent.children.remove(parentslot + 1);
        parent.relink_children(parentslot + 1);
        self.free_node(r);
    }

    /// Collapse an empty root: a keyless leaf root means the tree is now
    /// empty, a keyless inner root hands its single child up as the new
    /// root and the height shrinks by one.
    fn try_shrink(&mut self) {
        let root = unsafe { &*self.root_ };
        if !root.keys.is_empty() {
            return;
        }

        if root.is_leaf() {
            debug_assert!(self.stats_.size == 0);
            self.free_node(self.root_);
            self.root_ = null_mut();
        } else {
            debug_assert!(root.children.len() == 1);
            let child = root.child(0);
            {
                let c = unsafe { &mut *child };
                c.parent = null_mut();
                c.position = 0;
            }
            log::debug!("BTree::try_shrink new root {:p}", child);
            self.free_node(self.root_);
            self.root_ = child;
        }
    }
}

/// Whole-tree operations
impl<P: BTreeParams> BTree<P> {
    /// Frees all keys and nodes by recursive teardown.
    pub fn clear(&mut self) {
        if !self.root_.is_null() {
            self.clear_recursive(self.root_);
            self.free_node(self.root_);

            self.root_ = null_mut();
            self.stats_ = TreeStats::new();
        }

        debug_assert!(self.stats_.size == 0);
    }

    /// O(1) exchange of the complete tree state with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.root_, &mut other.root_);
        std::mem::swap(&mut self.stats_, &mut other.stats_);
        std::mem::swap(&mut self.key_less, &mut other.key_less);
    }

    /// True iff both trees hold the same number of keys and the in-order
    /// sequences are element-wise equal under the comparator.
    pub fn eq_tree(&self, other: &Self) -> bool {
        if self.size() != other.size() {
            return false;
        }

        let mut a = self.begin();
        let mut b = other.begin();
        let a_end = self.end();
        while !a.equals(&a_end) {
            if !self.key_equal(a.key(), b.key()) {
                return false;
            }
            a.forward();
            b.forward();
        }
        true
    }

    /// Lexicographic comparison of the in-order key sequences.
    pub fn lt_tree(&self, other: &Self) -> bool {
        let mut a = self.begin();
        let mut b = other.begin();
        let a_end = self.end();
        let b_end = other.end();
        loop {
            let a_done = a.equals(&a_end);
            let b_done = b.equals(&b_end);
            if a_done || b_done {
                return a_done && !b_done;
            }
            if self.key_less(a.key(), b.key()) {
                return true;
            }
            if self.key_less(b.key(), a.key()) {
                return false;
            }
            a.forward();
            b.forward();
        }
    }
}

impl<P: BTreeParams> Clone for BTree<P> {
    /// Deep copy: clones every node, preserving the exact structure and
    /// rebuilding the parent/position back-references.
    fn clone(&self) -> Self {
        let mut tree = Self::with_comparator(self.key_less.clone());
        if !self.root_.is_null() {
            tree.root_ = tree.copy_subtree(self.root_, null_mut(), 0);
            tree.stats_.size = self.stats_.size;
        }
        tree
    }
}

impl<P: BTreeParams> BTree<P> {
    fn copy_subtree(
        &mut self,
        src: *mut Node<P>,
        parent: *mut Node<P>,
        position: u16,
    ) -> *mut Node<P> {
        let s = unsafe { &*src };
        let d = if s.is_leaf() {
            self.new_leaf()
        } else {
            self.new_inner(s.level)
        };

        unsafe {
            (*d).parent = parent;
            (*d).position = position;
            (*d).keys.extend_from_slice(&s.keys);
        }
        for i in 0..s.children.len() {
            let child = self.copy_subtree(s.children[i], d, i as u16);
            unsafe { (*d).children.push(child) };
        }
        d
    }
}

/// Debug
impl<P: BTreeParams> BTree<P> {
    fn print_node(
        f: &mut std::fmt::Formatter<'_>,
        node: *mut Node<P>,
        depth: usize,
        recursive: bool,
    ) -> std::fmt::Result {
        for _ in 0..depth {
            write!(f, "  ")?;
        }

        let n = unsafe { &*node };
        writeln!(
            f,
            "node {:p} level {} slotuse {} position {}",
            n,
            n.level,
            n.slotuse(),
            n.position
        )?;

        for _ in 0..depth {
            write!(f, "  ")?;
        }
        for i in 0..n.keys.len() {
            write!(f, " {:?}", n.key(i))?;
        }
        writeln!(f)?;

        if !n.is_leaf() && recursive {
            for i in 0..n.children.len() {
                Self::print_node(f, n.child(i), depth + 1, recursive)?;
            }
        }

        Ok(())
    }
}

impl<P: BTreeParams> std::fmt::Debug for BTree<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.root_.is_null() {
            Self::print_node(f, self.root_, 0, true)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree_base::{
        btree_traits::{BTreeTraits, _BTree},
        DefaultKeyComparator,
    };

    #[derive(Clone, Debug)]
    struct TinyTraits;
    impl BTreeTraits for TinyTraits {
        const NODE_SLOTS: usize = 4;
        const BINSEARCH_THRESHOLD: usize = 256;
    }

    type TinySet = _BTree<i32, DefaultKeyComparator<i32>, TinyTraits, false, true>;
    type TinyMulti = _BTree<i32, DefaultKeyComparator<i32>, TinyTraits, true, true>;

    fn collect(tree: &BTree<TinySet>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn first_split_promotes_the_median() {
        let mut tree = BTree::<TinySet>::new();
        for k in 0..=4 {
            tree.insert(k);
        }

        // five ascending keys overflow one leaf exactly once
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.get_stats().leaves, 2);
        assert_eq!(tree.get_stats().inner_nodes, 1);

        let root = unsafe { &*tree.root_ };
        assert_eq!(root.keys, vec![2]);
        assert_eq!(unsafe { &*root.child(0) }.keys, vec![0, 1]);
        assert_eq!(unsafe { &*root.child(1) }.keys, vec![3, 4]);
    }

    #[test]
    fn mixed_order_inserts_stay_sorted() {
        let mut tree = BTree::<TinySet>::new();
        for k in [5, 1, 9, 3, 7] {
            tree.insert(k);
        }

        assert_eq!(collect(&tree), vec![1, 3, 5, 7, 9]);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.size(), 5);
    }

    #[test]
    fn insert_returns_position_through_splits() {
        let mut tree = BTree::<TinySet>::new();
        for k in (0..40).step_by(2) {
            let (it, inserted) = tree.insert(k);
            assert!(inserted);
            assert_eq!(*it.key(), k);
        }
        for k in (1..40).step_by(2) {
            let (it, inserted) = tree.insert(k);
            assert!(inserted);
            assert_eq!(*it.key(), k);
        }
    }

    #[test]
    fn erase_of_returned_iterator_restores_size() {
        let mut tree = BTree::<TinySet>::new();
        for k in 0..20 {
            tree.insert(k * 2);
        }
        let before = tree.size();

        let (it, inserted) = tree.insert(21);
        assert!(inserted);
        tree.erase_at(it);

        assert_eq!(tree.size(), before);
        assert!(!tree.exists(&21));
        tree.verify();
    }

    #[test]
    fn unique_policy_rejects_duplicates() {
        let mut tree = BTree::<TinySet>::new();
        assert!(tree.insert(7).1);
        let (it, inserted) = tree.insert(7);
        assert!(!inserted);
        assert_eq!(*it.key(), 7);
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn erase_at_returns_the_successor() {
        let mut tree = BTree::<TinySet>::new();
        for k in 0..30 {
            tree.insert(k);
        }

        let it = tree.find(&10);
        let next = tree.erase_at(it);
        assert_eq!(*next.key(), 11);
        assert_eq!(tree.size(), 29);
        assert!(!tree.exists(&10));

        // erasing the largest key lands on end()
        let it = tree.find(&29);
        let next = tree.erase_at(it);
        assert!(next.equals(&tree.end()));
    }

    #[test]
    fn erase_separator_goes_through_the_predecessor() {
        let mut tree = BTree::<TinySet>::new();
        for k in 0..=4 {
            tree.insert(k);
        }
        // key 2 is the promoted separator of the first split
        let it = tree.find(&2);
        assert!(!unsafe { &*it.curr_node }.is_leaf());

        let next = tree.erase_at(it);
        assert_eq!(*next.key(), 3);
        assert_eq!(collect(&tree), vec![0, 1, 3, 4]);
    }

    #[test]
    fn erase_everything_shrinks_to_height_zero() {
        let mut tree = BTree::<TinySet>::new();
        for k in 0..100 {
            tree.insert(k);
        }
        assert!(tree.height() > 1);

        for k in 0..100 {
            assert!(tree.erase_one(&k));
        }
        assert!(tree.empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.get_stats().nodes(), 0);
    }

    #[test]
    fn multi_policy_keeps_equal_runs() {
        let mut tree = BTree::<TinyMulti>::new();
        for _ in 0..3 {
            tree.insert(2);
        }
        tree.insert(1);
        tree.insert(3);

        assert_eq!(tree.count(&2), 3);
        assert_eq!(tree.erase(&2), 3);
        assert_eq!(tree.count(&2), 0);
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn bounds_on_duplicates() {
        let mut tree = BTree::<TinyMulti>::new();
        for k in [1, 2, 2, 2, 3, 5] {
            tree.insert(k);
        }

        assert_eq!(*tree.lower_bound(&2).key(), 2);
        assert_eq!(*tree.upper_bound(&2).key(), 3);
        assert_eq!(*tree.lower_bound(&4).key(), 5);
        assert!(tree.upper_bound(&5).equals(&tree.end()));

        let (lo, hi) = tree.equal_range(&2);
        let mut it = lo;
        let mut run = 0;
        while !it.equals(&hi) {
            assert_eq!(*it.key(), 2);
            run += 1;
            it.forward();
        }
        assert_eq!(run, 3);
    }
}

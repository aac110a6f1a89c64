use std::ptr::null_mut;

use super::btree_traits::BTreeParams;

/// A single fixed-capacity B-tree node. Leaves store only keys; inner
/// nodes additionally store `keys.len() + 1` child links, with
/// `children[i]` holding the keys between `keys[i - 1]` and `keys[i]`.
///
/// Nodes are owned top-down by the tree through the raw child links;
/// `parent`/`position` form the non-owning back-relation the iterator
/// climbs through.
#[derive(Debug)]
pub struct Node<P: BTreeParams> {
    /// Non-owning back-reference, null for the root.
    pub parent: *mut Node<P>,
    /// Slot of this node in the parent's child array.
    pub position: u16,
    /// Distance to the leaf level; leaves are level 0, so the root's
    /// level is the tree height.
    pub level: u16,
    pub keys: Vec<P::KeyType>,
    pub children: Vec<*mut Node<P>>,
}

impl<P: BTreeParams> Node<P> {
    /// Key capacity is reserved one past `SLOTMAX` up front: insertion
    /// overfills a node by one slot before splitting it, and that
    /// transient state must not reallocate.
    pub fn new_leaf() -> *mut Self {
        Box::into_raw(Box::new(Node {
            parent: null_mut(),
            position: 0,
            level: 0,
            keys: Vec::with_capacity(P::SLOTMAX + 1),
            children: Vec::new(),
        }))
    }

    pub fn new_inner(level: u16) -> *mut Self {
        debug_assert!(level > 0);
        Box::into_raw(Box::new(Node {
            parent: null_mut(),
            position: 0,
            level,
            keys: Vec::with_capacity(P::SLOTMAX + 1),
            children: Vec::with_capacity(P::SLOTMAX + 2),
        }))
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.level == 0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_null()
    }

    #[inline]
    pub fn slotuse(&self) -> u16 {
        self.keys.len() as u16
    }

    #[inline]
    pub fn key(&self, slot: usize) -> &P::KeyType {
        &self.keys[slot]
    }

    #[inline]
    pub fn child(&self, slot: usize) -> *mut Node<P> {
        self.children[slot]
    }

    #[inline]
    pub fn is_overflow(&self) -> bool {
        self.keys.len() > P::SLOTMAX
    }

    #[inline]
    pub fn is_few(&self) -> bool {
        self.keys.len() <= P::SLOTMIN
    }

    #[inline]
    pub fn is_underflow(&self) -> bool {
        self.keys.len() < P::SLOTMIN
    }

    /// Re-stamp the back-references of the children from slot `from` on.
    /// Must run after any edit of the child array.
    pub fn relink_children(&mut self, from: usize) {
        let self_ptr = self as *mut Node<P>;
        for i in from..self.children.len() {
            let child = unsafe { &mut *self.children[i] };
            child.parent = self_ptr;
            child.position = i as u16;
        }
    }
}

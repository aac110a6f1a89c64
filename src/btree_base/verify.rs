use bitmask_enum::bitmask;

use super::{btree::BTree, btree_traits::BTreeParams, node::Node};

/// Selects which structural invariants [`BTree::verify_with`] asserts.
#[bitmask(u8)]
pub enum CheckFlags {
    /// Keys sorted within each node and bounded by the separators above.
    Order = 1,
    /// `SLOTMIN <= count <= SLOTMAX` for every non-root node.
    Occupancy = 2,
    /// All leaves at level 0 and every parent one level above its children.
    Balance = 4,
    /// Size and node counters match a full walk.
    Counts = 8,
}

/// Whole-tree invariant checking. A violation is a bug in the engine,
/// not a runtime condition, so every check is a plain `assert!`.
impl<P: BTreeParams> BTree<P> {
    pub fn verify(&self) {
        self.verify_with(
            CheckFlags::Order | CheckFlags::Occupancy | CheckFlags::Balance | CheckFlags::Counts,
        );
    }

    pub fn verify_with(&self, checks: CheckFlags) {
        if self.root_.is_null() {
            assert_eq!(self.stats_.size, 0, "empty tree must report size 0");
            return;
        }

        assert!(unsafe { &*self.root_ }.is_root());

        let mut keys = 0usize;
        let mut leaves = 0usize;
        let mut inner_nodes = 0usize;
        self.verify_node(
            self.root_,
            None,
            None,
            checks,
            &mut keys,
            &mut leaves,
            &mut inner_nodes,
        );

        if checks.contains(CheckFlags::Counts) {
            assert_eq!(keys, self.stats_.size, "size counter out of sync");
            assert_eq!(leaves, self.stats_.leaves, "leaf counter out of sync");
            assert_eq!(
                inner_nodes, self.stats_.inner_nodes,
                "inner node counter out of sync"
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn verify_node(
        &self,
        n: *mut Node<P>,
        lo: Option<&P::KeyType>,
        hi: Option<&P::KeyType>,
        checks: CheckFlags,
        keys: &mut usize,
        leaves: &mut usize,
        inner_nodes: &mut usize,
    ) {
        let node = unsafe { &*n };
        *keys += node.keys.len();
        if node.is_leaf() {
            *leaves += 1;
        } else {
            *inner_nodes += 1;
        }

        if checks.contains(CheckFlags::Occupancy) {
            if node.is_root() {
                assert!(!node.keys.is_empty(), "live root must hold a key");
            } else {
                assert!(node.keys.len() >= P::SLOTMIN, "node underflow");
            }
            assert!(node.keys.len() <= P::SLOTMAX, "node overflow");
        }

        if checks.contains(CheckFlags::Order) {
            for w in node.keys.windows(2) {
                assert!(!self.key_less(&w[1], &w[0]), "keys out of order");
                if !P::ALLOW_DUPLICATE {
                    assert!(self.key_less(&w[0], &w[1]), "duplicate in unique tree");
                }
            }
            for k in &node.keys {
                if let Some(lo) = lo {
                    assert!(!self.key_less(k, lo), "key below left separator");
                    if !P::ALLOW_DUPLICATE {
                        assert!(self.key_less(lo, k), "key equals left separator");
                    }
                }
                if let Some(hi) = hi {
                    assert!(!self.key_less(hi, k), "key above right separator");
                    if !P::ALLOW_DUPLICATE {
                        assert!(self.key_less(k, hi), "key equals right separator");
                    }
                }
            }
        }

        if node.is_leaf() {
            assert!(node.children.is_empty());
            if checks.contains(CheckFlags::Balance) {
                assert_eq!(node.level, 0, "leaf not at level 0");
            }
            return;
        }

        assert_eq!(node.children.len(), node.keys.len() + 1);
        for i in 0..node.children.len() {
            let c = node.children[i];
            let child = unsafe { &*c };
            assert_eq!(child.parent, n, "stale parent back-reference");
            assert_eq!(child.position as usize, i, "stale position back-reference");
            if checks.contains(CheckFlags::Balance) {
                assert_eq!(child.level + 1, node.level, "uneven subtree height");
            }

            let child_lo = if i > 0 { Some(node.key(i - 1)) } else { lo };
            let child_hi = if i < node.keys.len() {
                Some(node.key(i))
            } else {
                hi
            };
            self.verify_node(c, child_lo, child_hi, checks, keys, leaves, inner_nodes);
        }
    }
}

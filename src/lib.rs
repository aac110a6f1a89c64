//! An ordered set and multiset built on a compact in-memory B-tree.
//!
//! Values are packed onto fixed-capacity nodes (sized from a 256-byte
//! target), which gives better cache locality and lower per-element
//! overhead than a balanced binary tree. Unique-key and multi-key
//! semantics share a single engine in [`btree_base`]; the containers in
//! [`btree_set`] and [`btree_multiset`] are thin adapters over it.

pub mod btree_base;
pub mod btree_multiset;
pub mod btree_set;

pub use btree_multiset::{BTreeMultiset, DefaultBTreeMultiset};
pub use btree_set::{BTreeSet, DefaultBTreeSet};

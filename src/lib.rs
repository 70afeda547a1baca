//! An ordered set backed by a multiway search tree that never splits.
//!
//! Each node holds a sorted run of up to `capacity` unique elements. The
//! first time a leaf overflows it sprouts exactly `capacity + 1` empty
//! children in one step, one per open interval between consecutive elements
//! (plus the two unbounded ends), and all later growth recurses into those
//! subtrees. No node is ever split, merged or rebalanced.
//!
//! The tree supports insertion, exact-match lookup and ordered bidirectional
//! traversal through [`Cursor`]/[`CursorMut`] and the double-ended [`Iter`].
//! Cloning rebuilds the destination by breadth-first re-insertion, and the
//! `Display` impl writes the breadth-first, space-separated element listing.
//!
//! ```
//! use sprout_btree::BTree;
//!
//! let mut tree = BTree::with_capacity(3);
//! for x in &[50, 40, 30, 20, 10] {
//!     tree.insert(*x);
//! }
//! let sorted: Vec<i32> = tree.iter().copied().collect();
//! assert_eq!(sorted, vec![10, 20, 30, 40, 50]);
//! ```

mod cursor;
mod iter;
mod node;
mod tree;


pub use cursor::{Cursor, CursorMut};
pub use iter::Iter;
pub use tree::BTree;

/// Node capacity used by `BTree::new` and `BTree::default`
pub const DEFAULT_CAPACITY: usize = 40;

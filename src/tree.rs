use crate::cursor::{Cursor, CursorMut, Pos};
use crate::iter::Iter;
use crate::node::{Node, NodeId};
use crate::DEFAULT_CAPACITY;
use std::collections::VecDeque;
use std::fmt;

/// An ordered set of unique elements stored in a multiway search tree.
///
/// The tree never splits: a leaf that reaches `capacity` elements sprouts
/// `capacity + 1` empty children in a single step and every later insertion
/// descends into the child whose open interval contains the new element.
///
/// All nodes live in an arena owned by the tree and reference each other by
/// index, so dropping the tree releases every node at once.
#[derive(Debug)]
pub struct BTree<T: Ord> {
    pub(crate) capacity: usize,
    pub(crate) nodes: Vec<Node<T>>,
    pub(crate) root: Option<NodeId>,
    len: usize,
}

impl<T: Ord> BTree<T> {
    /// Create an empty tree with the default node capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty tree whose nodes hold at most `capacity` elements.
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity >= 1, "node capacity must be at least 1");
        BTree {
            capacity,
            nodes: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Maximum number of elements per node
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of elements in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `elem`, keeping elements unique.
    ///
    /// Returns a cursor at the element's position and `true` if it was
    /// inserted, or a cursor at the already-present equal element and
    /// `false`.
    pub fn insert(&mut self, elem: T) -> (Cursor<'_, T>, bool) {
        let root = match self.root {
            Some(root) => root,
            None => {
                let id = self.alloc(Node::leaf_with(elem, None, 0));
                self.root = Some(id);
                self.len = 1;
                return (Cursor::new(self, Some(Pos::new(id, 0))), true);
            }
        };

        if let Some(pos) = self.locate(&elem) {
            return (Cursor::new(self, Some(pos)), false);
        }

        // Descend to the node that will receive the element: the first
        // under-capacity node on the interval path. Any under-capacity node
        // is necessarily a leaf, so a plain length check suffices.
        let mut id = root;
        let target = loop {
            if self.nodes[id].is_leaf() {
                if self.nodes[id].elements.len() < self.capacity {
                    break id;
                }
                self.sprout_children(id);
            }
            let child = self.child_for(id, &elem);
            if self.nodes[child].elements.len() < self.capacity {
                break child;
            }
            id = child;
        };

        let pos = self.insert_into_run(target, elem);
        self.len += 1;
        (Cursor::new(self, Some(pos)), true)
    }

    /// Look up `elem`, returning a cursor at it or the end sentinel
    pub fn find(&self, elem: &T) -> Cursor<'_, T> {
        let pos = self.locate(elem);
        Cursor::new(self, pos)
    }

    /// Mutable variant of [`find`](Self::find)
    pub fn find_mut(&mut self, elem: &T) -> CursorMut<'_, T> {
        let pos = self.locate(elem);
        CursorMut::new(self, pos)
    }

    /// Double-ended iterator over the elements in ascending order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Cursor at the smallest element, or the end sentinel if empty
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.first_pos())
    }

    /// Cursor at the largest element, or the end sentinel if empty
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.last_pos())
    }

    /// The end sentinel: one past the last element, never dereferenceable
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor::new(self, None)
    }

    /// Descend from the root scanning each node's sorted run. A miss in a
    /// node moves to the child whose open interval would contain `elem`;
    /// a missing or empty child ends the search.
    fn locate(&self, elem: &T) -> Option<Pos> {
        let mut id = self.root?;
        loop {
            let node = &self.nodes[id];
            match node.elements.binary_search(elem) {
                Ok(index) => return Some(Pos::new(id, index)),
                Err(slot) => {
                    let &child = node.children.get(slot)?;
                    if self.nodes[child].is_empty() {
                        return None;
                    }
                    id = child;
                }
            }
        }
    }

    /// Child holding the open interval that contains `elem`: the slot of the
    /// first element greater than `elem`, or the last child when every
    /// element is smaller. Only called on nodes that have children.
    fn child_for(&self, id: NodeId, elem: &T) -> NodeId {
        let node = &self.nodes[id];
        let slot = node.elements.partition_point(|e| e < elem);
        node.children[slot]
    }

    /// Give a full leaf its `capacity + 1` empty children, all at once
    fn sprout_children(&mut self, id: NodeId) {
        debug_assert!(self.nodes[id].is_leaf());
        debug_assert_eq!(self.nodes[id].elements.len(), self.capacity);
        let children: Vec<NodeId> = (0..=self.capacity)
            .map(|slot| self.alloc(Node::empty(id, slot)))
            .collect();
        self.nodes[id].children = children;
    }

    /// Insert `elem` into the sorted run of an under-capacity node
    fn insert_into_run(&mut self, id: NodeId, elem: T) -> Pos {
        let node = &mut self.nodes[id];
        debug_assert!(node.elements.len() < self.capacity);
        let index = node.elements.partition_point(|e| *e < elem);
        node.elements.insert(index, elem);
        Pos::new(id, index)
    }

    fn alloc(&mut self, node: Node<T>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }
}

impl<T: Ord> Default for BTree<T> {
    fn default() -> Self {
        BTree::new()
    }
}

impl<T: Ord + Clone> Clone for BTree<T> {
    /// Deep copy by breadth-first traversal: every element of the source is
    /// re-inserted into a fresh tree through the standard insertion
    /// algorithm, so the copy has the same capacity and content but not
    /// necessarily the same physical node shape.
    fn clone(&self) -> Self {
        let mut tree = BTree::with_capacity(self.capacity);
        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id];
            for elem in &node.elements {
                tree.insert(elem.clone());
            }
            queue.extend(node.children.iter().copied());
        }
        tree
    }
}

impl<T: Ord + fmt::Display> fmt::Display for BTree<T> {
    /// Breadth-first listing: all elements of a node in ascending order,
    /// then the next node in breadth order, single-space separated. An empty
    /// tree prints nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();
        let mut first = true;
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id];
            for elem in &node.elements {
                if first {
                    first = false;
                } else {
                    f.write_str(" ")?;
                }
                write!(f, "{}", elem)?;
            }
            queue.extend(node.children.iter().copied());
        }
        Ok(())
    }
}

impl<T: Ord> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.insert(elem);
        }
    }
}

impl<T: Ord> std::iter::FromIterator<T> for BTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = BTree::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T: Ord> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use lazy_static::lazy_static;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;
    use std::sync::Mutex;

    #[test]
    fn first_insert_creates_root() {
        let mut tree = BTree::with_capacity(3);
        let (cursor, inserted) = tree.insert(42);
        assert!(inserted);
        assert_eq!(cursor.value(), Some(&42));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root, Some(0));
    }

    #[test]
    fn root_fills_before_sprouting() {
        let mut tree = BTree::with_capacity(3);
        tree.insert(20);
        tree.insert(10);
        tree.insert(30);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].elements, vec![10, 20, 30]);

        // Overflow: the root sprouts all four children at once
        tree.insert(15);
        assert_eq!(tree.nodes[0].children.len(), 4);
        assert_eq!(tree.nodes.len(), 5);
        // 15 lands in the child covering (10, 20)
        let child = tree.nodes[0].children[1];
        assert_eq!(tree.nodes[child].elements, vec![15]);
        assert_eq!(tree.nodes[child].parent, Some(0));
        assert_eq!(tree.nodes[child].slot, 1);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut tree = BTree::with_capacity(3);
        for x in &[50, 40, 30, 20, 10] {
            tree.insert(*x);
        }
        assert_eq!(tree.len(), 5);

        let (cursor, inserted) = tree.insert(40);
        assert!(!inserted);
        assert_eq!(cursor.value(), Some(&40));
        assert_eq!(tree.len(), 5);
        let collected: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(collected, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn find_present_and_absent() {
        let mut tree = BTree::with_capacity(3);
        for x in &[50, 40, 30, 20, 10, 9, 19, 29, 39, 49, 59] {
            tree.insert(*x);
        }

        assert_eq!(tree.find(&59).value(), Some(&59));
        assert_eq!(tree.find(&9).value(), Some(&9));
        assert!(tree.find(&999).is_end());
        assert!(tree.find(&999) == tree.cursor_end());
        assert!(tree.find(&25).is_end());
    }

    #[test]
    fn find_mut_allows_mutation() {
        // Same contract as the read-only variant, but the value can be
        // touched as long as the ordering is preserved
        let mut tree: BTree<(i32, &str)> = BTree::with_capacity(2);
        tree.insert((1, "one"));
        tree.insert((2, "two"));

        let mut cursor = tree.find_mut(&(2, "two"));
        if let Some(value) = cursor.value_mut() {
            value.1 = "TWO";
        }
        assert_eq!(tree.find(&(2, "TWO")).value(), Some(&(2, "TWO")));
    }

    #[test]
    fn sorted_iteration() {
        fn check(mut values: Vec<u32>, capacity: usize) {
            let mut tree = BTree::with_capacity(capacity);
            for &v in &values {
                tree.insert(v);
            }
            values.sort();
            values.dedup();
            let collected: Vec<u32> = tree.iter().copied().collect();
            assert_eq!(collected, values);
        }

        // Ascending, descending and seeded random orders, several shapes
        for &capacity in &[1, 2, 3, 7, 40] {
            check((0..100).collect(), capacity);
            check((0..100).rev().collect(), capacity);

            let mut rng = Pcg64::seed_from_u64(17);
            check((0..500).map(|_| rng.gen_range(0, 10_000)).collect(), capacity);
        }
    }

    #[test]
    fn display_breadth_first() {
        let mut tree = BTree::with_capacity(3);
        for x in &[50, 40, 30, 20, 10, 9, 19, 29, 39, 49, 59] {
            tree.insert(*x);
        }
        // Root run first, then each child's run in breadth order
        assert_eq!(tree.to_string(), "30 40 50 9 10 20 39 49 59 19 29");
    }

    #[test]
    fn display_empty_tree() {
        let tree: BTree<i32> = BTree::with_capacity(3);
        assert_eq!(tree.to_string(), "");
    }

    #[test]
    fn clone_rebuilds_and_detaches() {
        let mut a = BTree::with_capacity(3);
        for x in &[50, 40, 30, 20, 10, 9, 19, 29, 39, 49, 59] {
            a.insert(*x);
        }

        let mut b = a.clone();
        assert_eq!(b.capacity(), a.capacity());
        let from_a: Vec<i32> = a.iter().copied().collect();
        let from_b: Vec<i32> = b.iter().copied().collect();
        assert_eq!(from_a, from_b);

        // Mutating the copy leaves the source untouched
        b.insert(1000);
        assert!(a.find(&1000).is_end());
        assert_eq!(a.len(), 11);
        assert_eq!(b.len(), 12);
    }

    #[test]
    fn from_iter_collects() {
        fn check(mut values: Vec<i32>) {
            let tree: BTree<i32> = values.iter().cloned().collect();
            values.sort();
            values.dedup();
            let collected: Vec<i32> = tree.iter().cloned().collect();
            assert_eq!(collected, values);
        }

        check(vec![]);
        check(vec![1, 2, 3, 1, 2, 3]);
        check((0..1000).collect());
        check((0..1000).chain(20..30).collect());
    }

    #[test]
    #[should_panic]
    fn zero_capacity_rejected() {
        BTree::<i32>::with_capacity(0);
    }

    // Count drop calls to check that dropping the tree releases every
    // element exactly once, whatever the node shape
    lazy_static! {
        static ref NUM_DROPPED: Mutex<u32> = Mutex::new(0);
        static ref DROP_MUTEX: Mutex<()> = Mutex::new(());
    }

    #[derive(Ord, Eq, PartialOrd, PartialEq, Debug)]
    struct Counted(i32);
    impl Drop for Counted {
        fn drop(&mut self) {
            *NUM_DROPPED.lock().unwrap() += 1;
        }
    }

    #[test]
    fn drop_releases_every_element() {
        let lock = DROP_MUTEX.lock().unwrap();
        *NUM_DROPPED.lock().unwrap() = 0;

        let mut tree = BTree::with_capacity(2);
        for i in 0..100 {
            tree.insert(Counted(i));
        }
        assert_eq!(*NUM_DROPPED.lock().unwrap(), 0);
        drop(tree);
        assert_eq!(*NUM_DROPPED.lock().unwrap(), 100);
        drop(lock);
    }
}

use crate::node::NodeId;
use crate::tree::BTree;
use std::fmt;
use std::ptr;

/// A concrete element position: a node and an index into its sorted run.
/// The end sentinel is represented as the absence of a `Pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pos {
    pub(crate) node: NodeId,
    pub(crate) index: usize,
}

impl Pos {
    pub(crate) fn new(node: NodeId, index: usize) -> Self {
        Pos { node, index }
    }
}

/// Stepping rules, shared by both cursor variants and the iterator.
///
/// In-order traversal interleaves a node's elements with its subtrees:
/// `children[0]`, `elements[0]`, `children[1]`, `elements[1]`, ...,
/// `elements[M-1]`, `children[M]`. Both directions walk that sequence using
/// only parent back-references and sibling slots, skipping empty subtrees
/// (a subtree is empty exactly when its root node holds no elements).
impl<T: Ord> BTree<T> {
    pub(crate) fn element_at(&self, pos: Pos) -> &T {
        &self.nodes[pos.node].elements[pos.index]
    }

    pub(crate) fn element_at_mut(&mut self, pos: Pos) -> &mut T {
        &mut self.nodes[pos.node].elements[pos.index]
    }

    /// First in-order position of the whole tree
    pub(crate) fn first_pos(&self) -> Option<Pos> {
        self.root.and_then(|root| self.first_in_subtree(root))
    }

    /// Last in-order position of the whole tree
    pub(crate) fn last_pos(&self) -> Option<Pos> {
        self.root.and_then(|root| self.last_in_subtree(root))
    }

    /// Leftmost element of the subtree rooted at `id`, if any: keep
    /// descending into the first child while it leads to elements, then
    /// land on the current node's first slot
    pub(crate) fn first_in_subtree(&self, mut id: NodeId) -> Option<Pos> {
        if self.nodes[id].is_empty() {
            return None;
        }
        loop {
            match self.nodes[id].children.first() {
                Some(&child) if !self.nodes[child].is_empty() => id = child,
                _ => return Some(Pos::new(id, 0)),
            }
        }
    }

    /// Mirror image of `first_in_subtree`
    pub(crate) fn last_in_subtree(&self, mut id: NodeId) -> Option<Pos> {
        if self.nodes[id].is_empty() {
            return None;
        }
        loop {
            let node = &self.nodes[id];
            match node.children.last() {
                Some(&child) if !self.nodes[child].is_empty() => id = child,
                _ => return Some(Pos::new(id, node.elements.len() - 1)),
            }
        }
    }

    /// Next in-order position, or `None` past the last element.
    ///
    /// Transition rules, in order:
    /// 1. the subtree on the boundary just after slot `index`, if populated;
    /// 2. the next slot of the same node;
    /// 3. climb: the first ancestor edge entered from a non-last child slot
    ///    `s` resumes at the ancestor's element `s`.
    pub(crate) fn successor(&self, pos: Pos) -> Option<Pos> {
        let node = &self.nodes[pos.node];
        if let Some(&child) = node.children.get(pos.index + 1) {
            if let Some(first) = self.first_in_subtree(child) {
                return Some(first);
            }
        }
        if pos.index + 1 < node.elements.len() {
            return Some(Pos::new(pos.node, pos.index + 1));
        }

        let mut id = pos.node;
        loop {
            let climbed = &self.nodes[id];
            let parent = climbed.parent?;
            if climbed.slot < self.nodes[parent].elements.len() {
                return Some(Pos::new(parent, climbed.slot));
            }
            id = parent;
        }
    }

    /// Previous in-order position, or `None` before the first element
    pub(crate) fn predecessor(&self, pos: Pos) -> Option<Pos> {
        let node = &self.nodes[pos.node];
        if let Some(&child) = node.children.get(pos.index) {
            if let Some(last) = self.last_in_subtree(child) {
                return Some(last);
            }
        }
        if pos.index > 0 {
            return Some(Pos::new(pos.node, pos.index - 1));
        }

        let mut id = pos.node;
        loop {
            let climbed = &self.nodes[id];
            let parent = climbed.parent?;
            if climbed.slot > 0 {
                return Some(Pos::new(parent, climbed.slot - 1));
            }
            id = parent;
        }
    }
}

/// A read-only traversal position: an element of the tree or the end
/// sentinel. Obtained from [`BTree::find`], [`BTree::insert`] and the
/// `cursor_*` factories.
///
/// Two cursors are equal when they reference the same tree instance and
/// denote the same position; this holds across the mutable and read-only
/// variants.
pub struct Cursor<'a, T: Ord> {
    tree: &'a BTree<T>,
    pos: Option<Pos>,
}

impl<'a, T: Ord> Cursor<'a, T> {
    pub(crate) fn new(tree: &'a BTree<T>, pos: Option<Pos>) -> Self {
        Cursor { tree, pos }
    }

    /// The element under the cursor, or `None` at the end sentinel
    pub fn value(&self) -> Option<&'a T> {
        self.pos.map(|pos| self.tree.element_at(pos))
    }

    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    /// Step to the in-order successor. The end sentinel stays put.
    pub fn next(&mut self) {
        if let Some(pos) = self.pos {
            self.pos = self.tree.successor(pos);
        }
    }

    /// Step to the in-order predecessor. From the end sentinel this lands
    /// on the tree's largest element; from the first element it becomes the
    /// end sentinel.
    pub fn prev(&mut self) {
        self.pos = match self.pos {
            Some(pos) => self.tree.predecessor(pos),
            None => self.tree.last_pos(),
        };
    }
}

impl<'a, T: Ord> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        Cursor {
            tree: self.tree,
            pos: self.pos,
        }
    }
}

impl<'a, T: Ord> Copy for Cursor<'a, T> {}

impl<'a, T: Ord> fmt::Debug for Cursor<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("pos", &self.pos).finish()
    }
}

/// Mutable counterpart of [`Cursor`], obtained from [`BTree::find_mut`].
///
/// Grants mutable access to the element under it; the caller must not
/// mutate it in a way that changes its ordering relative to the rest of
/// the tree.
pub struct CursorMut<'a, T: Ord> {
    tree: &'a mut BTree<T>,
    pos: Option<Pos>,
}

impl<'a, T: Ord> CursorMut<'a, T> {
    pub(crate) fn new(tree: &'a mut BTree<T>, pos: Option<Pos>) -> Self {
        CursorMut { tree, pos }
    }

    /// The element under the cursor, or `None` at the end sentinel
    pub fn value(&self) -> Option<&T> {
        self.pos.map(move |pos| self.tree.element_at(pos))
    }

    /// Mutable access to the element under the cursor.
    ///
    /// The mutation must keep the element's order rank unchanged, otherwise
    /// later lookups and traversal order are unspecified.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        let tree = &mut *self.tree;
        self.pos.map(move |pos| tree.element_at_mut(pos))
    }

    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    /// Step to the in-order successor. The end sentinel stays put.
    pub fn next(&mut self) {
        if let Some(pos) = self.pos {
            self.pos = self.tree.successor(pos);
        }
    }

    /// Step to the in-order predecessor, landing on the largest element
    /// when starting from the end sentinel
    pub fn prev(&mut self) {
        self.pos = match self.pos {
            Some(pos) => self.tree.predecessor(pos),
            None => self.tree.last_pos(),
        };
    }

    /// Read-only view of this cursor at the same position
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor::new(&*self.tree, self.pos)
    }
}

impl<'a, T: Ord> fmt::Debug for CursorMut<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut").field("pos", &self.pos).finish()
    }
}

// Equality is (tree instance, node, index), across either variant

impl<'a, 'b, T: Ord> PartialEq<Cursor<'b, T>> for Cursor<'a, T> {
    fn eq(&self, other: &Cursor<'b, T>) -> bool {
        ptr::eq(self.tree, other.tree) && self.pos == other.pos
    }
}

impl<'a, T: Ord> Eq for Cursor<'a, T> {}

impl<'a, 'b, T: Ord> PartialEq<CursorMut<'b, T>> for CursorMut<'a, T> {
    fn eq(&self, other: &CursorMut<'b, T>) -> bool {
        ptr::eq(self.tree, other.tree) && self.pos == other.pos
    }
}

impl<'a, T: Ord> Eq for CursorMut<'a, T> {}

impl<'a, 'b, T: Ord> PartialEq<CursorMut<'b, T>> for Cursor<'a, T> {
    fn eq(&self, other: &CursorMut<'b, T>) -> bool {
        ptr::eq(self.tree, &*other.tree) && self.pos == other.pos
    }
}

impl<'a, 'b, T: Ord> PartialEq<Cursor<'b, T>> for CursorMut<'a, T> {
    fn eq(&self, other: &Cursor<'b, T>) -> bool {
        ptr::eq(&*self.tree, other.tree) && self.pos == other.pos
    }
}

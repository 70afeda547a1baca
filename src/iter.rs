use crate::cursor::Pos;
use crate::tree::BTree;
use std::iter::{ExactSizeIterator, FusedIterator};

/// Double-ended iterator over references to the tree's elements, ascending
/// from the front and descending from the back. The two ends share a single
/// remaining-element count, so they never yield the same element twice.
pub struct Iter<'a, T: Ord> {
    tree: &'a BTree<T>,
    /// Next position to yield from the front
    front: Option<Pos>,
    /// Next position to yield from the back
    back: Option<Pos>,
    remaining: usize,
}

impl<'a, T: Ord> Iter<'a, T> {
    pub(crate) fn new(tree: &'a BTree<T>) -> Self {
        Iter {
            tree,
            front: tree.first_pos(),
            back: tree.last_pos(),
            remaining: tree.len(),
        }
    }
}

impl<'a, T: Ord> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.front?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = self.tree.successor(pos);
        }
        Some(self.tree.element_at(pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T: Ord> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.back?;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = self.tree.predecessor(pos);
        }
        Some(self.tree.element_at(pos))
    }
}

impl<'a, T: Ord> ExactSizeIterator for Iter<'a, T> {}
impl<'a, T: Ord> FusedIterator for Iter<'a, T> {}

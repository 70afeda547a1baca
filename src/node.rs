/// Index of a node inside the tree's arena
pub(crate) type NodeId = usize;

/// A single tree node: a sorted run of elements plus, once the run has
/// filled up, one child subtree per open interval between consecutive
/// elements (and the two unbounded ends).
///
/// `parent` and `slot` are navigation-only back-links; ownership lives
/// entirely in the tree's arena.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) elements: Vec<T>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) slot: usize,
}

impl<T> Node<T> {
    /// Build a leaf holding a single element
    pub(crate) fn leaf_with(element: T, parent: Option<NodeId>, slot: usize) -> Self {
        Node {
            elements: vec![element],
            children: Vec::new(),
            parent,
            slot,
        }
    }

    /// Build an empty leaf, used when a full node sprouts its children
    pub(crate) fn empty(parent: NodeId, slot: usize) -> Self {
        Node {
            elements: Vec::new(),
            children: Vec::new(),
            parent: Some(parent),
            slot,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// An empty node is always a leaf: children are only ever sprouted by a
    /// full node and elements are never removed. So "no elements" means the
    /// whole subtree below this node is empty.
    pub(crate) fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

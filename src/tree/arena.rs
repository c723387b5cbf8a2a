/// Index into the arena `Vec<LayoutNode>`. Uses u32 to keep nodes compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a branch arranges its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitType {
    /// Leaf: no children
    None,
    /// Side by side, shared height: widths combine
    Horizontal,
    /// Stacked, shared width: heights combine
    Vertical,
}

/// A single node in the layout tree, stored in a flat arena.
///
/// A leaf has `image` set and no children; a branch has both children and
/// no image. Geometry is only meaningful after coordinate assignment.
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub split: SplitType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Index into the image slice the tree was built from (leaves only)
    pub image: Option<usize>,
    pub aspect_ratio: f64,
}

impl LayoutNode {
    pub fn is_leaf(&self) -> bool {
        self.image.is_some()
    }

    /// Both children of a branch, `None` for a leaf.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match (self.left, self.right) {
            (Some(l), Some(r)) => Some((l, r)),
            _ => None,
        }
    }
}

/// The layout tree stored as a flat arena of nodes.
///
/// Nodes are only ever appended, and a branch is always pushed after both of
/// its children. Every child therefore has a lower index than its parent,
/// which lets the bottom-up and top-down passes walk the arena linearly.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    /// All nodes in contiguous memory
    pub nodes: Vec<LayoutNode>,
    /// Root node index
    pub root: NodeId,
}

impl LayoutTree {
    pub fn with_capacity(leaves: usize) -> Self {
        LayoutTree {
            nodes: Vec::with_capacity(leaves.saturating_mul(2)),
            root: NodeId(0),
        }
    }

    /// Append a leaf wrapping `image` (an index into the source slice).
    pub fn add_leaf(&mut self, image: usize, aspect_ratio: f64) -> NodeId {
        self.push(LayoutNode {
            left: None,
            right: None,
            split: SplitType::None,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            image: Some(image),
            aspect_ratio,
        })
    }

    /// Append a branch over two existing nodes. The caller sets the aspect ratio.
    pub fn add_branch(&mut self, left: NodeId, right: NodeId, split: SplitType) -> NodeId {
        debug_assert!(left.index() < self.nodes.len() && right.index() < self.nodes.len());
        debug_assert!(split != SplitType::None);
        self.push(LayoutNode {
            left: Some(left),
            right: Some(right),
            split,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            image: None,
            aspect_ratio: 1.0,
        })
    }

    fn push(&mut self, node: LayoutNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &LayoutNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut LayoutNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaves in depth-first order, left subtree before right subtree.
    pub fn leaves(&self) -> LeafIter<'_> {
        let stack = if self.nodes.is_empty() {
            Vec::new()
        } else {
            vec![self.root]
        };
        LeafIter { tree: self, stack }
    }
}

/// Depth-first iterator over the leaves of a tree.
pub struct LeafIter<'a> {
    tree: &'a LayoutTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for LeafIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            match self.tree.get(id).children() {
                Some((left, right)) => {
                    // Right pushed first so the left subtree is visited first
                    self.stack.push(right);
                    self.stack.push(left);
                }
                None => return Some(id),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_are_visited_left_to_right() {
        let mut tree = LayoutTree::with_capacity(3);
        let a = tree.add_leaf(0, 1.0);
        let b = tree.add_leaf(1, 1.0);
        let c = tree.add_leaf(2, 1.0);
        let bc = tree.add_branch(b, c, SplitType::Vertical);
        tree.root = tree.add_branch(a, bc, SplitType::Horizontal);

        let order: Vec<usize> = tree
            .leaves()
            .map(|id| tree.get(id).image.unwrap())
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn empty_tree_has_no_leaves() {
        let tree = LayoutTree::with_capacity(0);
        assert_eq!(tree.leaves().count(), 0);
    }
}

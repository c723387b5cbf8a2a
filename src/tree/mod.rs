pub mod arena;
pub mod aspect;

use rand::Rng;

use self::arena::{LayoutTree, NodeId, SplitType};
use self::aspect::combine_aspect;
use crate::scanner::types::ImageRecord;

/// Build a random layout tree over `images`, visiting them in `order`.
///
/// `order` holds indices into `images` (already shuffled by the caller). Each
/// image becomes a leaf; the leaf sequence is then split recursively at a
/// uniformly random index, and each branch gets a uniformly random initial
/// orientation. The partition is purely positional: image weights are not
/// consulted. Returns an empty tree when `order` is empty.
pub fn build_random_tree<R: Rng + ?Sized>(
    images: &[ImageRecord],
    order: &[usize],
    rng: &mut R,
) -> LayoutTree {
    let mut tree = LayoutTree::with_capacity(order.len());
    if order.is_empty() {
        return tree;
    }

    let leaves: Vec<NodeId> = order
        .iter()
        .map(|&i| tree.add_leaf(i, images[i].aspect_ratio()))
        .collect();

    tree.root = partition(&mut tree, &leaves, rng);
    tree
}

fn partition<R: Rng + ?Sized>(tree: &mut LayoutTree, nodes: &[NodeId], rng: &mut R) -> NodeId {
    if nodes.len() == 1 {
        return nodes[0];
    }

    let split_at = rng.gen_range(1..nodes.len());
    let left = partition(tree, &nodes[..split_at], rng);
    let right = partition(tree, &nodes[split_at..], rng);

    let split = random_split(rng);
    let aspect = combine_aspect(
        split,
        tree.get(left).aspect_ratio,
        tree.get(right).aspect_ratio,
    );
    let id = tree.add_branch(left, right, split);
    tree.get_mut(id).aspect_ratio = aspect;
    id
}

fn random_split<R: Rng + ?Sized>(rng: &mut R) -> SplitType {
    if rng.gen_bool(0.5) {
        SplitType::Horizontal
    } else {
        SplitType::Vertical
    }
}

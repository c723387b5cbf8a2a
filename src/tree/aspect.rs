use super::arena::{LayoutTree, SplitType};

/// Aspect ratio of two regions joined by `split`.
///
/// Horizontal (shared height) adds the ratios; vertical (shared width) takes
/// the harmonic combination. A non-positive vertical denominator yields 1.0.
pub fn combine_aspect(split: SplitType, a1: f64, a2: f64) -> f64 {
    match split {
        SplitType::Horizontal => a1 + a2,
        SplitType::Vertical => {
            let denom = 1.0 / a1 + 1.0 / a2;
            if denom > 0.0 && denom.is_finite() {
                1.0 / denom
            } else {
                1.0
            }
        }
        SplitType::None => 1.0,
    }
}

/// Recompute every branch's aspect ratio from its children (bottom-up).
pub fn update_aspect_ratios(tree: &mut LayoutTree) {
    // Children always sit at lower indices than their parent.
    for i in 0..tree.nodes.len() {
        let Some((left, right)) = tree.nodes[i].children() else {
            continue;
        };
        let a1 = tree.nodes[left.index()].aspect_ratio;
        let a2 = tree.nodes[right.index()].aspect_ratio;
        tree.nodes[i].aspect_ratio = combine_aspect(tree.nodes[i].split, a1, a2);
    }
}

/// Greedy per-branch orientation choice ("smart flip").
///
/// Walks bottom-up and, at each branch, keeps whichever split brings the
/// combined aspect ratio closest to `target`. Vertical is evaluated first and
/// horizontal replaces it only when strictly closer, so ties stay vertical.
/// Returns the root's final aspect ratio.
pub fn optimize_splits(tree: &mut LayoutTree, target: f64) -> f64 {
    for i in 0..tree.nodes.len() {
        let Some((left, right)) = tree.nodes[i].children() else {
            continue;
        };
        let a1 = tree.nodes[left.index()].aspect_ratio;
        let a2 = tree.nodes[right.index()].aspect_ratio;

        let mut best_split = SplitType::Vertical;
        let mut best_ar = combine_aspect(SplitType::Vertical, a1, a2);
        let mut best_diff = (best_ar - target).abs();

        let horizontal_ar = combine_aspect(SplitType::Horizontal, a1, a2);
        let horizontal_diff = (horizontal_ar - target).abs();
        if horizontal_diff < best_diff {
            best_split = SplitType::Horizontal;
            best_ar = horizontal_ar;
            best_diff = horizontal_diff;
        }

        tracing::trace!(node = i, ?best_split, best_diff, "smart flip");
        let node = &mut tree.nodes[i];
        node.split = best_split;
        node.aspect_ratio = best_ar;
    }

    if tree.is_empty() {
        return 1.0;
    }
    tree.get(tree.root).aspect_ratio
}

use crate::tree::arena::{LayoutTree, SplitType};

/// Axis-aligned region in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Top-down coordinate assignment at the tree's natural ratio.
///
/// The root is pinned to `canvas_width` and gets height
/// `canvas_width / root_aspect`. Horizontal branches divide their width in
/// proportion to the children's aspect ratios; vertical branches divide their
/// height in proportion to the inverse ratios, so taller children get more
/// height. The second child always takes the remainder, so child extents sum
/// to the parent's. Returns the root region (the natural size).
pub fn assign_coordinates(tree: &mut LayoutTree, canvas_width: f64) -> Option<Region> {
    if tree.is_empty() {
        return None;
    }

    let root_ar = tree.get(tree.root).aspect_ratio;
    let natural_h = if root_ar > 0.0 {
        canvas_width / root_ar
    } else {
        canvas_width
    };
    let root = tree.root;
    set_region(
        tree,
        root.index(),
        Region {
            x: 0.0,
            y: 0.0,
            w: canvas_width,
            h: natural_h,
        },
    );

    // Parents always sit at higher indices than their children, so walking the
    // arena backwards visits every parent before either child.
    for i in (0..=root.index()).rev() {
        let node = &tree.nodes[i];
        let Some((left, right)) = node.children() else {
            continue;
        };
        let (x, y, w, h) = (node.x, node.y, node.width, node.height);
        let ar_l = tree.nodes[left.index()].aspect_ratio;
        let ar_r = tree.nodes[right.index()].aspect_ratio;

        let (left_region, right_region) = match node.split {
            SplitType::Horizontal => {
                let w_left = w * proportion(ar_l, ar_r);
                (
                    Region { x, y, w: w_left, h },
                    Region {
                        x: x + w_left,
                        y,
                        w: w - w_left,
                        h,
                    },
                )
            }
            SplitType::Vertical => {
                let h_left = h * proportion(ar_l.recip(), ar_r.recip());
                (
                    Region { x, y, w, h: h_left },
                    Region {
                        x,
                        y: y + h_left,
                        w,
                        h: h - h_left,
                    },
                )
            }
            SplitType::None => continue,
        };

        set_region(tree, left.index(), left_region);
        set_region(tree, right.index(), right_region);
    }

    Some(Region {
        x: 0.0,
        y: 0.0,
        w: canvas_width,
        h: natural_h,
    })
}

/// Share of the first part in `a : b`, falling back to an even split.
fn proportion(a: f64, b: f64) -> f64 {
    let total = a + b;
    if total > 0.0 && total.is_finite() {
        a / total
    } else {
        0.5
    }
}

fn set_region(tree: &mut LayoutTree, index: usize, region: Region) {
    let node = &mut tree.nodes[index];
    node.x = region.x;
    node.y = region.y;
    node.width = region.w;
    node.height = region.h;
}

/// Contain-fit the laid-out tree into the canvas ("force shrink").
///
/// Scales every node uniformly by `min(canvas_w / natural_w, canvas_h / natural_h)`
/// and centers the result on both axes. Returns the scale applied.
pub fn fit_to_bounds(
    tree: &mut LayoutTree,
    natural: Region,
    canvas_width: f64,
    canvas_height: f64,
) -> f64 {
    if natural.w <= 0.0 || natural.h <= 0.0 {
        return 1.0;
    }

    let scale_x = canvas_width / natural.w;
    let scale_y = canvas_height / natural.h;
    let scale = scale_x.min(scale_y);

    let offset_x = (canvas_width - natural.w * scale) / 2.0;
    let offset_y = (canvas_height - natural.h * scale) / 2.0;

    for node in &mut tree.nodes {
        node.x = (node.x - natural.x) * scale + offset_x;
        node.y = (node.y - natural.y) * scale + offset_y;
        node.width *= scale;
        node.height *= scale;
    }

    tracing::debug!(
        "Fit {:.1}x{:.1} into {:.0}x{:.0}: scale={:.4}, offset=({:.2}, {:.2})",
        natural.w,
        natural.h,
        canvas_width,
        canvas_height,
        scale,
        offset_x,
        offset_y
    );

    scale
}

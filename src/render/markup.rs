use std::fmt::Write;

use super::inset;
use crate::layout::Layout;

/// CSS class of the generated container.
pub const CONTAINER_CLASS: &str = "collage";

/// Render a layout as responsive HTML.
///
/// The container keeps the canvas ratio through percentage bottom padding and
/// every image is absolutely positioned in percentages of the canvas, so the
/// collage scales with its parent. Crop behavior is left to the `object-fit`
/// rule in the emitted style block.
pub fn to_markup(layout: &Layout) -> String {
    let cw = layout.canvas_width;
    let ch = layout.canvas_height;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "<style>.{c}{{position:relative;width:100%;height:0;padding-bottom:{ratio:.4}%;overflow:hidden}}\
         .{c} img{{position:absolute;display:block;object-fit:cover;object-position:center}}</style>",
        c = CONTAINER_CLASS,
        ratio = ch / cw * 100.0,
    );
    let _ = writeln!(out, "<div class=\"{}\">", CONTAINER_CLASS);

    for p in &layout.placements {
        let Some((x, y, w, h)) = inset(p.x, p.y, p.width, p.height, layout.padding) else {
            continue;
        };
        let _ = writeln!(
            out,
            "  <img src=\"{}\" alt=\"\" loading=\"lazy\" style=\"left:{:.4}%;top:{:.4}%;width:{:.4}%;height:{:.4}%\">",
            escape_attr(&p.image.path),
            x / cw * 100.0,
            y / ch * 100.0,
            w / cw * 100.0,
            h / ch * 100.0,
        );
    }

    out.push_str("</div>\n");
    out
}

/// Escape a value for use inside a double-quoted HTML attribute.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

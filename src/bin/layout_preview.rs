//! Layout preview: renders every layout for 1 to 7 windows as an HTML page
//! of SVG sketches.
//!
//! Run with:
//!     cargo run --bin hyprtile-layout-preview > layouts.html
//!
//! Each tile is labelled with its position in the tiling order, starting
//! at 1 for the primary window.

use hyprtile::geometry::Rect;
use hyprtile::layout::{Layout, LayoutParams};
use std::fmt::Write;

/// A 16:9 screen small enough to fit many sketches on one page.
const BOUNDS: Rect = Rect {
    top: 0.0,
    left: 0.0,
    width: 320.0,
    height: 180.0,
};

const MARGIN: f64 = 4.0;
const PRIMARY_FACTOR: f64 = 1.5;
const MAX_WINDOWS: usize = 7;

fn render_svg(out: &mut String, layout: Layout, count: usize) -> std::fmt::Result {
    let params = LayoutParams::new(count, MARGIN, 1, PRIMARY_FACTOR);
    writeln!(
        out,
        r#"<svg width="{}" height="{}" style="background-color:#ccc">"#,
        BOUNDS.width, BOUNDS.height
    )?;
    for index in 0..count {
        let rect = layout.place(index, BOUNDS, &params);
        writeln!(
            out,
            r#"  <rect width="{}" height="{}" x="{}" y="{}" style="fill:rgb(100,100,255);stroke-width:1;stroke:rgb(0,0,0)" />"#,
            rect.width, rect.height, rect.left, rect.top
        )?;
        writeln!(
            out,
            r##"  <text x="{}" y="{}" fill="#000">{}</text>"##,
            rect.left + 2.0,
            rect.bottom() - 2.0,
            index + 1
        )?;
    }
    writeln!(out, "</svg>")
}

fn render_page() -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>\n<html>\n<body>")?;
    for layout in Layout::ALL {
        writeln!(out, "<h1>Layout: {}</h1>", layout.title())?;
        writeln!(out, "<p>{}</p>", layout.description())?;
        for count in 1..=MAX_WINDOWS {
            writeln!(out, "<h2>{} window(s)</h2>", count)?;
            writeln!(out, "<div>")?;
            render_svg(&mut out, layout, count)?;
            writeln!(out, "</div>")?;
        }
    }
    writeln!(out, "</body>\n</html>")?;
    Ok(out)
}

fn main() {
    match render_page() {
        Ok(page) => print!("{}", page),
        Err(e) => {
            eprintln!("failed to render preview: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_has_one_sketch_per_layout_and_count() {
        let page = render_page().unwrap();
        assert_eq!(page.matches("<svg").count(), Layout::ALL.len() * MAX_WINDOWS);
        // 1 + 2 + ... + 7 tiles per layout.
        assert_eq!(page.matches("<rect").count(), Layout::ALL.len() * 28);
        for layout in Layout::ALL {
            assert!(page.contains(layout.title()));
        }
    }

    #[test]
    fn single_window_fills_bounds_minus_margin() {
        let mut out = String::new();
        render_svg(&mut out, Layout::EqualColumns, 1).unwrap();
        assert!(out.contains(r#"<rect width="312" height="172" x="4" y="4""#));
        assert!(out.contains(">1</text>"));
    }
}

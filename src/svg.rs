//! SVG synthesis for character grids.
//!
//! The grid is emitted as a single `<text>` element with one `<tspan>` per
//! line. Regular spaces become U+00A0 so renderers keep the column alignment.

use std::fmt::Write as _;

use crate::sizing::CellMetrics;
use crate::surface::GridType;
use crate::Dimensions;

const NBSP: &str = "\u{00A0}";

/// Escape the five XML special characters.
///
/// ```rust
/// use ascii_studio_core::svg::escape_xml;
///
/// assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
/// assert_eq!(escape_xml("plain #@!"), "plain #@!");
/// ```
pub fn escape_xml(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Everything needed to lay out a grid as SVG.
#[derive(Clone, Debug)]
pub struct SvgLayout<'a> {
    pub dimensions: Dimensions,
    pub metrics: CellMetrics,
    pub font_family: &'a str,
    pub grid: GridType,
}

/// Render the lines of a grid as an SVG document.
///
/// The canvas is `width × cell_width` by `height × cell_height`. Grid lines
/// sit on interior cell boundaries only, so a `w × h` grid with
/// [`GridType::Both`] has `h - 1` horizontal and `w - 1` vertical lines.
pub fn render_svg<S: AsRef<str>>(lines: &[S], layout: &SvgLayout<'_>) -> String {
    let Dimensions { width, height } = layout.dimensions;
    let CellMetrics {
        font_size,
        cell_width,
        cell_height,
    } = layout.metrics;
    let (svg_width, svg_height) = layout.metrics.grid_size(layout.dimensions);

    // Writing into a String cannot fail.
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{svg_width}" height="{svg_height}" viewBox="0 0 {svg_width} {svg_height}">"#
    );
    svg.push_str("  <style>\n");
    let _ = writeln!(
        svg,
        "    .ascii-text {{ font-family: {}; font-size: {font_size}px; letter-spacing: 0; white-space: pre; }}",
        layout.font_family
    );
    svg.push_str("    .grid-line { stroke: #666666; stroke-width: 0.5; stroke-opacity: 0.5; }\n");
    svg.push_str("  </style>\n");
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"transparent\"/>\n");

    if layout.grid != GridType::None {
        svg.push_str("  <!-- Grid overlay -->\n");
        svg.push_str("  <g class=\"grid\">\n");

        if layout.grid.has_horizontal() {
            for i in 1..height {
                let y = i as f64 * cell_height;
                let _ = writeln!(
                    svg,
                    r#"    <line class="grid-line" x1="0" y1="{y}" x2="{svg_width}" y2="{y}" />"#
                );
            }
        }

        if layout.grid.has_vertical() {
            for i in 1..width {
                let x = i as f64 * cell_width;
                let _ = writeln!(
                    svg,
                    r#"    <line class="grid-line" x1="{x}" y1="0" x2="{x}" y2="{svg_height}" />"#
                );
            }
        }

        svg.push_str("  </g>\n");
    }

    let _ = writeln!(svg, r#"  <text x="0" y="{font_size}" class="ascii-text">"#);
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref().replace(' ', NBSP);
        let dy = if index == 0 { 0.0 } else { cell_height };
        let _ = writeln!(svg, r#"    <tspan x="0" dy="{dy}">{}</tspan>"#, escape_xml(&line));
    }
    svg.push_str("  </text>\n");
    svg.push_str("</svg>");

    svg
}

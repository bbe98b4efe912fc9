//! Cell geometry for monospace character grids.

use crate::Dimensions;

/// Font size used for rendered grids, in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Line height as a ratio of font size.
pub const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Glyph advance as a ratio of font size (typical for monospace faces).
pub const CHAR_WIDTH_RATIO: f64 = 0.6;

/// Number of glyphs in the sample used to measure cell width.
const SAMPLE_GLYPHS: usize = 10;

/// Measures the rendered width of a run of text.
pub trait GlyphMeasure {
    /// Width in pixels of `text` set at `font_size`.
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed per-glyph advance, for fonts with known metrics.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceAdvance {
    pub char_width_ratio: f64,
}

impl Default for MonospaceAdvance {
    fn default() -> Self {
        Self {
            char_width_ratio: CHAR_WIDTH_RATIO,
        }
    }
}

impl GlyphMeasure for MonospaceAdvance {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * self.char_width_ratio
    }
}

/// Pixel size of one grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub font_size: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl CellMetrics {
    /// Infer cell size by measuring a run of `X` glyphs.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use ascii_studio_core::sizing::{CellMetrics, MonospaceAdvance};
    ///
    /// let metrics = CellMetrics::measure(&MonospaceAdvance::default(), 10.0, 1.2);
    /// assert!((metrics.cell_width - 6.0).abs() < 1e-9);
    /// assert!((metrics.cell_height - 12.0).abs() < 1e-9);
    /// ```
    pub fn measure(measure: &dyn GlyphMeasure, font_size: f64, line_height_ratio: f64) -> Self {
        let sample = "X".repeat(SAMPLE_GLYPHS);
        Self {
            font_size,
            cell_width: measure.text_width(&sample, font_size) / SAMPLE_GLYPHS as f64,
            cell_height: font_size * line_height_ratio,
        }
    }

    /// Pixel size (width, height) of a grid.
    pub fn grid_size(&self, dimensions: Dimensions) -> (f64, f64) {
        (
            dimensions.width as f64 * self.cell_width,
            dimensions.height as f64 * self.cell_height,
        )
    }

    /// Pixel position of a cell's top-left corner.
    #[inline]
    pub fn cell_position(&self, col: usize, row: usize) -> (f64, f64) {
        (col as f64 * self.cell_width, row as f64 * self.cell_height)
    }
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self::measure(&MonospaceAdvance::default(), DEFAULT_FONT_SIZE, LINE_HEIGHT_RATIO)
    }
}

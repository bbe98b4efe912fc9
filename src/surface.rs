//! The mount point an animation renders into.
//!
//! A [`GridSurface`] holds the text of the frame currently on screen, the
//! style it is drawn with, and the grid overlay drawn on top of it. It is
//! shared between the animation host (which owns it), the active controller
//! (which writes frames into it) and the exporter (which reads it).

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::sizing::{DEFAULT_FONT_SIZE, LINE_HEIGHT_RATIO};
use crate::Dimensions;

/// Grid lines drawn over the character grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GridType {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl GridType {
    pub fn as_str(self) -> &'static str {
        match self {
            GridType::None => "none",
            GridType::Horizontal => "horizontal",
            GridType::Vertical => "vertical",
            GridType::Both => "both",
        }
    }

    #[inline]
    pub fn has_horizontal(self) -> bool {
        matches!(self, GridType::Horizontal | GridType::Both)
    }

    #[inline]
    pub fn has_vertical(self) -> bool {
        matches!(self, GridType::Vertical | GridType::Both)
    }
}

impl FromStr for GridType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" => Ok(GridType::None),
            "horizontal" => Ok(GridType::Horizontal),
            "vertical" => Ok(GridType::Vertical),
            "both" => Ok(GridType::Both),
            other => Err(format!("unknown grid type: {other}")),
        }
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text style of the rendered grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceStyle {
    pub font_family: String,
    /// Font size in pixels
    pub font_size: f64,
    /// Line height as a multiple of the font size
    pub line_height: f64,
    /// CSS color of the glyphs
    pub color: String,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            line_height: LINE_HEIGHT_RATIO,
            color: "white".to_string(),
        }
    }
}

/// Provides the newline-joined character grid of the current frame.
pub trait ContentSource {
    fn content(&self, dimensions: Dimensions) -> Option<String>;
}

/// Rendered grid text plus its style and overlay.
#[derive(Clone, Debug, Default)]
pub struct GridSurface {
    /// `None` until the first render
    text: Option<String>,
    overlay: GridType,
    style: SurfaceStyle,
}

impl GridSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: SurfaceStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Replace the displayed text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    #[inline]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Whether any text, blank included, has been rendered.
    #[inline]
    pub fn is_rendered(&self) -> bool {
        self.text.is_some()
    }

    pub fn set_overlay(&mut self, overlay: GridType) {
        self.overlay = overlay;
    }

    #[inline]
    pub fn overlay(&self) -> GridType {
        self.overlay
    }

    #[inline]
    pub fn style(&self) -> &SurfaceStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut SurfaceStyle {
        &mut self.style
    }

    /// Displayed text fitted to `dimensions`.
    ///
    /// Lines are truncated or padded with spaces to `width` columns and the
    /// grid is cut or extended to `height` rows, so a blank frame yields a
    /// grid of spaces. Returns `None` when nothing has been rendered yet or
    /// the grid is empty.
    pub fn content(&self, dimensions: Dimensions) -> Option<String> {
        let text = self.text.as_deref()?;
        if dimensions.is_empty() {
            return None;
        }

        let mut lines = text.lines();
        let mut rows = Vec::with_capacity(dimensions.height);
        for _ in 0..dimensions.height {
            let line = lines.next().unwrap_or("");
            let mut row: String = line.chars().take(dimensions.width).collect();
            let len = row.chars().count();
            row.extend(std::iter::repeat(' ').take(dimensions.width - len));
            rows.push(row);
        }
        Some(rows.join("\n"))
    }
}

/// Shared handle to a [`GridSurface`].
#[derive(Clone, Debug, Default)]
pub struct SurfaceHandle(Rc<RefCell<GridSurface>>);

impl SurfaceHandle {
    pub fn new(surface: GridSurface) -> Self {
        Self(Rc::new(RefCell::new(surface)))
    }

    pub fn borrow(&self) -> Ref<'_, GridSurface> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, GridSurface> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same surface.
    pub fn same_surface(&self, other: &SurfaceHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ContentSource for GridSurface {
    fn content(&self, dimensions: Dimensions) -> Option<String> {
        GridSurface::content(self, dimensions)
    }
}

impl ContentSource for SurfaceHandle {
    fn content(&self, dimensions: Dimensions) -> Option<String> {
        self.borrow().content(dimensions)
    }
}

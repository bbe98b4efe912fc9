//! Rasterization of the rendered grid.
//!
//! Capture goes through the [`Rasterizer`] trait so the backend can be
//! swapped without touching export logic. The crate ships a bitmap-font
//! backend ([`BitmapRasterizer`]) and, with the `web` feature, a canvas
//! backend.

use std::io::Cursor;

use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, LATIN_FONTS, MISC_FONTS,
};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::color::{parse_color, simplify_color};
use crate::error::ExportError;
use crate::surface::{GridSurface, GridType};
use crate::Dimensions;

/// Glyph cell width of the bitmap font, in pixels at scale 1.
pub const GLYPH_WIDTH: u32 = 8;
/// Glyph cell height of the bitmap font, in pixels at scale 1.
pub const GLYPH_HEIGHT: u32 = 16;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Snapshot of everything drawn in the capture region: the grid text and
/// its overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureScene {
    pub lines: Vec<String>,
    pub dimensions: Dimensions,
    pub overlay: GridType,
    /// CSS color of the glyphs
    pub color: String,
    pub font_family: String,
    pub font_size: f64,
    pub line_height: f64,
}

impl CaptureScene {
    /// Snapshot a surface, fitted to `dimensions`.
    ///
    /// Returns `None` when the surface has no content to capture.
    pub fn from_surface(surface: &GridSurface, dimensions: Dimensions) -> Option<Self> {
        let content = surface.content(dimensions)?;
        let style = surface.style();
        Some(Self {
            lines: content.split('\n').map(str::to_string).collect(),
            dimensions,
            overlay: surface.overlay(),
            color: style.color.clone(),
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            line_height: style.line_height,
        })
    }

    /// Rewrite style values rasterizers cannot parse.
    ///
    /// CSS `color()` functions are replaced with `currentColor`, which
    /// backends resolve to their default foreground.
    pub fn prepare(&mut self) {
        let simplified = simplify_color(&self.color);
        if simplified != self.color.as_str() {
            log::debug!("Replacing unsupported color '{}' before capture", self.color);
            self.color = simplified.into_owned();
        }
    }
}

/// Renders a scene into an RGBA image at an integer scale factor.
///
/// Implementations must leave uncovered pixels fully transparent.
pub trait Rasterizer {
    fn capture(&self, scene: &CaptureScene, scale: u32) -> Result<RgbaImage, ExportError>;
}

/// Rasterizer drawing glyphs from the built-in 8x8 bitmap font, doubled
/// vertically into 8x16 cells.
///
/// ## Example
///
/// ```rust
/// use ascii_studio_core::render::{BitmapRasterizer, CaptureScene, Rasterizer};
/// use ascii_studio_core::{Dimensions, GridSurface};
///
/// let mut surface = GridSurface::new();
/// surface.set_text("AB\nCD");
/// let scene = CaptureScene::from_surface(&surface, Dimensions::new(2, 2)).unwrap();
///
/// let image = BitmapRasterizer::default().capture(&scene, 2).unwrap();
/// assert_eq!(image.dimensions(), (32, 64));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BitmapRasterizer {
    /// Glyph color used for `currentColor` and unparseable colors
    pub foreground: Rgba<u8>,
    pub grid_color: Rgba<u8>,
}

impl Default for BitmapRasterizer {
    fn default() -> Self {
        Self {
            foreground: Rgba([255, 255, 255, 255]),
            // #666666 at 50% opacity
            grid_color: Rgba([102, 102, 102, 128]),
        }
    }
}

impl BitmapRasterizer {
    fn resolve_color(&self, css: &str) -> Rgba<u8> {
        parse_color(css)
            .map(|(r, g, b)| Rgba([r, g, b, 255]))
            .unwrap_or(self.foreground)
    }

    fn fill_rect(image: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
        let x_end = (x + w).min(image.width());
        let y_end = (y + h).min(image.height());
        for py in y..y_end {
            for px in x..x_end {
                image.put_pixel(px, py, color);
            }
        }
    }

    fn draw_overlay(&self, image: &mut RgbaImage, scene: &CaptureScene, scale: u32) {
        let cell_w = GLYPH_WIDTH * scale;
        let cell_h = GLYPH_HEIGHT * scale;
        let (width, height) = image.dimensions();

        if scene.overlay.has_horizontal() {
            for row in 1..scene.dimensions.height as u32 {
                Self::fill_rect(image, 0, row * cell_h, width, scale, self.grid_color);
            }
        }
        if scene.overlay.has_vertical() {
            for col in 1..scene.dimensions.width as u32 {
                Self::fill_rect(image, col * cell_w, 0, scale, height, self.grid_color);
            }
        }
    }
}

impl Rasterizer for BitmapRasterizer {
    fn capture(&self, scene: &CaptureScene, scale: u32) -> Result<RgbaImage, ExportError> {
        let scale = scale.max(1);
        let width = scene.dimensions.width as u32 * GLYPH_WIDTH * scale;
        let height = scene.dimensions.height as u32 * GLYPH_HEIGHT * scale;
        if width == 0 || height == 0 {
            return Err(ExportError::Capture("nothing to capture in an empty grid".into()));
        }

        let mut image = RgbaImage::from_pixel(width, height, TRANSPARENT);
        self.draw_overlay(&mut image, scene, scale);

        let color = self.resolve_color(&scene.color);
        for (row, line) in scene.lines.iter().enumerate().take(scene.dimensions.height) {
            for (col, ch) in line.chars().enumerate().take(scene.dimensions.width) {
                let Some(bitmap) = glyph_bitmap(ch) else {
                    continue;
                };
                let origin_x = col as u32 * GLYPH_WIDTH * scale;
                let origin_y = row as u32 * GLYPH_HEIGHT * scale;

                for (py, bits) in bitmap.iter().enumerate() {
                    for px in 0..GLYPH_WIDTH {
                        // font8x8 stores the leftmost pixel in the least significant bit
                        if (bits >> px) & 1 == 1 {
                            Self::fill_rect(
                                &mut image,
                                origin_x + px * scale,
                                origin_y + py as u32 * scale,
                                scale,
                                scale,
                                color,
                            );
                        }
                    }
                }
            }
        }

        Ok(image)
    }
}

/// 8x16 bitmap for `ch`, or `None` for blanks and unknown glyphs.
fn glyph_bitmap(ch: char) -> Option<[u8; 16]> {
    fn expand(glyph: [u8; 8]) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (idx, row) in glyph.iter().enumerate() {
            out[idx * 2] = *row;
            out[idx * 2 + 1] = *row;
        }
        out
    }

    if ch.is_whitespace() {
        return None;
    }
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| MISC_FONTS.get(ch))
        .map(expand)
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Web-specific rasterization backed by an offscreen canvas.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use crate::color::CURRENT_COLOR;
    use crate::sizing::CHAR_WIDTH_RATIO;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    /// Draws the scene with the browser's text renderer and reads the
    /// pixels back.
    #[derive(Clone, Debug)]
    pub struct CanvasRasterizer {
        /// Glyph advance as a ratio of font size
        pub char_width_ratio: f64,
        /// Color used for `currentColor`
        pub foreground: String,
    }

    impl Default for CanvasRasterizer {
        fn default() -> Self {
            Self {
                char_width_ratio: CHAR_WIDTH_RATIO,
                foreground: "#ffffff".to_string(),
            }
        }
    }

    fn create_canvas() -> Result<HtmlCanvasElement, String> {
        let window = web_sys::window().ok_or("No window available")?;
        let document = window.document().ok_or("No document available")?;
        let canvas = document
            .create_element("canvas")
            .map_err(|_| "Failed to create canvas element")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "Failed to cast element to HtmlCanvasElement")?;
        Ok(canvas)
    }

    impl CanvasRasterizer {
        fn draw(&self, scene: &CaptureScene, scale: u32) -> Result<RgbaImage, String> {
            let scale = scale.max(1) as f64;
            let cell_width = scene.font_size * self.char_width_ratio;
            let cell_height = scene.font_size * scene.line_height;
            let width = scene.dimensions.width as f64 * cell_width;
            let height = scene.dimensions.height as f64 * cell_height;
            let pixel_width = (width * scale).ceil() as u32;
            let pixel_height = (height * scale).ceil() as u32;
            if pixel_width == 0 || pixel_height == 0 {
                return Err("nothing to capture in an empty grid".to_string());
            }

            let canvas = create_canvas()?;
            canvas.set_width(pixel_width);
            canvas.set_height(pixel_height);

            let ctx = canvas
                .get_context("2d")
                .map_err(|_| "Failed to get 2d context")?
                .ok_or("No 2d context available")?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

            ctx.scale(scale, scale).map_err(|_| "Failed to scale context")?;
            ctx.clear_rect(0.0, 0.0, width, height);

            if scene.overlay != GridType::None {
                ctx.set_stroke_style_str("rgba(102,102,102,0.5)");
                ctx.set_line_width(0.5);
                ctx.begin_path();
                if scene.overlay.has_horizontal() {
                    for row in 1..scene.dimensions.height {
                        let y = row as f64 * cell_height;
                        ctx.move_to(0.0, y);
                        ctx.line_to(width, y);
                    }
                }
                if scene.overlay.has_vertical() {
                    for col in 1..scene.dimensions.width {
                        let x = col as f64 * cell_width;
                        ctx.move_to(x, 0.0);
                        ctx.line_to(x, height);
                    }
                }
                ctx.stroke();
            }

            let color = if scene.color == CURRENT_COLOR {
                self.foreground.as_str()
            } else {
                scene.color.as_str()
            };
            ctx.set_font(&format!("{:.2}px {}", scene.font_size, scene.font_family));
            ctx.set_text_baseline("top");
            ctx.set_fill_style_str(color);
            for (row, line) in scene.lines.iter().enumerate() {
                ctx.fill_text(line, 0.0, row as f64 * cell_height)
                    .map_err(|_| "Failed to fill text")?;
            }

            let data = ctx
                .get_image_data(0.0, 0.0, pixel_width as f64, pixel_height as f64)
                .map_err(|_| "Failed to read canvas pixels")?
                .data();
            RgbaImage::from_raw(pixel_width, pixel_height, data.0)
                .ok_or_else(|| "Canvas pixel buffer has unexpected size".to_string())
        }
    }

    impl Rasterizer for CanvasRasterizer {
        fn capture(&self, scene: &CaptureScene, scale: u32) -> Result<RgbaImage, ExportError> {
            self.draw(scene, scale).map_err(ExportError::Capture)
        }
    }
}

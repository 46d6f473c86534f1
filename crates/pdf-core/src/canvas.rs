//! Drawing surface abstraction and page geometry

use crate::{BuiltinFont, Color, FontWeight, Result};

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// A4 portrait at 72 dpi
pub const A4: PageSize = PageSize {
    width: 595.28,
    height: 841.89,
};

impl PageSize {
    /// Whether a point lies on the page (edges included)
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x <= self.width && p.y <= self.height
    }
}

/// A point in bottom-left-origin page space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle; `(x, y)` is the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Identifies a font family registered on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontFamilyId(usize);

impl FontFamilyId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn regular(self) -> FontHandle {
        self.with_weight(FontWeight::Regular)
    }

    pub fn bold(self) -> FontHandle {
        self.with_weight(FontWeight::Bold)
    }

    pub fn with_weight(self, weight: FontWeight) -> FontHandle {
        FontHandle {
            family: self,
            weight,
        }
    }
}

/// A concrete font variant to draw with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle {
    pub family: FontFamilyId,
    pub weight: FontWeight,
}

/// Where a font family's glyph data comes from
#[derive(Debug, Clone)]
pub enum FontSource {
    /// One of the standard fonts every PDF viewer provides
    Builtin(BuiltinFont),
    /// TrueType data to embed; bold falls back to regular when absent
    TrueType {
        name: String,
        regular: Vec<u8>,
        bold: Option<Vec<u8>>,
    },
}

/// Stroke settings for lines and rectangle borders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f64,
    pub color: Color,
}

impl LineStyle {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            color: Color::black(),
        }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// How a native text run is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPaint {
    pub size: f32,
    pub font: FontHandle,
    pub color: Color,
    /// Counter-clockwise rotation in degrees around the text origin
    pub angle: f64,
}

impl TextPaint {
    pub fn new(size: f32, font: FontHandle) -> Self {
        Self {
            size,
            font,
            color: Color::black(),
            angle: 0.0,
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn rotated(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }
}

/// A multi-page, bottom-left-origin drawing surface
///
/// Pages are 1-indexed and append-only. Draws outside the page are allowed;
/// clipping is the caller's job.
pub trait Canvas {
    /// Append a page and return its number
    fn new_page(&mut self, width: f64, height: f64) -> Result<usize>;

    fn page_count(&self) -> usize;

    /// Make a font family available for `draw_text`
    fn register_font(&mut self, source: FontSource) -> Result<FontFamilyId>;

    /// Advance width of `text` in points
    fn text_width(&self, text: &str, font: FontHandle, size: f32) -> f64;

    fn draw_line(&mut self, page: usize, from: Point, to: Point, style: LineStyle) -> Result<()>;

    /// Stroke (`border_only`) or fill a rectangle
    fn draw_rect(&mut self, page: usize, rect: Rect, border_only: bool, style: LineStyle)
        -> Result<()>;

    /// Draw a native text run with its baseline starting at `at`
    fn draw_text(&mut self, page: usize, text: &str, at: Point, paint: TextPaint) -> Result<()>;

    /// Draw PNG data scaled into `rect`, rotated by `angle` degrees around its bottom-left corner
    fn draw_image(&mut self, page: usize, png: &[u8], rect: Rect, angle: f64) -> Result<()>;

    /// Finalize the document and return the serialized bytes
    fn to_bytes(&mut self) -> Result<Vec<u8>>;
}

/// Bottom edge for a raster text bitmap standing in for native text at `nominal_y`
///
/// The bitmap's top is placed where the native run's ascender would reach.
pub fn raster_baseline_y(nominal_y: f64, bitmap_height: f64, font_size: f64) -> f64 {
    nominal_y - bitmap_height + font_size * 0.8
}

//! PDF Core - fixed-layout PDF canvas
//!
//! This crate provides functionality for:
//! - Creating multi-page documents of a fixed page size
//! - Drawing lines, rectangles, native text and raster images
//! - Embedding TrueType fonts, with built-in Times as a fallback
//! - A [`Canvas`] trait so layout code can be exercised without a real PDF
//!
//! All coordinates are in points with the origin at the bottom-left of the page.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{BuiltinFont, Canvas, FontSource, PdfDocument, Point, TextPaint, A4};
//!
//! let mut doc = PdfDocument::new();
//! let times = doc.register_font(FontSource::Builtin(BuiltinFont::Times))?;
//! let page = doc.new_page(A4.width, A4.height)?;
//! doc.draw_text(page, "Hello", Point::new(72.0, 770.0), TextPaint::new(12.0, times.regular()))?;
//! let bytes = doc.to_bytes()?;
//! ```

mod builtin;
mod canvas;
mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use builtin::BuiltinFont;
pub use canvas::{
    raster_baseline_y, Canvas, FontFamilyId, FontHandle, FontSource, LineStyle, PageSize, Point,
    Rect, TextPaint, A4,
};
pub use document::{Color, PdfDocument};
pub use font::{FontData, FontFamily, FontWeight};
pub use image::ImageXObject;
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Invalid page size: {0} x {1}")]
    InvalidPageSize(f64, f64),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF structure error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

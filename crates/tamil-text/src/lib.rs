//! Tamil Text - complex-script text handling for PDF reports
//!
//! This crate provides:
//! - Complex-script detection by Unicode block
//! - Measurement-driven word wrapping and frame clipping
//! - Supersampled rasterization of shaped text into PNG bitmaps, memoized
//! - Report date formatting ("From 01-05 to 31-05")
//!
//! # Example
//!
//! ```ignore
//! use tamil_text::{wrap, ComplexScript, FontRasterBackend, GlyphRasterizer, RasterOptions};
//!
//! // Word wrapping against any measure
//! let lines = wrap("North Car Street", |s, size| s.len() as f32 * size * 0.5, 10.0, 60.0);
//!
//! // Rasterizing a Tamil run
//! let backend = FontRasterBackend::new(ComplexScript::Tamil, font_bytes, None)?;
//! let mut rasterizer = GlyphRasterizer::new(Box::new(backend));
//! let run = rasterizer.render("பாளையங்கோட்டை", &RasterOptions::new(10.0))?;
//! ```

mod backend;
mod formatter;
mod raster;
mod script;
mod wrap;

pub use backend::FontRasterBackend;
pub use raster::{
    CacheStats, GlyphRasterizer, GlyphWeight, LineMetrics, RasterBackend, RasterOptions,
    RasterResult, DEFAULT_SUPERSAMPLE,
};
pub use script::{
    contains_complex_script, contains_tamil, detect_complex_script, is_tamil_char, script_of,
    scripts_in, ComplexScript,
};
pub use wrap::{max_lines, truncate_to_frame, wrap, FrameFit};

// Re-export commonly used formatting functions
pub use formatter::{
    file_date_stamp, format_date_range, format_day_month, format_display_date, format_iso_range,
    format_tamil_month_year, parse_iso_date, tamil_month_name,
};

pub use chrono::NaiveDate;

use thiserror::Error;

/// Errors that can occur during complex-script text processing
#[derive(Debug, Error)]
pub enum TamilTextError {
    #[error("Nothing to rasterize: text is empty")]
    EmptyText,

    #[error("No font loaded for complex-script text")]
    FontNotReady,

    #[error("Script not supported by the loaded font: {0:?}")]
    UnsupportedScript(ComplexScript),

    #[error("Invalid font size: {0}")]
    InvalidFontSize(f32),

    #[error("Frame of height {max_height} is shorter than one line ({line_height})")]
    FrameTooSmall { line_height: f32, max_height: f32 },

    #[error("Invalid font: {0}")]
    InvalidFont(String),

    #[error("Failed to paint glyphs: {0}")]
    Paint(String),

    #[error("Failed to encode bitmap: {0}")]
    Encode(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Result type for complex-script text operations
pub type Result<T> = std::result::Result<T, TamilTextError>;

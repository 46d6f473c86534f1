//! Report - fixed-layout PDF reports for a church pastorate
//!
//! This crate provides:
//! - Report data model and JSON parsing (families, members, register rows)
//! - Configuration with metadata defaults
//! - Tiered font asset loading with a built-in fallback
//! - Script-aware font selection (Latin runs drawn natively, Tamil runs rasterized)
//! - Family block layout: template offsets, member rows, rotated headers
//! - One report composer driven by a renderer strategy per report type
//! - Output file naming and view/print/download actions
//!
//! # Example
//!
//! ```ignore
//! use report::{parse_family_payload, AssetLoader, FamilyBlockRenderer, OutputAction,
//!     ReportComposer, ReportConfig};
//!
//! let config = ReportConfig::from_json(config_json)?;
//! let loader = AssetLoader::standard(&config, "/srv/app");
//! let mut composer = ReportComposer::new(config.clone(), &loader);
//!
//! let payload = parse_family_payload(payload_json)?;
//! let renderer = FamilyBlockRenderer::birthday(&config);
//! let output = composer.render(&renderer, &payload.records, &payload.church,
//!     &payload.options, OutputAction::Download)?;
//! output.write_to("reports")?;
//! ```

pub mod assets;
pub mod composer;
mod config;
pub mod layout;
pub mod output;
pub mod parser;
pub mod renderers;
mod schema;
pub mod selector;
pub mod templates;

pub use assets::{
    AbsoluteAssets, AssetLoader, AssetSource, AssetTier, BundledAssets, FontLoad, FontRequest,
    RelativeAssets,
};
pub use composer::{
    ComposeSummary, DrawContext, PageFlow, Placement, RecordRenderer, ReportComposer, TextStyle,
};
pub use config::{FontConfig, FontFiles, MetadataDefaults, ReportConfig};
pub use layout::{
    clamp_members, compute_dynamic_line_y, compute_member_row_y, compute_positions,
    place_rotated, rotate_point, LayoutTemplate, PositionSet, RotatedPlacement,
};
pub use output::{file_name, OutputAction, ReportKind, ReportOutput};
pub use parser::{parse_family_payload, parse_register_payload, ReportPayload};
pub use renderers::{FamilyBlockRenderer, RegisterRenderer};
pub use schema::*;
pub use selector::{classify, raster_weight, should_rasterize, FontTable, RunStyle};

use thiserror::Error;

/// Errors that can occur during report composition
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No records to report")]
    EmptyInput,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown output action: {0} (expected view, print or download)")]
    InvalidAction(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Rasterization failed: {0}")]
    Raster(#[from] tamil_text::TamilTextError),

    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

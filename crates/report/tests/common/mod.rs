//! Shared fixtures: a recording canvas, a fake raster backend and sample records

#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use pdf_core::{
    Canvas, FontFamilyId, FontHandle, FontSource, LineStyle, PdfError, Point, Rect, TextPaint,
};
use report::{
    AssetLoader, ChurchInfo, FamilyGroup, FamilyRecord, MemberRecord, RegisterRow,
    ReportComposer, ReportConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tamil_text::{ComplexScript, GlyphRasterizer, GlyphWeight, LineMetrics, RasterBackend};

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        page: usize,
        from: Point,
        to: Point,
    },
    Rect {
        page: usize,
        rect: Rect,
        border_only: bool,
    },
    Text {
        page: usize,
        text: String,
        at: Point,
        paint: TextPaint,
    },
    Image {
        page: usize,
        rect: Rect,
        angle: f64,
    },
}

impl DrawOp {
    pub fn page(&self) -> usize {
        match self {
            DrawOp::Line { page, .. }
            | DrawOp::Rect { page, .. }
            | DrawOp::Text { page, .. }
            | DrawOp::Image { page, .. } => *page,
        }
    }
}

/// Canvas that records every draw instead of producing a document
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub pages: usize,
    pub fonts: Vec<FontSource>,
    pub ops: Vec<DrawOp>,
    /// Text draws with this font fail
    pub failing_font: Option<FontHandle>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<(usize, &str, &TextPaint)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    page, text, paint, ..
                } => Some((*page, text.as_str(), paint)),
                _ => None,
            })
            .collect()
    }

    pub fn texts_on(&self, page: usize) -> Vec<&str> {
        self.texts()
            .into_iter()
            .filter(|(p, _, _)| *p == page)
            .map(|(_, text, _)| text)
            .collect()
    }

    pub fn find_text(&self, needle: &str) -> Option<(usize, &str, &TextPaint)> {
        self.texts().into_iter().find(|(_, text, _)| text.contains(needle))
    }

    pub fn images(&self) -> Vec<&DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn new_page(&mut self, _width: f64, _height: f64) -> pdf_core::Result<usize> {
        self.pages += 1;
        Ok(self.pages)
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn register_font(&mut self, source: FontSource) -> pdf_core::Result<FontFamilyId> {
        self.fonts.push(source);
        Ok(FontFamilyId::new(self.fonts.len() - 1))
    }

    fn text_width(&self, text: &str, _font: FontHandle, size: f32) -> f64 {
        text.chars().count() as f64 * size as f64 * 0.5
    }

    fn draw_line(
        &mut self,
        page: usize,
        from: Point,
        to: Point,
        _style: LineStyle,
    ) -> pdf_core::Result<()> {
        self.ops.push(DrawOp::Line { page, from, to });
        Ok(())
    }

    fn draw_rect(
        &mut self,
        page: usize,
        rect: Rect,
        border_only: bool,
        _style: LineStyle,
    ) -> pdf_core::Result<()> {
        self.ops.push(DrawOp::Rect {
            page,
            rect,
            border_only,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        page: usize,
        text: &str,
        at: Point,
        paint: TextPaint,
    ) -> pdf_core::Result<()> {
        if self.failing_font == Some(paint.font) {
            return Err(PdfError::FontNotFound(format!("{:?}", paint.font)));
        }
        self.ops.push(DrawOp::Text {
            page,
            text: text.to_string(),
            at,
            paint,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        page: usize,
        _png: &[u8],
        rect: Rect,
        angle: f64,
    ) -> pdf_core::Result<()> {
        self.ops.push(DrawOp::Image { page, rect, angle });
        Ok(())
    }

    fn to_bytes(&mut self) -> pdf_core::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Tamil backend with fixed advances that counts paint calls
pub struct CountingBackend {
    paints: Arc<AtomicUsize>,
}

impl CountingBackend {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let paints = Arc::new(AtomicUsize::new(0));
        (
            Self {
                paints: Arc::clone(&paints),
            },
            paints,
        )
    }
}

impl RasterBackend for CountingBackend {
    fn script(&self) -> ComplexScript {
        ComplexScript::Tamil
    }

    fn measure(&self, text: &str, font_size: f32, _weight: GlyphWeight) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    fn line_metrics(&self, font_size: f32, _weight: GlyphWeight) -> LineMetrics {
        LineMetrics {
            ascent: font_size * 0.9,
            descent: font_size * 0.3,
        }
    }

    fn paint(
        &self,
        target: &mut RgbaImage,
        _text: &str,
        origin: (f32, f32),
        _font_size: f32,
        _weight: GlyphWeight,
        color: [u8; 3],
    ) -> tamil_text::Result<()> {
        self.paints.fetch_add(1, Ordering::SeqCst);
        let y = (origin.1 as u32).min(target.height().saturating_sub(1));
        target.put_pixel(0, y, Rgba([color[0], color[1], color[2], 255]));
        Ok(())
    }
}

/// Composer with built-in fonts and the counting backend
pub fn composer() -> (ReportComposer, Arc<AtomicUsize>) {
    composer_with(ReportConfig::default())
}

pub fn composer_with(config: ReportConfig) -> (ReportComposer, Arc<AtomicUsize>) {
    let (backend, paints) = CountingBackend::new();
    let composer = ReportComposer::new(config, &AssetLoader::new())
        .with_rasterizer(GlyphRasterizer::new(Box::new(backend)));
    (composer, paints)
}

pub fn church() -> ChurchInfo {
    ChurchInfo {
        name: "CSI St. Paul's Church".into(),
        pastorate_name: Some("Palayamkottai".into()),
        ..Default::default()
    }
}

pub fn member(id: &str, name: &str) -> MemberRecord {
    MemberRecord {
        member_id: id.into(),
        name: name.into(),
        relation: "Son".into(),
        sex: "M".into(),
        age: Some(30),
        ..Default::default()
    }
}

pub fn family(id: &str, head: &str, members: Vec<MemberRecord>) -> FamilyGroup {
    FamilyGroup {
        family: FamilyRecord {
            family_id: id.into(),
            head_name: head.into(),
            phone: "9876543210".into(),
            address: "12, North Street, Palayamkottai".into(),
            area_id: "1".into(),
            area_name: "Palayamkottai".into(),
            area_code: "PLK".into(),
            family_number_suffix: id.into(),
            ..Default::default()
        },
        members,
        celebrants: Vec::new(),
    }
}

pub fn register_rows(families: usize, per_family: usize) -> Vec<RegisterRow> {
    (1..=families)
        .flat_map(|f| {
            (1..=per_family).map(move |m| RegisterRow {
                member: member(&format!("{f}-{m}"), &format!("Member {f}-{m}")),
                family_id: f.to_string(),
                family_number: f.to_string(),
                head_name: format!("Head {f}"),
                area_id: "1".into(),
                area_name: "Palayamkottai".into(),
                area_code: "PLK".into(),
            })
        })
        .collect()
}

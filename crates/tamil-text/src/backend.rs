//! Font-backed raster backend: rustybuzz shapes, ab_glyph paints

use crate::raster::{GlyphWeight, LineMetrics, RasterBackend};
use crate::script::ComplexScript;
use crate::{Result, TamilTextError};
use ab_glyph::{point, Font, FontVec, GlyphId, PxScale};
use image::{Rgba, RgbaImage};
use rustybuzz::{Face, UnicodeBuffer};

/// One weight of a script font
struct FontFace {
    data: Vec<u8>,
    outlines: FontVec,
    units_per_em: f32,
}

impl FontFace {
    fn parse(data: Vec<u8>) -> Result<Self> {
        let units_per_em = Face::from_slice(&data, 0)
            .map(|face| face.units_per_em().max(1) as f32)
            .ok_or_else(|| TamilTextError::InvalidFont("font cannot be shaped".to_string()))?;
        let outlines = FontVec::try_from_vec(data.clone())
            .map_err(|e| TamilTextError::InvalidFont(e.to_string()))?;
        Ok(Self {
            data,
            outlines,
            units_per_em,
        })
    }

    /// Shaped glyphs as (glyph id, x, y offset from pen, advance) in `font_size` units
    fn shape(&self, text: &str, font_size: f32) -> Vec<ShapedGlyph> {
        let Some(face) = Face::from_slice(&self.data, 0) else {
            return Vec::new();
        };
        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&face, &[], buffer);

        let scale = font_size / self.units_per_em;
        output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                id: GlyphId(info.glyph_id as u16),
                x_offset: pos.x_offset as f32 * scale,
                y_offset: pos.y_offset as f32 * scale,
                advance: pos.x_advance as f32 * scale,
            })
            .collect()
    }

    /// ab_glyph scales by ascent-to-descent height, not by em
    fn px_scale(&self, font_size: f32) -> PxScale {
        let upem = self.outlines.units_per_em().unwrap_or(self.units_per_em);
        PxScale::from(font_size * self.outlines.height_unscaled() / upem)
    }
}

struct ShapedGlyph {
    id: GlyphId,
    x_offset: f32,
    y_offset: f32,
    advance: f32,
}

/// Raster backend over a TrueType/OpenType font with a regular and optional bold face
pub struct FontRasterBackend {
    script: ComplexScript,
    regular: FontFace,
    bold: Option<FontFace>,
}

impl FontRasterBackend {
    /// Parse the font faces
    ///
    /// Bold runs fall back to the regular face when no bold font is given.
    pub fn new(script: ComplexScript, regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self> {
        let regular = FontFace::parse(regular)?;
        let bold = bold.map(FontFace::parse).transpose()?;
        log::debug!(
            "{} raster font ready (bold face: {})",
            script.tag(),
            bold.is_some()
        );
        Ok(Self {
            script,
            regular,
            bold,
        })
    }

    fn face(&self, weight: GlyphWeight) -> &FontFace {
        match weight {
            GlyphWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            GlyphWeight::Regular => &self.regular,
        }
    }
}

impl RasterBackend for FontRasterBackend {
    fn script(&self) -> ComplexScript {
        self.script
    }

    fn measure(&self, text: &str, font_size: f32, weight: GlyphWeight) -> f32 {
        self.face(weight)
            .shape(text, font_size)
            .iter()
            .map(|glyph| glyph.advance)
            .sum()
    }

    fn line_metrics(&self, font_size: f32, weight: GlyphWeight) -> LineMetrics {
        let face = self.face(weight);
        let upem = face.outlines.units_per_em().unwrap_or(face.units_per_em);
        LineMetrics {
            ascent: face.outlines.ascent_unscaled() / upem * font_size,
            descent: -face.outlines.descent_unscaled() / upem * font_size,
        }
    }

    fn paint(
        &self,
        target: &mut RgbaImage,
        text: &str,
        origin: (f32, f32),
        font_size: f32,
        weight: GlyphWeight,
        color: [u8; 3],
    ) -> Result<()> {
        let face = self.face(weight);
        let scale = face.px_scale(font_size);
        let (width, height) = target.dimensions();
        let mut pen_x = origin.0;

        for glyph in face.shape(text, font_size) {
            let position = point(pen_x + glyph.x_offset, origin.1 - glyph.y_offset);
            pen_x += glyph.advance;

            let Some(outlined) = face
                .outlines
                .outline_glyph(glyph.id.with_scale_and_position(scale, position))
            else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
                    return;
                }
                let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = target.get_pixel_mut(x as u32, y as u32);
                // overlapping marks keep the strongest coverage
                if alpha > pixel[3] {
                    *pixel = Rgba([color[0], color[1], color[2], alpha]);
                }
            });
        }

        Ok(())
    }
}

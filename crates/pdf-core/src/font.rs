//! Font handling for PDF documents

use crate::{BuiltinFont, FontSource, PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::{HashMap, HashSet};

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Glyph id and horizontal advance (font units) for one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GlyphMetric {
    gid: u16,
    advance: u16,
}

/// Parsed TrueType font ready for embedding
///
/// Glyph metrics are read once at load time so the raw bytes do not need
/// to outlive a borrowed `ttf_parser::Face`.
#[derive(Debug, Clone)]
pub struct FontData {
    /// Font name/identifier, used as the PDF BaseFont
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters drawn with this font
    pub used_chars: HashSet<char>,
    glyphs: HashMap<char, GlyphMetric>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

/// PDF objects generated for font embedding
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

impl FontData {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e:?}")))?;

        let mut codepoints = Vec::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if subtable.is_unicode() {
                    subtable.codepoints(|cp| codepoints.push(cp));
                }
            }
        }

        let mut glyphs = HashMap::with_capacity(codepoints.len());
        for c in codepoints.into_iter().filter_map(char::from_u32) {
            if let Some(glyph_id) = face.glyph_index(c) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                glyphs.insert(
                    c,
                    GlyphMetric {
                        gid: glyph_id.0,
                        advance,
                    },
                );
            }
        }

        Ok(Self {
            name: sanitize_font_name(name),
            ttf_data: ttf_data.to_vec(),
            used_chars: HashSet::new(),
            glyphs,
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
        })
    }

    /// Add characters to the used set
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.glyphs.get(&c).map(|g| g.gid)
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Get glyph advance width
    pub fn glyph_advance(&self, c: char) -> Option<u16> {
        self.glyphs.get(&c).map(|g| g.advance)
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// Calculate text width in font units
    pub fn text_width(&self, text: &str) -> u32 {
        text.chars()
            .filter_map(|c| self.glyph_advance(c))
            .map(|w| w as u32)
            .sum()
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f32 {
        let units_per_em = self.units_per_em.max(1) as f32;
        (self.text_width(text) as f32 / units_per_em) * font_size
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> FontObjects {
        let font_name = Object::Name(self.name.clone().into_bytes());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_stream = Stream::new(Dictionary::new(), tounicode_content.into_bytes());

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let scale = 1000.0 / self.units_per_em.max(1) as f32;
        let ascent = (self.ascender as f32 * scale) as i64;
        let descent = (self.descender as f32 * scale) as i64;

        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()), // Symbolic font
            (
                "FontBBox",
                vec![0.into(), descent.into(), 1000.into(), ascent.into()].into(),
            ),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", ascent.into()),
            ("StemV", 80.into()),
        ]);

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
        ]);

        // DescendantFonts, FontDescriptor, FontFile2 and ToUnicode are linked when embedding
        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        }
    }

    /// Encode text as hex glyph ids for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 4 + 2);
        result.push('<');
        for c in text.chars() {
            let gid = self.glyph_id(c).unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Generate /W array for the glyphs actually used, in 1/1000 em
    fn generate_widths_array(&self) -> Vec<Object> {
        let scale = 1000.0 / self.units_per_em.max(1) as f32;
        let mut used: Vec<GlyphMetric> = self
            .used_chars
            .iter()
            .filter_map(|c| self.glyphs.get(c).copied())
            .collect();
        used.sort_by_key(|g| g.gid);
        used.dedup_by_key(|g| g.gid);

        let mut widths = Vec::with_capacity(used.len() * 2);
        for glyph in used {
            widths.push((glyph.gid as i64).into());
            widths.push(vec![((glyph.advance as f32 * scale).round() as i64).into()].into());
        }
        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        let mut chars: Vec<char> = self.used_chars.iter().copied().collect();
        chars.sort_unstable();

        // bfchar sections are limited to 100 entries
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let mut units = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }
}

/// PDF names may not contain whitespace or delimiters
fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// A registered font family: built-in Type1 or embedded TrueType
#[derive(Debug, Clone)]
pub enum FontFamily {
    Builtin(BuiltinFont),
    TrueType {
        regular: FontData,
        bold: Option<FontData>,
    },
}

impl FontFamily {
    /// Parse a font source into a family
    pub fn from_source(source: FontSource) -> Result<Self> {
        match source {
            FontSource::Builtin(font) => Ok(FontFamily::Builtin(font)),
            FontSource::TrueType {
                name,
                regular,
                bold,
            } => {
                let regular = FontData::from_ttf(&format!("{name}-Regular"), &regular)?;
                let bold = bold
                    .map(|data| FontData::from_ttf(&format!("{name}-Bold"), &data))
                    .transpose()?;
                Ok(FontFamily::TrueType { regular, bold })
            }
        }
    }

    /// TrueType variant for a weight; bold falls back to regular
    pub fn variant(&self, weight: FontWeight) -> Option<&FontData> {
        match self {
            FontFamily::Builtin(_) => None,
            FontFamily::TrueType { regular, bold } => match weight {
                FontWeight::Bold => bold.as_ref().or(Some(regular)),
                FontWeight::Regular => Some(regular),
            },
        }
    }

    pub fn variant_mut(&mut self, weight: FontWeight) -> Option<&mut FontData> {
        match self {
            FontFamily::Builtin(_) => None,
            FontFamily::TrueType { regular, bold } => match weight {
                FontWeight::Bold if bold.is_some() => bold.as_mut(),
                _ => Some(regular),
            },
        }
    }

    /// Weight actually embedded for a requested weight
    pub fn resolved_weight(&self, weight: FontWeight) -> FontWeight {
        match self {
            FontFamily::TrueType { bold: None, .. } => FontWeight::Regular,
            _ => weight,
        }
    }

    /// Text width in points
    pub fn text_width_points(&self, weight: FontWeight, text: &str, font_size: f32) -> f32 {
        match self {
            FontFamily::Builtin(font) => font.text_width_points(weight, text, font_size),
            FontFamily::TrueType { .. } => self
                .variant(weight)
                .map(|font| font.text_width_points(text, font_size))
                .unwrap_or(0.0),
        }
    }
}

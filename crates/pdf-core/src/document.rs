//! PDF Document builder

use crate::builtin::encode_literal;
use crate::graphics::{generate_line_operators, generate_rect_operators};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{
    Canvas, FontFamily, FontFamilyId, FontHandle, FontSource, FontWeight, LineStyle, PageSize,
    PdfError, Point, Rect, Result, TextPaint,
};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Channels as 0-255 values
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Registered font variant as embedded: family index and resolved weight
type FontKey = (usize, FontWeight);

/// Fixed-page PDF document built from scratch
///
/// Drawing operators are buffered per page. Page dictionaries, font objects
/// and the page tree are written once, when the document is serialized.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_sizes: Vec<PageSize>,
    /// Registered font families, indexed by `FontFamilyId`
    families: Vec<FontFamily>,
    /// Font resource names ("F1", "F2", ...) shared by every page
    font_resources: HashMap<FontKey, String>,
    /// Fonts referenced by each page (page number -> font keys)
    page_fonts: HashMap<usize, BTreeSet<FontKey>>,
    /// Embedded images (data hash -> image object)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> resource name -> object)
    page_images: HashMap<usize, BTreeMap<String, ObjectId>>,
    next_image_resource: usize,
    /// Buffered content per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
    out_of_bounds_draws: usize,
    debug_bounds: bool,
    finalized: bool,
}

impl PdfDocument {
    /// Create an empty document with no pages
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self {
            inner,
            pages_id,
            page_ids: Vec::new(),
            page_sizes: Vec::new(),
            families: Vec::new(),
            font_resources: HashMap::new(),
            page_fonts: HashMap::new(),
            embedded_images: HashMap::new(),
            page_images: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
            out_of_bounds_draws: 0,
            debug_bounds: false,
            finalized: false,
        }
    }

    /// Log draws that reach outside their page
    pub fn with_debug_bounds(mut self, enabled: bool) -> Self {
        self.debug_bounds = enabled;
        self
    }

    /// Number of draws that touched a point outside their page
    pub fn out_of_bounds_draws(&self) -> usize {
        self.out_of_bounds_draws
    }

    /// Access the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    fn check_page(&self, page: usize) -> Result<PageSize> {
        if self.finalized {
            return Err(PdfError::SaveError(
                "document has already been serialized".to_string(),
            ));
        }
        let count = self.page_sizes.len();
        if page == 0 || page > count {
            return Err(PdfError::InvalidPage(page, count));
        }
        Ok(self.page_sizes[page - 1])
    }

    /// Record (and log) draws whose anchor points fall off the page
    fn check_bounds(&mut self, page: usize, size: PageSize, points: &[Point], what: &str) {
        if let Some(p) = points.iter().find(|p| !size.contains(**p)) {
            self.out_of_bounds_draws += 1;
            if !self.debug_bounds {
                return;
            }
            log::debug!(
                "{what} on page {page} reaches outside the page at ({:.2}, {:.2})",
                p.x,
                p.y
            );
        }
    }

    fn family(&self, id: FontFamilyId) -> Result<&FontFamily> {
        self.families
            .get(id.index())
            .ok_or_else(|| PdfError::FontNotFound(format!("font family #{}", id.index())))
    }

    fn font_resource_name(&mut self, key: FontKey) -> String {
        let next = self.font_resources.len() + 1;
        self.font_resources
            .entry(key)
            .or_insert_with(|| format!("F{next}"))
            .clone()
    }

    /// Buffer content for a page
    ///
    /// Operators are collected per page and written as a single stream at save time.
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Get or create an image reference for a specific page
    ///
    /// Returns the resource name (e.g., "Im1"). Images are deduplicated by
    /// a hash of their encoded bytes.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash) {
            Some(id) => *id,
            None => {
                let xobject = ImageXObject::from_encoded(data)?;
                let mut stream = xobject.to_pdf_stream();
                if let Some(mask) = xobject.to_smask_stream() {
                    let mask_id = self.inner.add_object(mask);
                    stream.dict.set("SMask", Object::Reference(mask_id));
                }
                let id = self.inner.add_object(stream);
                self.embedded_images.insert(data_hash, id);
                id
            }
        };

        let resources = self.page_images.entry(page).or_default();
        if let Some((name, _)) = resources.iter().find(|(_, id)| **id == object_id) {
            return Ok(name.clone());
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        resources.insert(resource_name.clone(), object_id);
        Ok(resource_name)
    }

    /// Embed a font variant and return its Type0 or Type1 object
    fn embed_font_object(&mut self, key: FontKey) -> Result<ObjectId> {
        let family = self
            .families
            .get(key.0)
            .ok_or_else(|| PdfError::FontNotFound(format!("font family #{}", key.0)))?;

        let font_data = match family {
            FontFamily::Builtin(font) => {
                let dict = font.to_pdf_dictionary(key.1);
                return Ok(self.inner.add_object(dict));
            }
            FontFamily::TrueType { .. } => family
                .variant(key.1)
                .ok_or_else(|| PdfError::FontNotFound(format!("font family #{}", key.0)))?,
        };

        let font_objects = font_data.to_pdf_objects();

        let font_file_id = self.inner.add_object(font_objects.font_file_stream);

        let mut font_descriptor = font_objects.font_descriptor;
        font_descriptor.set("FontFile2", Object::Reference(font_file_id));
        let font_descriptor_id = self.inner.add_object(font_descriptor);

        let mut cid_font = font_objects.cid_font;
        cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
        let cid_font_id = self.inner.add_object(cid_font);

        let tounicode_id = self.inner.add_object(font_objects.tounicode_stream);

        let mut type0_font = font_objects.type0_font;
        type0_font.set(
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        );
        type0_font.set("ToUnicode", Object::Reference(tounicode_id));

        Ok(self.inner.add_object(type0_font))
    }

    /// Write fonts, page dictionaries and the page tree
    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }

        let mut used_fonts: Vec<FontKey> = self.page_fonts.values().flatten().copied().collect();
        used_fonts.sort();
        used_fonts.dedup();

        let mut font_objects = HashMap::new();
        for key in used_fonts {
            let id = self.embed_font_object(key)?;
            font_objects.insert(key, id);
        }

        for (index, (&page_id, size)) in self.page_ids.iter().zip(&self.page_sizes).enumerate() {
            let page = index + 1;

            let content = self.page_content_buffer.remove(&page).unwrap_or_default();
            let contents_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), content));

            let mut fonts = Dictionary::new();
            for key in self.page_fonts.get(&page).into_iter().flatten() {
                if let (Some(name), Some(id)) =
                    (self.font_resources.get(key), font_objects.get(key))
                {
                    fonts.set(name.as_bytes(), Object::Reference(*id));
                }
            }

            let mut xobjects = Dictionary::new();
            for (name, id) in self.page_images.get(&page).into_iter().flatten() {
                xobjects.set(name.as_bytes(), Object::Reference(*id));
            }

            let mut resources = Dictionary::new();
            if !fonts.is_empty() {
                resources.set("Font", Object::Dictionary(fonts));
            }
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(size.width as f32),
                    Object::Real(size.height as f32),
                ],
                "Resources" => resources,
                "Contents" => contents_id,
            };
            self.inner
                .objects
                .insert(page_id, Object::Dictionary(page_dict));
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.inner
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        self.finalized = true;
        Ok(())
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas for PdfDocument {
    fn new_page(&mut self, width: f64, height: f64) -> Result<usize> {
        if self.finalized {
            return Err(PdfError::SaveError(
                "document has already been serialized".to_string(),
            ));
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PdfError::InvalidPageSize(width, height));
        }
        let page_id = self.inner.new_object_id();
        self.page_ids.push(page_id);
        self.page_sizes.push(PageSize { width, height });
        Ok(self.page_ids.len())
    }

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn register_font(&mut self, source: FontSource) -> Result<FontFamilyId> {
        let family = FontFamily::from_source(source)?;
        self.families.push(family);
        Ok(FontFamilyId::new(self.families.len() - 1))
    }

    fn text_width(&self, text: &str, font: FontHandle, size: f32) -> f64 {
        match self.family(font.family) {
            Ok(family) => family.text_width_points(font.weight, text, size) as f64,
            Err(_) => 0.0,
        }
    }

    fn draw_line(&mut self, page: usize, from: Point, to: Point, style: LineStyle) -> Result<()> {
        let size = self.check_page(page)?;
        self.check_bounds(page, size, &[from, to], "line");
        let ops = generate_line_operators(from, to, &style);
        self.buffer_content(page, &ops);
        Ok(())
    }

    fn draw_rect(
        &mut self,
        page: usize,
        rect: Rect,
        border_only: bool,
        style: LineStyle,
    ) -> Result<()> {
        let size = self.check_page(page)?;
        let corners = [
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.top()),
        ];
        self.check_bounds(page, size, &corners, "rectangle");
        let ops = generate_rect_operators(rect, border_only, &style);
        self.buffer_content(page, &ops);
        Ok(())
    }

    fn draw_text(&mut self, page: usize, text: &str, at: Point, paint: TextPaint) -> Result<()> {
        let size = self.check_page(page)?;
        if text.is_empty() {
            return Ok(());
        }

        let family_index = paint.font.family.index();
        let family = self
            .families
            .get_mut(family_index)
            .ok_or_else(|| PdfError::FontNotFound(format!("font family #{family_index}")))?;
        let weight = family.resolved_weight(paint.font.weight);

        let encoded = if matches!(family, FontFamily::Builtin(_)) {
            encode_literal(text)
        } else {
            let font_data = family
                .variant_mut(weight)
                .ok_or_else(|| PdfError::FontNotFound(format!("font family #{family_index}")))?;
            font_data.add_chars(text);
            font_data.encode_text_hex(text)
        };

        let key = (family_index, weight);
        let font_name = self.font_resource_name(key);
        self.page_fonts.entry(page).or_default().insert(key);

        let end_x = at.x + self.text_width(text, paint.font, paint.size);
        self.check_bounds(page, size, &[at, Point::new(end_x, at.y)], "text");

        let ctx = TextRenderContext {
            font_name,
            font_size: paint.size,
            color: paint.color,
            angle: paint.angle,
        };
        let ops = generate_text_operators(&encoded, at.x, at.y, &ctx);
        self.buffer_content(page, &ops);
        Ok(())
    }

    fn draw_image(&mut self, page: usize, png: &[u8], rect: Rect, angle: f64) -> Result<()> {
        let size = self.check_page(page)?;
        let corners = [
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.top()),
        ];
        self.check_bounds(page, size, &corners, "image");
        let name = self.get_or_create_image_ref(png, page)?;
        let ops = generate_image_operators(&name, rect.x, rect.y, rect.width, rect.height, angle);
        self.buffer_content(page, &ops);
        Ok(())
    }

    fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }
}

//! Supersampled rasterization of complex-script text into PNG bitmaps
//!
//! PDF base fonts cannot shape Tamil, so runs in that script are shaped and
//! painted into a transparent bitmap at print resolution, then placed on the
//! page as an image. Results are memoized on the full option tuple.

use crate::script::{scripts_in, ComplexScript};
use crate::wrap::{truncate_to_frame, wrap};
use crate::{Result, TamilTextError};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::Arc;

/// Print resolution over PDF user-space resolution
pub const DEFAULT_SUPERSAMPLE: f32 = 300.0 / 72.0;

/// Glyph weight for a raster run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlyphWeight {
    #[default]
    Regular,
    Bold,
}

/// Options controlling a single rasterization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Font size in points
    pub font_size: f32,
    pub weight: GlyphWeight,
    /// RGB fill colour
    pub color: [u8; 3],
    /// Wrap width in points
    pub max_width: Option<f32>,
    /// Clip height in points
    pub max_height: Option<f32>,
    /// Emphasised runs are painted bold
    pub emphasis: bool,
}

impl RasterOptions {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            weight: GlyphWeight::Regular,
            color: [0, 0, 0],
            max_width: None,
            max_height: None,
            emphasis: false,
        }
    }

    pub fn weight(mut self, weight: GlyphWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn max_width(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn max_height(mut self, height: f32) -> Self {
        self.max_height = Some(height);
        self
    }

    pub fn emphasis(mut self, emphasis: bool) -> Self {
        self.emphasis = emphasis;
        self
    }

    /// Weight actually painted
    pub fn effective_weight(&self) -> GlyphWeight {
        if self.emphasis {
            GlyphWeight::Bold
        } else {
            self.weight
        }
    }
}

/// A rasterized text run
#[derive(Debug, Clone, PartialEq)]
pub struct RasterResult {
    /// PNG bytes with a transparent background
    pub png: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Size on the page in points
    pub logical_width: f32,
    pub logical_height: f32,
    /// Lines painted
    pub lines: usize,
    /// Lines dropped by the height clip
    pub clipped_lines: usize,
}

/// Vertical metrics of one line, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from the top of the line to the baseline
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line
    pub descent: f32,
}

impl LineMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent
    }
}

/// Shaping and painting for one script
///
/// All sizes are in the unit of `font_size`: points when measuring,
/// pixels when painting into a supersampled bitmap.
pub trait RasterBackend: Send + Sync {
    /// Script this backend can shape
    fn script(&self) -> ComplexScript;

    /// Advance width of a shaped line
    fn measure(&self, text: &str, font_size: f32, weight: GlyphWeight) -> f32;

    fn line_metrics(&self, font_size: f32, weight: GlyphWeight) -> LineMetrics;

    /// Paint one line with its baseline starting at `origin`
    fn paint(
        &self,
        target: &mut RgbaImage,
        text: &str,
        origin: (f32, f32),
        font_size: f32,
        weight: GlyphWeight,
        color: [u8; 3],
    ) -> Result<()>;
}

/// Cache key: the text plus every option bit-for-bit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RasterKey {
    text: String,
    font_size: u32,
    weight: GlyphWeight,
    color: [u8; 3],
    max_width: Option<u32>,
    max_height: Option<u32>,
    emphasis: bool,
}

impl RasterKey {
    fn new(text: &str, options: &RasterOptions) -> Self {
        Self {
            text: text.to_string(),
            font_size: options.font_size.to_bits(),
            weight: options.weight,
            color: options.color,
            max_width: options.max_width.map(f32::to_bits),
            max_height: options.max_height.map(f32::to_bits),
            emphasis: options.emphasis,
        }
    }
}

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memo of raster results; when bounded, the oldest entry is evicted first
struct RasterCache {
    entries: HashMap<RasterKey, Arc<RasterResult>>,
    order: VecDeque<RasterKey>,
    capacity: Option<usize>,
    hits: u64,
    misses: u64,
}

impl RasterCache {
    fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, key: &RasterKey) -> Option<Arc<RasterResult>> {
        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                Some(Arc::clone(result))
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: RasterKey, result: Arc<RasterResult>) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.order.len() >= capacity {
                match self.order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, result);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Rasterizer for complex-script runs
///
/// # Example
///
/// ```ignore
/// use tamil_text::{FontRasterBackend, GlyphRasterizer, RasterOptions, ComplexScript};
///
/// let backend = FontRasterBackend::new(ComplexScript::Tamil, regular_ttf, Some(bold_ttf))?;
/// let mut rasterizer = GlyphRasterizer::new(Box::new(backend));
/// let run = rasterizer.render("திருநெல்வேலி", &RasterOptions::new(10.0).max_width(180.0))?;
/// ```
pub struct GlyphRasterizer {
    backend: Option<Box<dyn RasterBackend>>,
    cache: RasterCache,
    supersample: f32,
}

impl GlyphRasterizer {
    pub fn new(backend: Box<dyn RasterBackend>) -> Self {
        Self {
            backend: Some(backend),
            cache: RasterCache::new(None),
            supersample: DEFAULT_SUPERSAMPLE,
        }
    }

    /// Rasterizer with no script font; every render fails with `FontNotReady`
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            cache: RasterCache::new(None),
            supersample: DEFAULT_SUPERSAMPLE,
        }
    }

    pub fn with_supersample(mut self, factor: f32) -> Self {
        if factor.is_finite() && factor > 0.0 {
            self.supersample = factor;
        } else {
            log::warn!("ignoring invalid supersample factor {factor}");
        }
        self
    }

    /// Bound the cache to `capacity` entries
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = RasterCache::new(Some(capacity));
        self
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    pub fn supersample(&self) -> f32 {
        self.supersample
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Width of a run in points, if it can be shaped
    pub fn measure(&self, text: &str, font_size: f32, weight: GlyphWeight) -> Option<f32> {
        self.backend
            .as_deref()
            .map(|backend| backend.measure(text, font_size, weight))
    }

    /// Rasterize `text`, returning a cached bitmap when the same request was seen before
    pub fn render(&mut self, text: &str, options: &RasterOptions) -> Result<Arc<RasterResult>> {
        if text.trim().is_empty() {
            return Err(TamilTextError::EmptyText);
        }
        let backend = self
            .backend
            .as_deref()
            .ok_or(TamilTextError::FontNotReady)?;
        if let Some(other) = scripts_in(text)
            .into_iter()
            .find(|script| *script != backend.script())
        {
            return Err(TamilTextError::UnsupportedScript(other));
        }

        let key = RasterKey::new(text, options);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let result = Arc::new(rasterize(backend, text, options, self.supersample)?);
        log::debug!(
            "rasterized {} line(s) at {}x{} px",
            result.lines,
            result.pixel_width,
            result.pixel_height
        );
        self.cache.insert(key, Arc::clone(&result));
        Ok(result)
    }
}

fn rasterize(
    backend: &dyn RasterBackend,
    text: &str,
    options: &RasterOptions,
    supersample: f32,
) -> Result<RasterResult> {
    let size = options.font_size;
    if !(size.is_finite() && size > 0.0) {
        return Err(TamilTextError::InvalidFontSize(size));
    }
    let weight = options.effective_weight();
    let measure = |line: &str, font_size: f32| backend.measure(line, font_size, weight);

    let max_width = options.max_width.unwrap_or(f32::INFINITY);
    let lines = wrap(text, measure, size, max_width);
    let metrics = backend.line_metrics(size, weight);
    let line_height = metrics.line_height();

    let (lines, clipped_lines) = match options.max_height {
        Some(max_height) => {
            let fit = truncate_to_frame(lines, line_height, max_height);
            if fit.kept.is_empty() {
                return Err(TamilTextError::FrameTooSmall {
                    line_height,
                    max_height,
                });
            }
            if fit.clipped_count > 0 {
                log::debug!("clipped {} line(s) to fit frame", fit.clipped_count);
            }
            (fit.kept, fit.clipped_count)
        }
        None => (lines, 0),
    };
    if lines.is_empty() {
        return Err(TamilTextError::EmptyText);
    }

    let logical_width = lines
        .iter()
        .map(|line| measure(line, size))
        .fold(0.0f32, f32::max);
    let logical_height = line_height * lines.len() as f32;

    let pixel_width = ((logical_width * supersample).ceil() as u32).max(1);
    let pixel_height = ((logical_height * supersample).ceil() as u32).max(1);
    let mut bitmap = RgbaImage::new(pixel_width, pixel_height);

    let px_size = size * supersample;
    for (index, line) in lines.iter().enumerate() {
        let baseline = (index as f32 * line_height + metrics.ascent) * supersample;
        backend.paint(&mut bitmap, line, (0.0, baseline), px_size, weight, options.color)?;
    }

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(bitmap)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| TamilTextError::Encode(e.to_string()))?;

    Ok(RasterResult {
        png,
        pixel_width,
        pixel_height,
        logical_width,
        logical_height,
        lines: lines.len(),
        clipped_lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed-advance backend that counts paint calls
    struct CountingBackend {
        pub paints: Arc<AtomicUsize>,
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

        fn measure(&self, text: &str, font_size: f32, weight: GlyphWeight) -> f32 {
            let per_char = match weight {
                GlyphWeight::Regular => 0.5,
                GlyphWeight::Bold => 0.6,
            };
            text.chars().count() as f32 * font_size * per_char
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
            text: &str,
            origin: (f32, f32),
            font_size: f32,
            weight: GlyphWeight,
            color: [u8; 3],
        ) -> Result<()> {
            self.paints.fetch_add(1, Ordering::SeqCst);
            let width = self.measure(text, font_size, weight) as u32;
            let y = (origin.1 as u32).min(target.height().saturating_sub(1));
            for x in 0..width.min(target.width()) {
                target.put_pixel(x, y, Rgba([color[0], color[1], color[2], 255]));
            }
            Ok(())
        }
    }

    fn rasterizer() -> (GlyphRasterizer, Arc<AtomicUsize>) {
        let (backend, paints) = CountingBackend::new();
        (GlyphRasterizer::new(Box::new(backend)), paints)
    }

    #[test]
    fn test_render_single_line() {
        let (mut r, _) = rasterizer();
        let run = r.render("திருநெல்வேலி", &RasterOptions::new(10.0)).unwrap();
        assert_eq!(run.lines, 1);
        assert_eq!(run.clipped_lines, 0);
        // 12 chars * 5pt
        assert!((run.logical_width - 60.0).abs() < 1e-3);
        assert!((run.logical_height - 12.0).abs() < 1e-3);
        assert_eq!(run.pixel_width, (60.0 * DEFAULT_SUPERSAMPLE).ceil() as u32);
        assert_eq!(&run.png[1..4], b"PNG");
    }

    #[test]
    fn test_render_wraps_and_clips() {
        let (mut r, paints) = rasterizer();
        // each word is 5 chars = 25pt; 30pt keeps one word per line
        let options = RasterOptions::new(10.0).max_width(30.0).max_height(25.0);
        let run = r.render("அஆஇஈஉ அஆஇஈஉ அஆஇஈஉ", &options).unwrap();
        assert_eq!(run.lines, 2);
        assert_eq!(run.clipped_lines, 1);
        assert_eq!(paints.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_render_is_memoized() {
        let (mut r, paints) = rasterizer();
        let options = RasterOptions::new(10.0);
        let first = r.render("தமிழ்", &options).unwrap();
        let second = r.render("தமிழ்", &options).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(paints.load(Ordering::SeqCst), 1);
        let stats = r.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_any_option_change_misses_cache() {
        let (mut r, paints) = rasterizer();
        let base = RasterOptions::new(10.0);
        r.render("தமிழ்", &base).unwrap();
        r.render("தமிழ்", &base.weight(GlyphWeight::Bold)).unwrap();
        r.render("தமிழ்", &base.color([255, 0, 0])).unwrap();
        r.render("தமிழ்", &base.max_width(100.0)).unwrap();
        r.render("தமிழ்", &base.max_height(100.0)).unwrap();
        r.render("தமிழ்", &base.emphasis(true)).unwrap();
        r.render("தமிழ்", &RasterOptions::new(11.0)).unwrap();

        assert_eq!(paints.load(Ordering::SeqCst), 7);
        assert_eq!(r.cache_stats().hits, 0);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let (backend, paints) = CountingBackend::new();
        let mut r = GlyphRasterizer::new(Box::new(backend)).with_cache_capacity(2);
        let options = RasterOptions::new(10.0);
        r.render("அ", &options).unwrap();
        r.render("ஆ", &options).unwrap();
        r.render("இ", &options).unwrap();
        assert_eq!(r.cache_stats().entries, 2);

        r.render("ஆ", &options).unwrap();
        assert_eq!(paints.load(Ordering::SeqCst), 3);
        r.render("அ", &options).unwrap();
        assert_eq!(paints.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_emphasis_paints_bold() {
        let (mut r, _) = rasterizer();
        let plain = r.render("தமிழ்", &RasterOptions::new(10.0)).unwrap();
        let emphasised = r
            .render("தமிழ்", &RasterOptions::new(10.0).emphasis(true))
            .unwrap();
        assert!(emphasised.logical_width > plain.logical_width);
    }

    #[test]
    fn test_typed_failures() {
        let (mut r, _) = rasterizer();
        assert!(matches!(
            r.render("  ", &RasterOptions::new(10.0)),
            Err(TamilTextError::EmptyText)
        ));
        assert!(matches!(
            r.render("नमस्ते", &RasterOptions::new(10.0)),
            Err(TamilTextError::UnsupportedScript(ComplexScript::Devanagari))
        ));
        assert!(matches!(
            r.render("தமிழ்", &RasterOptions::new(0.0)),
            Err(TamilTextError::InvalidFontSize(_))
        ));
        assert!(matches!(
            r.render("தமிழ்", &RasterOptions::new(10.0).max_height(5.0)),
            Err(TamilTextError::FrameTooSmall { .. })
        ));

        let mut missing = GlyphRasterizer::unavailable();
        assert!(!missing.is_ready());
        assert!(matches!(
            missing.render("தமிழ்", &RasterOptions::new(10.0)),
            Err(TamilTextError::FontNotReady)
        ));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let (mut r, _) = rasterizer();
        let options = RasterOptions::new(10.0).max_height(5.0);
        assert!(r.render("தமிழ்", &options).is_err());
        assert_eq!(r.cache_stats().entries, 0);
    }

    #[test]
    fn test_mixed_latin_and_tamil_is_accepted() {
        let (mut r, _) = rasterizer();
        let run = r.render("12, காந்தி தெரு", &RasterOptions::new(9.0)).unwrap();
        assert_eq!(run.lines, 1);
    }

    #[test]
    fn test_custom_supersample() {
        let (backend, _) = CountingBackend::new();
        let mut r = GlyphRasterizer::new(Box::new(backend)).with_supersample(1.0);
        let run = r.render("அஆ", &RasterOptions::new(10.0)).unwrap();
        assert_eq!(run.pixel_width, 10);
        assert_eq!(run.pixel_height, 12);
    }
}

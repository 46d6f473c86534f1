//! Report composition
//!
//! [`ReportComposer`] owns the page loop shared by every report: validation,
//! filtering, font registration, the page-one header, pagination and the
//! border pass. What a record looks like is up to a [`RecordRenderer`].
//!
//! Drawing goes through [`DrawContext`], which never fails a report over a
//! single draw: a failed raster run is retried as native text, and a failed
//! native run is retried in the plain Latin font.

use crate::layout::LayoutTemplate;
use crate::output::{file_name, OutputAction, ReportKind, ReportOutput};
use crate::selector::{classify, raster_weight, FontTable, RunStyle};
use crate::{
    AssetLoader, AssetTier, ChurchInfo, FontLoad, FontRequest, ReportConfig, ReportError,
    ReportOptions, Result,
};
use pdf_core::{
    raster_baseline_y, BuiltinFont, Canvas, Color, FontHandle, FontSource, LineStyle, PageSize,
    PdfDocument, Point, Rect, TextPaint,
};
use tamil_text::{
    truncate_to_frame, wrap, ComplexScript, FontRasterBackend, GlyphRasterizer, RasterOptions,
    RasterResult,
};

/// Size, weight and color of a text run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    /// Highlighted run; drawn bold in the emphasis color
    pub emphasis: bool,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            bold: false,
            emphasis: false,
            color: Color::black(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn emphasis(mut self, emphasis: bool) -> Self {
        self.emphasis = emphasis;
        if emphasis {
            self.color = emphasis_color();
        }
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn raster_options(&self, style: RunStyle) -> RasterOptions {
        RasterOptions::new(self.size)
            .weight(raster_weight(style))
            .color(self.color.to_rgb8())
            .emphasis(self.emphasis)
    }
}

/// Color of emphasised runs
pub fn emphasis_color() -> Color {
    Color::from_rgb(139, 0, 0)
}

/// Drawing surface handed to renderers
pub struct DrawContext<'a> {
    canvas: &'a mut dyn Canvas,
    fonts: FontTable,
    rasterizer: &'a mut GlyphRasterizer,
    page_size: PageSize,
    failed_draws: usize,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        canvas: &'a mut dyn Canvas,
        fonts: FontTable,
        rasterizer: &'a mut GlyphRasterizer,
        page_size: PageSize,
    ) -> Self {
        Self {
            canvas,
            fonts,
            rasterizer,
            page_size,
            failed_draws: 0,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn fonts(&self) -> FontTable {
        self.fonts
    }

    /// Draws that failed even after the plain-font retry
    pub fn failed_draws(&self) -> usize {
        self.failed_draws
    }

    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    pub fn new_page(&mut self) -> Result<usize> {
        Ok(self
            .canvas
            .new_page(self.page_size.width, self.page_size.height)?)
    }

    /// Advance width of a run as it would be drawn
    pub fn text_width(&mut self, text: &str, style: &TextStyle) -> f64 {
        let run = classify(text, style.bold, style.emphasis);
        if let RunStyle::Script { .. } = run {
            if let Some(width) = self.rasterizer.measure(text, style.size, raster_weight(run)) {
                return width as f64;
            }
        }
        self.canvas
            .text_width(text, self.fonts.lookup(run), style.size)
    }

    /// Draw one run with its baseline at `at`; blank text draws nothing
    pub fn text(&mut self, page: usize, text: &str, at: Point, style: &TextStyle) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let run = classify(text, style.bold, style.emphasis);
        if let RunStyle::Script { script, .. } = run {
            match self.rasterizer.render(text, &style.raster_options(run)) {
                Ok(raster) => {
                    let rect = raster_rect(&raster, at, style.size);
                    if self.image(page, &raster, rect, 0.0, script) {
                        return;
                    }
                }
                Err(e) => log::warn!("rasterizing {script:?} run failed, drawing natively: {e}"),
            }
        }
        let font = self.fonts.lookup(run);
        self.native(page, text, at, font, style, 0.0);
    }

    /// Draw `text` centred on `center_x`
    pub fn text_centered(&mut self, page: usize, text: &str, center_x: f64, y: f64, style: &TextStyle) {
        let width = self.text_width(text.trim(), style);
        self.text(page, text, Point::new(center_x - width / 2.0, y), style);
    }

    /// Wrap `text` to the frame's width and draw the lines that fit its height
    ///
    /// The first baseline sits one font size under the frame top. Returns the
    /// number of lines drawn.
    pub fn text_in_frame(
        &mut self,
        page: usize,
        text: &str,
        frame: Rect,
        line_height: f64,
        style: &TextStyle,
    ) -> usize {
        let text = text.trim();
        if text.is_empty() {
            return 0;
        }
        let first_baseline = frame.top() - style.size as f64;
        let run = classify(text, style.bold, style.emphasis);

        if let RunStyle::Script { script, .. } = run {
            // the bitmap top sits 0.2em under the frame top
            let room = (frame.height - 0.2 * style.size as f64).max(0.0);
            let options = style
                .raster_options(run)
                .max_width(frame.width as f32)
                .max_height(room as f32);
            match self.rasterizer.render(text, &options) {
                Ok(raster) => {
                    let rect = raster_rect(&raster, Point::new(frame.x, first_baseline), style.size);
                    if self.image(page, &raster, rect, 0.0, script) {
                        return raster.lines;
                    }
                }
                Err(e) => log::warn!("rasterizing {script:?} frame failed, drawing natively: {e}"),
            }
        }

        let font = self.fonts.lookup(run);
        let canvas = &*self.canvas;
        let lines = wrap(
            text,
            |line, size| canvas.text_width(line, font, size) as f32,
            style.size,
            frame.width as f32,
        );
        let fit = truncate_to_frame(lines, line_height as f32, frame.height as f32);
        if fit.clipped_count > 0 {
            log::debug!("clipped {} line(s) of frame text", fit.clipped_count);
        }
        for (index, line) in fit.kept.iter().enumerate() {
            let at = Point::new(frame.x, first_baseline - index as f64 * line_height);
            self.native(page, line, at, font, style, 0.0);
        }
        fit.kept.len()
    }

    /// Draw `text` centred in `frame`, rotated by `angle` degrees
    pub fn text_rotated(&mut self, page: usize, text: &str, frame: Rect, angle: f64, style: &TextStyle) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let run = classify(text, style.bold, style.emphasis);
        if let RunStyle::Script { script, .. } = run {
            match self.rasterizer.render(text, &style.raster_options(run)) {
                Ok(raster) => {
                    let (w, h) = (raster.logical_width as f64, raster.logical_height as f64);
                    let placed = crate::place_rotated(frame, w, h, angle);
                    let rect = Rect::new(placed.origin.x, placed.origin.y, w, h);
                    if self.image(page, &raster, rect, angle, script) {
                        return;
                    }
                }
                Err(e) => log::warn!("rasterizing rotated {script:?} run failed: {e}"),
            }
        }
        let font = self.fonts.lookup(run);
        let width = self.canvas.text_width(text, font, style.size);
        let placed = crate::place_rotated(frame, width, 0.7 * style.size as f64, angle);
        if width > placed.available_width {
            log::debug!("rotated text {text:?} overflows its cell");
        }
        self.native(page, text, placed.origin, font, style, angle);
    }

    pub fn line(&mut self, page: usize, from: Point, to: Point, style: LineStyle) {
        if let Err(e) = self.canvas.draw_line(page, from, to, style) {
            log::warn!("line draw failed: {e}");
            self.failed_draws += 1;
        }
    }

    pub fn rect(&mut self, page: usize, rect: Rect, border_only: bool, style: LineStyle) {
        if let Err(e) = self.canvas.draw_rect(page, rect, border_only, style) {
            log::warn!("rectangle draw failed: {e}");
            self.failed_draws += 1;
        }
    }

    fn image(
        &mut self,
        page: usize,
        raster: &RasterResult,
        rect: Rect,
        angle: f64,
        script: ComplexScript,
    ) -> bool {
        match self.canvas.draw_image(page, &raster.png, rect, angle) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("placing {script:?} bitmap failed, drawing natively: {e}");
                false
            }
        }
    }

    fn native(
        &mut self,
        page: usize,
        text: &str,
        at: Point,
        font: FontHandle,
        style: &TextStyle,
        angle: f64,
    ) {
        let paint = TextPaint::new(style.size, font)
            .color(style.color)
            .rotated(angle);
        let Err(e) = self.canvas.draw_text(page, text, at, paint) else {
            return;
        };
        let plain = self.fonts.plain();
        if font != plain {
            log::warn!("text draw failed, retrying in plain font: {e}");
            let paint = TextPaint::new(style.size, plain).rotated(angle);
            if self.canvas.draw_text(page, text, at, paint).is_ok() {
                return;
            }
        }
        log::error!("could not draw {text:?} on page {page}: {e}");
        self.failed_draws += 1;
    }
}

fn raster_rect(raster: &RasterResult, nominal: Point, font_size: f32) -> Rect {
    let width = raster.logical_width as f64;
    let height = raster.logical_height as f64;
    Rect::new(
        nominal.x,
        raster_baseline_y(nominal.y, height, font_size as f64),
        width,
        height,
    )
}

/// How records are distributed over pages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageFlow {
    /// Fixed slots per page; slot `i` is the template shifted down `i` spacings
    Slots { per_page: usize },
    /// Variable-height rows flowing down the page, breaking at the bottom limit
    Rows,
}

/// Where the composer asks a renderer to draw a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Slot { index: usize },
    /// `y` is the top of the record; `page_start` is true for the first record on a
    /// page; `index` counts records drawn so far
    Row {
        y: f64,
        page_start: bool,
        index: usize,
    },
}

/// Per-report strategy: validation, title and record drawing
pub trait RecordRenderer {
    type Record;

    fn kind(&self) -> ReportKind;

    fn template(&self) -> &LayoutTemplate;

    /// Check report-specific options before anything is drawn
    fn validate(&self, options: &ReportOptions) -> Result<()>;

    fn title(&self, options: &ReportOptions) -> String;

    /// The `dateOrYear` part of the output file name
    fn file_stamp(&self, options: &ReportOptions) -> String;

    fn flow(&self) -> PageFlow;

    /// Whether the record can be drawn; the renderer logs why not
    fn accepts(&self, record: &Self::Record) -> bool;

    fn in_area(&self, record: &Self::Record, area: &str) -> bool;

    /// Display name of the record's area, used to label area-filtered titles
    fn area_name(&self, _record: &Self::Record) -> Option<String> {
        None
    }

    /// Height a record takes in a row flow
    fn record_height(
        &self,
        _record: &Self::Record,
        _previous: Option<&Self::Record>,
        _page_start: bool,
    ) -> f64 {
        0.0
    }

    /// Draw what repeats at the top of every page's record area; returns where records start
    fn draw_page_furniture(&self, _ctx: &mut DrawContext<'_>, _page: usize, top: f64) -> f64 {
        top
    }

    fn draw_record(
        &self,
        ctx: &mut DrawContext<'_>,
        page: usize,
        record: &Self::Record,
        placement: Placement,
        previous: Option<&Self::Record>,
    );
}

/// What a compose pass produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeSummary {
    pub pages: usize,
    pub records_drawn: usize,
    pub records_skipped: usize,
    pub failed_draws: usize,
    pub latin_tier: AssetTier,
}

/// One engine for every report type
pub struct ReportComposer {
    config: ReportConfig,
    latin: FontSource,
    latin_tier: AssetTier,
    script_font: Option<FontSource>,
    rasterizer: GlyphRasterizer,
}

impl ReportComposer {
    /// Load fonts through `loader`, falling back to built-in Times and no rasterizer
    pub fn new(config: ReportConfig, loader: &AssetLoader) -> Self {
        let (latin, latin_tier) = match loader.load(&FontRequest::from(&config.fonts.latin)) {
            FontLoad::Loaded {
                tier,
                regular,
                bold,
            } => (
                FontSource::TrueType {
                    name: "Latin".to_string(),
                    regular,
                    bold,
                },
                tier,
            ),
            FontLoad::AllFailed => {
                log::warn!("no Latin font loaded, using built-in Times");
                (FontSource::Builtin(BuiltinFont::Times), AssetTier::BuiltIn)
            }
        };

        let (rasterizer, script_font) = match loader.load(&FontRequest::from(&config.fonts.script))
        {
            FontLoad::Loaded { regular, bold, .. } => {
                match FontRasterBackend::new(ComplexScript::Tamil, regular.clone(), bold.clone()) {
                    Ok(backend) => (
                        GlyphRasterizer::new(Box::new(backend)),
                        Some(FontSource::TrueType {
                            name: "Tamil".to_string(),
                            regular,
                            bold,
                        }),
                    ),
                    Err(e) => {
                        log::warn!("script font unusable, Tamil text will not render: {e}");
                        (GlyphRasterizer::unavailable(), None)
                    }
                }
            }
            FontLoad::AllFailed => {
                log::warn!("no script font loaded, Tamil text will not render");
                (GlyphRasterizer::unavailable(), None)
            }
        };

        let rasterizer = configure(rasterizer, &config);
        Self {
            config,
            latin,
            latin_tier,
            script_font,
            rasterizer,
        }
    }

    /// Replace the rasterizer; supersample and cache settings come from the config
    pub fn with_rasterizer(mut self, rasterizer: GlyphRasterizer) -> Self {
        self.rasterizer = configure(rasterizer, &self.config);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn latin_tier(&self) -> AssetTier {
        self.latin_tier
    }

    pub fn rasterizer(&self) -> &GlyphRasterizer {
        &self.rasterizer
    }

    /// Draw a report onto `canvas`
    pub fn compose<R: RecordRenderer>(
        &mut self,
        canvas: &mut dyn Canvas,
        renderer: &R,
        records: &[R::Record],
        church: &ChurchInfo,
        options: &ReportOptions,
    ) -> Result<ComposeSummary> {
        if records.is_empty() {
            return Err(ReportError::EmptyInput);
        }
        if church.name.trim().is_empty() {
            return Err(ReportError::MissingField("churchName"));
        }
        renderer.validate(options)?;

        let in_area: Vec<&R::Record> = match options.area_filter() {
            Some(area) => records.iter().filter(|r| renderer.in_area(r, area)).collect(),
            None => records.iter().collect(),
        };
        if in_area.is_empty() {
            log::warn!("no records in area {:?}", options.area_filter());
            return Err(ReportError::EmptyInput);
        }
        let accepted: Vec<&R::Record> = in_area
            .iter()
            .copied()
            .filter(|r| renderer.accepts(r))
            .collect();
        let skipped = in_area.len() - accepted.len();
        if skipped > 0 {
            log::warn!("skipped {skipped} malformed record(s)");
        }

        let fonts = self.register_fonts(canvas)?;
        let template = renderer.template();
        let page_size = PageSize {
            width: template.page_width,
            height: template.page_height,
        };
        let mut ctx = DrawContext::new(canvas, fonts, &mut self.rasterizer, page_size);

        let mut title = renderer.title(options);
        if let Some(area) = options.area_filter() {
            let label = in_area
                .first()
                .and_then(|r| renderer.area_name(r))
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| area.to_string());
            title = format!("{title} - {}", label.trim());
        }

        let first_page = ctx.new_page()?;
        draw_header(&mut ctx, first_page, template, &self.config, church, &title);

        let mut page = first_page;
        match renderer.flow() {
            PageFlow::Slots { per_page } => {
                let per_page = per_page.max(1);
                for (i, record) in accepted.iter().enumerate() {
                    let index = i % per_page;
                    if i > 0 && index == 0 {
                        page = ctx.new_page()?;
                    }
                    let previous = i.checked_sub(1).map(|p| accepted[p]);
                    renderer.draw_record(&mut ctx, page, record, Placement::Slot { index }, previous);
                }
            }
            PageFlow::Rows => {
                let mut y = renderer.draw_page_furniture(&mut ctx, page, template.base_y);
                let mut page_start = true;
                let mut previous: Option<&R::Record> = None;
                for (index, &record) in accepted.iter().enumerate() {
                    let mut height = renderer.record_height(record, previous, page_start);
                    if !page_start && y - height < template.bottom_limit {
                        page = ctx.new_page()?;
                        y = renderer.draw_page_furniture(&mut ctx, page, template.continuation_top);
                        page_start = true;
                        height = renderer.record_height(record, previous, page_start);
                    }
                    let placement = Placement::Row {
                        y,
                        page_start,
                        index,
                    };
                    renderer.draw_record(&mut ctx, page, record, placement, previous);
                    y -= height;
                    page_start = false;
                    previous = Some(record);
                }
            }
        }

        let border = template.border_rect();
        let style = LineStyle::new(template.border.line_width);
        for p in first_page..=page {
            ctx.rect(p, border, true, style);
        }

        let summary = ComposeSummary {
            pages: page - first_page + 1,
            records_drawn: accepted.len(),
            records_skipped: skipped,
            failed_draws: ctx.failed_draws(),
            latin_tier: self.latin_tier,
        };
        log::info!(
            "composed {} report: {} record(s) on {} page(s)",
            renderer.kind().slug(),
            summary.records_drawn,
            summary.pages
        );
        Ok(summary)
    }

    /// Compose onto a fresh PDF and package the bytes
    pub fn render<R: RecordRenderer>(
        &mut self,
        renderer: &R,
        records: &[R::Record],
        church: &ChurchInfo,
        options: &ReportOptions,
        action: OutputAction,
    ) -> Result<ReportOutput> {
        let mut doc = PdfDocument::new().with_debug_bounds(self.config.debug_bounds);
        let summary = self.compose(&mut doc, renderer, records, church, options)?;
        let bytes = doc.to_bytes()?;
        Ok(ReportOutput {
            bytes,
            file_name: file_name(
                renderer.kind(),
                &church.short_name(),
                &renderer.file_stamp(options),
            ),
            action,
            pages: summary.pages,
        })
    }

    fn register_fonts(&self, canvas: &mut dyn Canvas) -> Result<FontTable> {
        let latin = match canvas.register_font(self.latin.clone()) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("Latin font rejected, using built-in Times: {e}");
                canvas.register_font(FontSource::Builtin(BuiltinFont::Times))?
            }
        };
        let script = match &self.script_font {
            Some(source) => match canvas.register_font(source.clone()) {
                Ok(id) => Some(id),
                Err(e) => {
                    log::warn!("script font rejected for native fallback: {e}");
                    None
                }
            },
            None => None,
        };
        Ok(FontTable::new(latin, script))
    }
}

fn configure(rasterizer: GlyphRasterizer, config: &ReportConfig) -> GlyphRasterizer {
    let rasterizer = rasterizer.with_supersample(config.supersample);
    match config.cache_capacity {
        Some(capacity) => rasterizer.with_cache_capacity(capacity),
        None => rasterizer,
    }
}

/// Diocese, church and title lines with a rule beneath, centred on the page
fn draw_header(
    ctx: &mut DrawContext<'_>,
    page: usize,
    template: &LayoutTemplate,
    config: &ReportConfig,
    church: &ChurchInfo,
    title: &str,
) {
    let header = &template.header;
    let center = template.page_width / 2.0;

    let diocese = church
        .diocese
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(config.defaults.diocese.as_str());
    ctx.text_centered(page, diocese, center, header.diocese_y, &TextStyle::new(header.diocese_size));

    let church_line = match church.pastorate_name.as_deref().map(str::trim) {
        Some(pastorate) if !pastorate.is_empty() => format!(
            "{}, {} {}",
            church.name.trim(),
            pastorate,
            config.defaults.pastorate_suffix
        ),
        _ => church.name.trim().to_string(),
    };
    ctx.text_centered(
        page,
        &church_line,
        center,
        header.church_y,
        &TextStyle::new(header.church_size).bold(),
    );
    ctx.text_centered(page, title, center, header.title_y, &TextStyle::new(header.title_size).bold());

    ctx.line(
        page,
        Point::new(template.table.left, header.rule_y),
        Point::new(template.table.right, header.rule_y),
        LineStyle::new(0.75),
    );
}

//! WASM bindings for the pastorate report engine
//!
//! This crate provides a JavaScript-friendly API for:
//! - Configuring the engine and handing it font files
//! - Rendering birthday, wedding day and congregation register reports
//! - Viewing, printing or downloading the result in the browser
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { ReportEngine } from 'pastorate-wasm';
//!
//! await init();
//!
//! const engine = new ReportEngine(JSON.stringify({ familiesPerPage: 2 }));
//! engine.addFont('NotoSerif-Regular.ttf', serifBytes);
//! engine.addFont('NotoSansTamil-Regular.ttf', tamilBytes);
//!
//! const report = engine.birthday(payload, 'download');
//! report.deliver();
//! ```

use report::{
    parse_family_payload, parse_register_payload, AssetLoader, BundledAssets,
    FamilyBlockRenderer, OutputAction, RecordRenderer, RegisterRenderer, ReportComposer,
    ReportConfig, ReportOutput, ReportPayload,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Report engine holding configuration, fonts and the raster cache
#[wasm_bindgen]
pub struct ReportEngine {
    config: ReportConfig,
    fonts: BundledAssets,
    composer: Option<ReportComposer>,
}

#[wasm_bindgen]
impl ReportEngine {
    /// Create an engine from configuration JSON
    ///
    /// @param configJson - Engine configuration; `"{}"` for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<ReportEngine, JsValue> {
        let config = ReportConfig::from_json(config_json).map_err(js_error)?;
        Ok(ReportEngine {
            config,
            fonts: BundledAssets::new(),
            composer: None,
        })
    }

    /// Hand the engine a font file
    ///
    /// @param name - File name as used in the configuration
    /// @param data - TTF file bytes (Uint8Array)
    #[wasm_bindgen(js_name = addFont)]
    pub fn add_font(&mut self, name: &str, data: &[u8]) {
        self.fonts.insert(name, data.to_vec());
        // fonts are loaded once per composer
        self.composer = None;
    }

    /// Render a birthday list
    ///
    /// @param payload - `{ church, options, families }`
    /// @param action - "view", "print" or "download"
    pub fn birthday(&mut self, payload: JsValue, action: &str) -> Result<RenderedReport, JsValue> {
        let renderer = FamilyBlockRenderer::birthday(&self.config);
        let payload = family_payload(payload)?;
        self.render(&renderer, payload, action)
    }

    /// Render a wedding day list
    ///
    /// @param payload - `{ church, options, families }`
    /// @param action - "view", "print" or "download"
    pub fn wedding(&mut self, payload: JsValue, action: &str) -> Result<RenderedReport, JsValue> {
        let renderer = FamilyBlockRenderer::wedding(&self.config);
        let payload = family_payload(payload)?;
        self.render(&renderer, payload, action)
    }

    /// Render the congregation register
    ///
    /// @param payload - `{ church, options, rows }`
    /// @param action - "view", "print" or "download"
    pub fn register(&mut self, payload: JsValue, action: &str) -> Result<RenderedReport, JsValue> {
        let json = payload_json(payload)?;
        let payload = parse_register_payload(&json).map_err(js_error)?;
        self.render(&RegisterRenderer::new(), payload, action)
    }

    /// File name a report would be saved under, without rendering it
    ///
    /// @param kind - "birthday", "wedding" or "register"
    /// @param payload - the payload the report would be rendered from
    #[wasm_bindgen(js_name = fileName)]
    pub fn file_name(&self, kind: &str, payload: JsValue) -> Result<String, JsValue> {
        let json = payload_json(payload)?;
        let name = match kind {
            "birthday" | "wedding" => {
                let payload = parse_family_payload(&json).map_err(js_error)?;
                let renderer = if kind == "birthday" {
                    FamilyBlockRenderer::birthday(&self.config)
                } else {
                    FamilyBlockRenderer::wedding(&self.config)
                };
                report::file_name(
                    renderer.kind(),
                    &payload.church.short_name(),
                    &renderer.file_stamp(&payload.options),
                )
            }
            "register" => {
                let payload = parse_register_payload(&json).map_err(js_error)?;
                let renderer = RegisterRenderer::new();
                report::file_name(
                    renderer.kind(),
                    &payload.church.short_name(),
                    &renderer.file_stamp(&payload.options),
                )
            }
            other => return Err(JsValue::from_str(&format!("unknown report type '{other}'"))),
        };
        Ok(name)
    }

    fn render<R: RecordRenderer>(
        &mut self,
        renderer: &R,
        payload: ReportPayload<R::Record>,
        action: &str,
    ) -> Result<RenderedReport, JsValue> {
        let action: OutputAction = action.parse().map_err(js_error)?;
        let composer = match self.composer.take() {
            Some(composer) => composer,
            None => {
                let loader = AssetLoader::new().with_source(Box::new(self.fonts.clone()));
                ReportComposer::new(self.config.clone(), &loader)
            }
        };
        let composer = self.composer.insert(composer);
        let output = composer
            .render(
                renderer,
                &payload.records,
                &payload.church,
                &payload.options,
                action,
            )
            .map_err(js_error)?;
        Ok(RenderedReport { output })
    }
}

fn payload_json(payload: JsValue) -> Result<String, JsValue> {
    if let Some(text) = payload.as_string() {
        return Ok(text);
    }
    let value: serde_json::Value = serde_wasm_bindgen::from_value(payload)?;
    Ok(value.to_string())
}

fn family_payload(payload: JsValue) -> Result<ReportPayload<report::FamilyGroup>, JsValue> {
    let json = payload_json(payload)?;
    parse_family_payload(&json).map_err(js_error)
}

/// Date and script helpers for report screens
#[wasm_bindgen]
pub struct TamilFormatter;

#[wasm_bindgen]
impl TamilFormatter {
    /// Format a report window (e.g., "From 01-05 to 31-05")
    ///
    /// @param from - `YYYY-MM-DD`
    /// @param to - `YYYY-MM-DD`
    #[wasm_bindgen(js_name = formatDateRange)]
    pub fn format_date_range(from: &str, to: &str) -> Result<String, JsValue> {
        tamil_text::format_iso_range(from, to).map_err(js_error)
    }

    /// Tamil month heading (e.g., "மே 2025")
    ///
    /// @param date - `YYYY-MM-DD`
    #[wasm_bindgen(js_name = formatMonthYear)]
    pub fn format_month_year(date: &str) -> Result<String, JsValue> {
        let date = tamil_text::parse_iso_date(date).map_err(js_error)?;
        Ok(tamil_text::format_tamil_month_year(date))
    }

    /// Whether text contains Tamil and will be drawn as an image
    #[wasm_bindgen(js_name = containsTamil)]
    pub fn contains_tamil(text: &str) -> bool {
        tamil_text::contains_tamil(text)
    }
}

/// A rendered report and what to do with it
#[wasm_bindgen]
pub struct RenderedReport {
    output: ReportOutput,
}

#[wasm_bindgen]
impl RenderedReport {
    /// PDF bytes (Uint8Array)
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.output.bytes.as_slice())
    }

    /// `{reportType}_{churchShortName}_{dateOrYear}.pdf`
    #[wasm_bindgen(getter, js_name = fileName)]
    pub fn file_name(&self) -> String {
        self.output.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn pages(&self) -> usize {
        self.output.pages
    }

    #[wasm_bindgen(getter)]
    pub fn action(&self) -> String {
        let action = match self.output.action {
            OutputAction::View => "view",
            OutputAction::Print => "print",
            OutputAction::Download => "download",
        };
        action.to_string()
    }

    /// Open, print or download the PDF in the current browser window
    ///
    /// The object URL is revoked once the browser is done with it; a print
    /// window closes itself after the print dialog.
    pub fn deliver(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let url = self.object_url()?;
        let plan = Delivery::for_action(self.output.action);

        if !plan.opens_window {
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let anchor: web_sys::HtmlAnchorElement =
                document.create_element("a")?.dyn_into()?;
            anchor.set_href(&url);
            anchor.set_download(&self.output.file_name);
            anchor.click();
            revoke(&url);
            return Ok(());
        }

        let Some(opened) = window.open_with_url_and_target(&url, "_blank")? else {
            // popup blocked
            revoke(&url);
            return Err(JsValue::from_str("could not open a window for the report"));
        };

        if plan.prints {
            let printing = opened.clone();
            once_on(&opened, "load", move || {
                if let Err(e) = printing.print() {
                    web_sys::console::warn_2(&JsValue::from_str("print failed:"), &e);
                }
            })?;
        }
        match plan.revoke {
            RevokeAt::AfterPrint => {
                let closing = opened.clone();
                let close = plan.closes_after_print;
                once_on(&opened, "afterprint", move || {
                    if close {
                        if let Err(e) = closing.close() {
                            web_sys::console::warn_2(&JsValue::from_str("close failed:"), &e);
                        }
                    }
                    revoke(&url);
                })?;
            }
            RevokeAt::WindowLoaded => {
                once_on(&opened, "load", move || revoke(&url))?;
            }
            RevokeAt::Immediately => revoke(&url),
        }
        Ok(())
    }

    fn object_url(&self) -> Result<String, JsValue> {
        let parts = js_sys::Array::of1(&self.bytes());
        #[allow(unused_mut)]
        let mut options = web_sys::BlobPropertyBag::new();
        options.type_(ReportOutput::MIME_TYPE);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        web_sys::Url::create_object_url_with_blob(&blob)
    }
}

/// When the object URL backing a delivered report is released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevokeAt {
    /// Right after the download anchor is clicked
    Immediately,
    /// Once the opened window has loaded the document
    WindowLoaded,
    /// After the print dialog closes
    AfterPrint,
}

/// Browser steps for one output action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Delivery {
    opens_window: bool,
    prints: bool,
    closes_after_print: bool,
    revoke: RevokeAt,
}

impl Delivery {
    fn for_action(action: OutputAction) -> Self {
        match action {
            OutputAction::View => Delivery {
                opens_window: true,
                prints: false,
                closes_after_print: false,
                revoke: RevokeAt::WindowLoaded,
            },
            OutputAction::Print => Delivery {
                opens_window: true,
                prints: true,
                closes_after_print: true,
                revoke: RevokeAt::AfterPrint,
            },
            OutputAction::Download => Delivery {
                opens_window: false,
                prints: false,
                closes_after_print: false,
                revoke: RevokeAt::Immediately,
            },
        }
    }
}

fn once_on(
    window: &web_sys::Window,
    event: &str,
    callback: impl FnOnce() + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::once_into_js(callback);
    window.add_event_listener_with_callback(event, callback.unchecked_ref())
}

fn revoke(url: &str) {
    if let Err(e) = web_sys::Url::revoke_object_url(url) {
        web_sys::console::warn_2(&JsValue::from_str("revoking report URL failed:"), &e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    const PAYLOAD: &str = r#"{
        "church": { "churchName": "CSI Christ Church", "shortName": "CCC" },
        "options": { "fromDate": "2025-05-01", "toDate": "2025-05-31" },
        "families": [
            { "family": { "familyId": 1, "headName": "J. Paul" },
              "members": [ { "memberId": 7, "name": "Esther", "isCelebrant": true } ] }
        ]
    }"#;

    #[wasm_bindgen_test]
    fn test_birthday_with_builtin_fonts() {
        let mut engine = ReportEngine::new("{}").unwrap();
        let report = engine
            .birthday(JsValue::from_str(PAYLOAD), "download")
            .unwrap();
        assert_eq!(report.file_name(), "birthday_CCC_01-05-2025.pdf");
        assert_eq!(report.pages(), 1);
        assert_eq!(report.action(), "download");
    }

    #[wasm_bindgen_test]
    fn test_file_name_without_rendering() {
        let engine = ReportEngine::new("{}").unwrap();
        assert_eq!(
            engine
                .file_name("wedding", JsValue::from_str(PAYLOAD))
                .unwrap(),
            "wedding_CCC_01-05-2025.pdf"
        );
        assert!(engine.file_name("census", JsValue::from_str(PAYLOAD)).is_err());
    }

    #[wasm_bindgen_test]
    fn test_print_closes_window_and_every_action_releases_url() {
        let print = Delivery::for_action(OutputAction::Print);
        assert!(print.opens_window && print.prints && print.closes_after_print);
        assert_eq!(print.revoke, RevokeAt::AfterPrint);

        let view = Delivery::for_action(OutputAction::View);
        assert!(view.opens_window && !view.prints && !view.closes_after_print);
        assert_eq!(view.revoke, RevokeAt::WindowLoaded);

        let download = Delivery::for_action(OutputAction::Download);
        assert!(!download.opens_window && !download.prints);
        assert_eq!(download.revoke, RevokeAt::Immediately);
    }

    #[wasm_bindgen_test]
    fn test_formatter() {
        assert_eq!(
            TamilFormatter::format_date_range("2025-05-01", "2025-05-31").unwrap(),
            "From 01-05 to 31-05"
        );
        assert!(TamilFormatter::contains_tamil("மே"));
        assert!(!TamilFormatter::contains_tamil("May"));
    }

    #[wasm_bindgen_test]
    fn test_unknown_action_is_rejected() {
        let mut engine = ReportEngine::new("{}").unwrap();
        assert!(engine.wedding(JsValue::from_str(PAYLOAD), "fax").is_err());
    }
}

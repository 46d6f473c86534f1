//! Script-aware font selection
//!
//! Every text run is classified once into a [`RunStyle`]; a [`FontTable`]
//! maps the style to a concrete font handle. Complex-script runs are
//! rasterized, so their handle is only used when rasterization fails.

use pdf_core::{FontFamilyId, FontHandle};
use tamil_text::{detect_complex_script, ComplexScript, GlyphWeight};

/// How a run of text is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStyle {
    Plain,
    Bold,
    /// Highlighted run, e.g. a celebrant's name
    Emphasis,
    /// Needs shaping; drawn through the rasterizer
    Script {
        script: ComplexScript,
        bold: bool,
        emphasis: bool,
    },
}

/// Classify a run: complex script first, then emphasis, then bold or plain
pub fn classify(text: &str, bold: bool, emphasis: bool) -> RunStyle {
    if let Some(script) = detect_complex_script(text) {
        return RunStyle::Script {
            script,
            bold,
            emphasis,
        };
    }
    if emphasis {
        RunStyle::Emphasis
    } else if bold {
        RunStyle::Bold
    } else {
        RunStyle::Plain
    }
}

/// Whether the run must go through the rasterizer instead of a PDF font
pub fn should_rasterize(text: &str) -> bool {
    matches!(classify(text, false, false), RunStyle::Script { .. })
}

/// Weight hint for the rasterizer; emphasis renders bold
pub fn raster_weight(style: RunStyle) -> GlyphWeight {
    match style {
        RunStyle::Script { bold, emphasis, .. } if bold || emphasis => GlyphWeight::Bold,
        RunStyle::Bold | RunStyle::Emphasis => GlyphWeight::Bold,
        _ => GlyphWeight::Regular,
    }
}

/// Lookup table from run style to registered font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontTable {
    pub latin: FontFamilyId,
    /// Embedded script font, used when a script run cannot be rasterized
    pub script: Option<FontFamilyId>,
}

impl FontTable {
    pub fn new(latin: FontFamilyId, script: Option<FontFamilyId>) -> Self {
        Self { latin, script }
    }

    pub fn lookup(&self, style: RunStyle) -> FontHandle {
        match style {
            RunStyle::Plain => self.latin.regular(),
            RunStyle::Bold | RunStyle::Emphasis => self.latin.bold(),
            RunStyle::Script { bold, .. } => {
                let family = self.script.unwrap_or(self.latin);
                if bold {
                    family.bold()
                } else {
                    family.regular()
                }
            }
        }
    }

    /// Font for a run with the given flags
    pub fn select_font(&self, text: &str, bold: bool, emphasis: bool) -> FontHandle {
        self.lookup(classify(text, bold, emphasis))
    }

    /// Last-resort font for retrying a failed draw
    pub fn plain(&self) -> FontHandle {
        self.latin.regular()
    }
}

//! Standard Type1 fonts that every PDF viewer ships
//!
//! Used when no TrueType font could be loaded. Only WinAnsi text can be
//! shown; anything else is replaced with `?`.

use crate::FontWeight;
use lopdf::{Dictionary, Object};

/// Times-Roman advance widths for ASCII 32..=126 (1/1000 em)
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 48-63
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // 64-79
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // 80-95
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // 96-111
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // 112-126
];

/// Times-Bold advance widths for ASCII 32..=126 (1/1000 em)
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500, // 48-63
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, // 64-79
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500, // 80-95
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, // 96-111
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520, // 112-126
];

/// Width used for Latin-1 characters outside the ASCII tables
const DEFAULT_WIDTH: u16 = 500;

/// Built-in font families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFont {
    /// Times-Roman / Times-Bold
    Times,
}

impl BuiltinFont {
    /// PostScript name of the variant
    pub fn base_font(self, weight: FontWeight) -> &'static str {
        match (self, weight) {
            (BuiltinFont::Times, FontWeight::Regular) => "Times-Roman",
            (BuiltinFont::Times, FontWeight::Bold) => "Times-Bold",
        }
    }

    fn widths(self, weight: FontWeight) -> &'static [u16; 95] {
        match (self, weight) {
            (BuiltinFont::Times, FontWeight::Regular) => &TIMES_ROMAN_WIDTHS,
            (BuiltinFont::Times, FontWeight::Bold) => &TIMES_BOLD_WIDTHS,
        }
    }

    /// Advance of a single character in 1/1000 em, after WinAnsi substitution
    pub fn char_width(self, weight: FontWeight, c: char) -> u16 {
        let c = to_win_ansi(c);
        let code = c as u32;
        if (32..=126).contains(&code) {
            self.widths(weight)[(code - 32) as usize]
        } else {
            DEFAULT_WIDTH
        }
    }

    /// Text width in points for a given font size
    pub fn text_width_points(self, weight: FontWeight, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| self.char_width(weight, c) as u32)
            .sum();
        units as f32 / 1000.0 * font_size
    }

    /// Font dictionary for the variant
    pub fn to_pdf_dictionary(self, weight: FontWeight) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            (
                "BaseFont",
                Object::Name(self.base_font(weight).as_bytes().to_vec()),
            ),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ])
    }
}

/// Map a character onto the printable WinAnsi range used here
fn to_win_ansi(c: char) -> char {
    match c as u32 {
        32..=126 | 160..=255 => c,
        _ if c.is_whitespace() => ' ',
        _ => '?',
    }
}

/// Encode text as a PDF literal string for a simple font
pub fn encode_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars().map(to_win_ansi) {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) > 126 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(')');
    out
}

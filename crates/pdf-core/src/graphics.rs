//! Path operators for lines and rectangles

use crate::{LineStyle, Point, Rect};

/// Format a coordinate for a content stream: at most 3 decimals, no trailing zeros
pub(crate) fn fmt_num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{rounded:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn stroke_prefix(style: &LineStyle) -> String {
    format!(
        "{} {} {} RG\n{} w\n",
        fmt_num(style.color.r as f64),
        fmt_num(style.color.g as f64),
        fmt_num(style.color.b as f64),
        fmt_num(style.width)
    )
}

/// Generate operators to stroke a straight line
pub fn generate_line_operators(from: Point, to: Point, style: &LineStyle) -> Vec<u8> {
    format!(
        "q\n{}{} {} m\n{} {} l\nS\nQ\n",
        stroke_prefix(style),
        fmt_num(from.x),
        fmt_num(from.y),
        fmt_num(to.x),
        fmt_num(to.y)
    )
    .into_bytes()
}

/// Generate operators to stroke or fill a rectangle
pub fn generate_rect_operators(rect: Rect, border_only: bool, style: &LineStyle) -> Vec<u8> {
    let paint = if border_only {
        stroke_prefix(style)
    } else {
        format!(
            "{} {} {} rg\n",
            fmt_num(style.color.r as f64),
            fmt_num(style.color.g as f64),
            fmt_num(style.color.b as f64)
        )
    };
    format!(
        "q\n{}{} {} {} {} re\n{}\nQ\n",
        paint,
        fmt_num(rect.x),
        fmt_num(rect.y),
        fmt_num(rect.width),
        fmt_num(rect.height),
        if border_only { "S" } else { "f" }
    )
    .into_bytes()
}

//! Text rendering utilities

use crate::document::Color;
use crate::graphics::fmt_num;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
    /// Counter-clockwise rotation in degrees
    pub angle: f64,
}

/// Generate PDF operators for a text run
///
/// Unrotated runs are positioned with `Td`; rotated runs use a full text
/// matrix (`Tm`) with the origin at `(x, y)`.
///
/// # Arguments
/// * `encoded` - Encoded string operand, hex (`<0024>`) or literal (`(abc)`)
/// * `x` - X coordinate in points (from left)
/// * `y` - Y coordinate in points (from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(encoded: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        fmt_num(ctx.color.r as f64),
        fmt_num(ctx.color.g as f64),
        fmt_num(ctx.color.b as f64)
    ));
    ops.push_str(&format!(
        "/{} {} Tf\n",
        ctx.font_name,
        fmt_num(ctx.font_size as f64)
    ));

    if ctx.angle == 0.0 {
        ops.push_str(&format!("{} {} Td\n", fmt_num(x), fmt_num(y)));
    } else {
        let (sin, cos) = ctx.angle.to_radians().sin_cos();
        ops.push_str(&format!(
            "{} {} {} {} {} {} Tm\n",
            fmt_num(cos),
            fmt_num(sin),
            fmt_num(-sin),
            fmt_num(cos),
            fmt_num(x),
            fmt_num(y)
        ));
    }

    ops.push_str(&format!("{encoded} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(angle: f64) -> TextRenderContext {
        TextRenderContext {
            font_name: "F1".to_string(),
            font_size: 12.0,
            color: Color::black(),
            angle,
        }
    }

    #[test]
    fn test_generate_text_operators() {
        let ops = generate_text_operators("(Hello)", 100.0, 700.0, &ctx(0.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("0 0 0 rg"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("100 700 Td"));
        assert!(ops_str.contains("(Hello) Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_rotated() {
        let ops = generate_text_operators("<0024>", 50.0, 400.0, &ctx(90.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("0 1 -1 0 50 400 Tm"));
        assert!(!ops_str.contains("Td"));
    }

    #[test]
    fn test_generate_text_operators_with_color() {
        let mut context = ctx(0.0);
        context.color = Color::rgb(1.0, 0.5, 0.0);
        let ops = generate_text_operators("(x)", 0.0, 0.0, &context);
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("1 0.5 0 rg"));
    }

    #[test]
    fn test_fractional_positions_are_rounded() {
        let ops = generate_text_operators("(x)", 10.123456, 689.6000000000001, &ctx(0.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("10.123 689.6 Td"));
    }
}

use ab_glyph::{Font, PxScale, ScaleFont};

use crate::font::FontHandle;
use crate::primitives::{FontWeight, TextStyle};

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Measure text width and height in points using ab_glyph.
pub fn measure_text<F: Font>(font: &F, text: &str, size_pt: f64) -> TextMetrics {
    // SVG font-size is the em size; PxScale is the ascent-to-descent height.
    let px = match font.units_per_em() {
        Some(upem) => size_pt as f32 * font.height_unscaled() / upem,
        None => size_pt as f32,
    };
    let scaled = font.as_scaled(PxScale::from(px));

    let mut width: f32 = 0.0;
    let mut prev_glyph_id = None;
    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = prev_glyph_id {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph_id = Some(glyph_id);
    }

    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let height = ascent - descent;

    TextMetrics { width: width as f64, height: height as f64, ascent: ascent as f64 }
}

/// Advance width of one character, in ems, for a Helvetica-like face.
fn advance_em(ch: char) -> f64 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.25,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | ' ' | '/' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' => 0.83,
        '0'..='9' => 0.556,
        'A'..='Z' => 0.667,
        c if c.is_ascii() => 0.5,
        // superscripts, Greek, math symbols
        _ => 0.6,
    }
}

/// Per-character width estimate for hosts without a usable sans-serif font.
pub fn estimate_text(text: &str, size_pt: f64) -> TextMetrics {
    let ems: f64 = text.chars().map(advance_em).sum();
    TextMetrics { width: ems * size_pt, height: size_pt * 1.15, ascent: size_pt * 0.9 }
}

/// Measure text with a TextStyle, selecting the correct font face.
///
/// Without fonts the width is estimated.
pub fn measure_styled(fonts: Option<&FontHandle>, text: &str, style: &TextStyle) -> TextMetrics {
    if let Some(fonts) = fonts {
        return measure_text(fonts.select(style.weight, style.style), text, style.size);
    }
    let mut m = estimate_text(text, style.size);
    if style.weight == FontWeight::Bold {
        m.width *= 1.06;
    }
    m
}

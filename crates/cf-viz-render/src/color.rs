use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn parse_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Like [`parse_hex`](Self::parse_hex), falling back to black.
    pub fn hex(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or(Self::BLACK)
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            self.to_hex()
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation between two colors (for colormaps).
    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }

    /// Black or white, whichever reads better on top of `self`.
    pub fn contrasting_text(&self) -> Color {
        let luma = 0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64;
        if luma < 140.0 { Color::WHITE } else { Color::BLACK }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid colour {s:?}, want #rrggbb")))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

// --- Palettes ---

/// CMS 10-colour palette (Petroff); the first two colours draw the ratio inputs.
pub const CMS_PETROFF10: &[&str] = &[
    "#3f90da", "#ffa90e", "#bd1f01", "#94a4a2", "#832db6", "#a96b59", "#e76300", "#b9ac70",
    "#717581", "#92dadd",
];

pub const CMS_PETROFF6: &[&str] =
    &["#5790fc", "#f89c20", "#e42536", "#964a8b", "#9c9ca1", "#7a21dd"];

pub const TABLEAU10: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Colours of a named palette, `None` for an unknown name.
pub fn palette_colors(name: &str) -> Option<Vec<Color>> {
    let strs = match name {
        "cms_petroff10" => CMS_PETROFF10,
        "cms_petroff6" => CMS_PETROFF6,
        "tableau10" => TABLEAU10,
        _ => return None,
    };
    Some(strs.iter().map(|s| Color::hex(s)).collect())
}

// --- Sequential colormap for grid plots ---

const VIRIDIS: [&str; 9] = [
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];

/// Viridis colormap: 0.0 → dark purple, 1.0 → yellow.
pub fn viridis(t: f64) -> Color {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    Color::lerp(Color::hex(VIRIDIS[i]), Color::hex(VIRIDIS[i + 1]), scaled - i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        let c = Color::hex("#3F90DA");
        assert_eq!((c.r, c.g, c.b), (0x3f, 0x90, 0xda));
        assert!((c.a - 1.0).abs() < 1e-9);
        assert!(Color::parse_hex("#12345").is_none());
        assert!(Color::parse_hex("zzzzzz").is_none());
        assert!(Color::parse_hex("#ééé").is_none());
    }

    #[test]
    fn svg_fill_alpha() {
        assert_eq!(Color::rgb(63, 144, 218).to_svg_fill(), "#3f90da");
        let c = Color::rgb(29, 78, 216).with_alpha(0.5);
        assert_eq!(c.to_svg_fill(), "rgba(29,78,216,0.500)");
    }

    #[test]
    fn palette_lookup() {
        let petroff = palette_colors("cms_petroff10").unwrap();
        assert_eq!(petroff.len(), 10);
        assert_eq!(petroff[1].to_hex(), "#ffa90e");
        assert_eq!(palette_colors("tableau10").unwrap().len(), 10);
        assert!(palette_colors("rainbow").is_none());
    }

    #[test]
    fn viridis_endpoints_and_clamping() {
        assert_eq!(viridis(0.0).to_hex(), "#440154");
        assert_eq!(viridis(1.0).to_hex(), "#fde725");
        assert_eq!(viridis(0.5).to_hex(), "#21918c");
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
        assert_eq!(viridis(f64::NAN), viridis(0.0));
    }

    #[test]
    fn text_contrast() {
        assert_eq!(viridis(0.0).contrasting_text(), Color::WHITE);
        assert_eq!(viridis(1.0).contrasting_text(), Color::BLACK);
    }
}

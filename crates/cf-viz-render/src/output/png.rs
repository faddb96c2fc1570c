use crate::RenderError;

/// Rasterize an SVG at `dpi` on a white background.
pub fn svg_to_png(svg: &str, dpi: u32) -> crate::Result<Vec<u8>> {
    let opt = super::usvg_options();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| RenderError::Png(e.to_string()))?;

    let scale = dpi as f32 / 72.0;
    let size = tree.size();
    let w = (size.width() * scale).ceil() as u32;
    let h = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| RenderError::Png(format!("cannot allocate a {w}x{h} pixmap")))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| RenderError::Png(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_with_dpi() {
        let svg = concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="72" height="36">"#,
            r#"<rect width="10" height="10"/></svg>"#
        );
        let png = svg_to_png(svg, 144).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        // IHDR width and height, big endian
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 144);
        assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 72);
    }

    #[test]
    fn malformed_svg_is_an_error() {
        assert!(matches!(svg_to_png("<svg", 72), Err(RenderError::Png(_))));
    }
}

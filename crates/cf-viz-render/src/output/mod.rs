#[cfg(feature = "pdf")]
pub mod pdf;
#[cfg(feature = "png")]
pub mod png;

use std::path::Path;

/// Write rendered bytes, creating missing parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> crate::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

/// Parse options shared by the raster and PDF back ends: the system fonts text is measured with.
#[cfg(any(feature = "png", feature = "pdf"))]
fn usvg_options() -> usvg::Options<'static> {
    usvg::Options { fontdb: crate::font::system_database(), ..Default::default() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_file_creates_parents() {
        let dir = std::env::temp_dir().join(format!(
            "cf_viz_render_out_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let path = dir.join("plots").join("a.svg");
        write_file(&path, b"<svg/>").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<svg/>");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

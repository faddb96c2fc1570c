//! # cf-viz-render
//!
//! Renders cutflow artifacts to SVG, and from SVG to PNG (`png` feature) or
//! PDF (`pdf` feature).

pub mod canvas;
pub mod color;
pub mod config;
pub mod font;
pub mod header;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;
pub mod theme;

use std::path::Path;
use std::str::FromStr;

use cf_viz::grid::GRID_SCHEMA;
use cf_viz::ratio::RATIO_SCHEMA;
use cf_viz::{GridArtifact, RatioArtifact};
use config::VizConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("unsupported output format: {0}")]
    UnknownFormat(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
    #[cfg(feature = "pdf")]
    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// A renderable artifact.
#[derive(Debug, Clone)]
pub enum Artifact {
    Ratio(RatioArtifact),
    Grid(GridArtifact),
}

impl Artifact {
    /// Parse an artifact JSON, dispatching on its `schema_version`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let schema = value.get("schema_version").and_then(|v| v.as_str()).unwrap_or_default();
        match schema {
            RATIO_SCHEMA => Ok(Self::Ratio(serde_json::from_value(value)?)),
            GRID_SCHEMA => Ok(Self::Grid(serde_json::from_value(value)?)),
            other => Err(RenderError::UnknownKind(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ratio(_) => "ratio",
            Self::Grid(_) => "grid",
        }
    }
}

/// Image format of a rendered plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            other => Err(RenderError::UnknownFormat(other.to_string())),
        }
    }
}

/// Render an artifact to an SVG string.
pub fn render_svg(artifact: &Artifact, config: &VizConfig) -> Result<String> {
    match artifact {
        Artifact::Ratio(art) => plots::ratio::render(art, config),
        Artifact::Grid(art) => plots::grid::render(art, config),
    }
}

/// Convert a rendered SVG into `format`.
pub fn encode(svg: String, format: OutputFormat, config: &VizConfig) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Svg => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        OutputFormat::Png => output::png::svg_to_png(&svg, config.output.dpi),
        #[cfg(feature = "pdf")]
        OutputFormat::Pdf => output::pdf::svg_to_pdf(&svg),
        #[allow(unreachable_patterns)]
        other => {
            let _ = config;
            Err(RenderError::UnknownFormat(format!(
                "{} (built without the `{}` feature)",
                other.extension(),
                other.extension()
            )))
        }
    }
}

/// Render an artifact to bytes in the specified format.
pub fn render_to_bytes(
    artifact: &Artifact,
    format: OutputFormat,
    config: &VizConfig,
) -> Result<Vec<u8>> {
    let svg = render_svg(artifact, config)?;
    encode(svg, format, config)
}

/// Render an artifact to a file (format inferred from extension).
///
/// Nothing is written unless rendering succeeds; missing parent directories
/// are created.
pub fn render_to_file(artifact: &Artifact, path: &Path, config: &VizConfig) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let bytes = render_to_bytes(artifact, format, config)?;
    output::write_file(path, &bytes)
}

//! Output file naming and the render-then-write step shared by the plot commands.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use cf_viz_render::config::VizConfig;
use cf_viz_render::{Artifact, OutputFormat, output, render_to_bytes};

/// Where one plot goes and in which format.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl PlotTarget {
    /// Resolve the output file of a plot command.
    ///
    /// The format comes from `--format`, else a known extension on the explicit name, else
    /// `output.format` of the styling config. The extension of the file always matches it.
    pub fn resolve(
        plots_dir: &Path,
        explicit_name: Option<&str>,
        default_name: &str,
        format_flag: Option<&str>,
        viz: &VizConfig,
    ) -> Result<Self> {
        let flag = format_flag
            .map(str::parse::<OutputFormat>)
            .transpose()
            .context("invalid --format")?;

        let name = explicit_name.filter(|n| !n.trim().is_empty()).unwrap_or(default_name);
        let (stem, ext_format) = split_known_extension(name);
        let format = match (flag, ext_format) {
            (Some(f), _) => f,
            (None, Some(f)) => f,
            (None, None) => viz
                .output
                .format
                .parse()
                .context("invalid output.format in the viz config")?,
        };
        let file = format!("{stem}.{}", format.extension());
        Ok(Self { path: plots_dir.join(file), format })
    }
}

/// Split `name` into stem and format when it ends in `.svg`, `.png` or `.pdf`.
fn split_known_extension(name: &str) -> (&str, Option<OutputFormat>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => match ext.parse::<OutputFormat>() {
            Ok(format) => (stem, Some(format)),
            Err(_) => (name, None),
        },
        _ => (name, None),
    }
}

/// Render first, then create the plots directory and write the image.
///
/// A rendering failure leaves the file system untouched.
pub fn save_plot(artifact: &Artifact, target: &PlotTarget, viz: &VizConfig) -> Result<()> {
    let bytes = render_to_bytes(artifact, target.format, viz)
        .with_context(|| format!("cannot render {} plot", artifact.kind()))?;
    output::write_file(&target.path, &bytes)
        .with_context(|| format!("cannot write {}", target.path.display()))?;
    println!("Saved {} plot to {}", artifact.kind(), target.path.display());
    Ok(())
}

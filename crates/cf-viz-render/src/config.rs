use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::RenderError;
use crate::color::Color;
use crate::theme::BuiltinTheme;

/// Top-level visualization configuration (YAML or programmatic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub theme: String,
    /// Ratio-plot figure size; the grid plot has its own under `grid`.
    pub figure: FigureConfig,
    pub font: FontConfig,
    pub axes: AxesConfig,
    pub gridlines: GridlineConfig,
    pub experiment: ExperimentConfig,
    pub palette: String,
    /// Draw the artifact title above the plot.
    pub show_title: bool,
    pub output: OutputConfig,
    pub ratio: RatioConfig,
    pub grid: GridPlotConfig,
}

impl Default for VizConfig {
    fn default() -> Self {
        BuiltinTheme::Cms.base_config()
    }
}

impl VizConfig {
    pub fn palette_colors(&self) -> Vec<Color> {
        crate::color::palette_colors(&self.palette).unwrap_or_default()
    }

    /// `i`-th palette colour, wrapping around.
    pub fn series_color(&self, i: usize) -> Color {
        let palette = self.palette_colors();
        if palette.is_empty() { Color::BLACK } else { palette[i % palette.len()] }
    }

    fn validate(&self) -> crate::Result<()> {
        if crate::color::palette_colors(&self.palette).is_none() {
            return Err(RenderError::Config(format!("unknown palette '{}'", self.palette)));
        }
        for (what, fig) in [("figure", &self.figure), ("grid.figure", &self.grid.figure)] {
            if !(fig.width > 0.0 && fig.height > 0.0) {
                return Err(RenderError::Config(format!(
                    "{what} must have positive size, got {}x{}",
                    fig.width, fig.height
                )));
            }
        }
        if !(self.ratio.ratio_fraction > 0.0 && self.ratio.ratio_fraction < 1.0) {
            return Err(RenderError::Config(format!(
                "ratio.ratio_fraction must be in (0, 1), got {}",
                self.ratio.ratio_fraction
            )));
        }
        if self.output.dpi == 0 {
            return Err(RenderError::Config("output.dpi must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for FigureConfig {
    fn default() -> Self {
        // 8" x 8"
        Self { width: 576.0, height: 576.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub size: f64,
    pub label_size: f64,
    pub tick_size: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Helvetica, Arial, sans-serif".into(),
            size: 10.0,
            label_size: 12.0,
            tick_size: 9.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AxesConfig {
    pub tick_direction: String,
    pub show_top_ticks: bool,
    pub show_right_ticks: bool,
    pub tick_length: f64,
    pub minor_tick_length: f64,
    /// Rotation of categorical (bin label) tick labels, degrees; negative
    /// turns them counter-clockwise.
    pub category_label_angle: f64,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            tick_direction: "in".into(),
            show_top_ticks: true,
            show_right_ticks: true,
            tick_length: 6.0,
            minor_tick_length: 3.0,
            category_label_angle: -45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridlineConfig {
    pub show: bool,
    pub color: Color,
    pub alpha: f64,
}

impl Default for GridlineConfig {
    fn default() -> Self {
        Self { show: false, color: Color::hex("#CBD5E1"), alpha: 0.55 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub name: String,
    pub status: String,
    pub sqrt_s_tev: f64,
    pub lumi_fb_inv: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self { name: "CMS".into(), status: "Simulation".into(), sqrt_s_tev: 13.6, lumi_fb_inv: 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when neither the command line nor the file name picks one.
    pub format: String,
    pub dpi: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: "pdf".into(), dpi: 150 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatioConfig {
    /// Share of the content height given to the ratio panel.
    pub ratio_fraction: f64,
    pub panel_gap: f64,
    pub line_width: f64,
    pub marker_size: f64,
    pub y_label: String,
    pub ratio_label: String,
    pub reference_color: Color,
    pub legend_frame: bool,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            ratio_fraction: 0.3,
            panel_gap: 6.0,
            line_width: 1.5,
            marker_size: 2.2,
            y_label: "Fraction of events".into(),
            ratio_label: "Ratio".into(),
            reference_color: Color::hex("#ff0000"),
            legend_frame: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPlotConfig {
    pub figure: FigureConfig,
    /// Print each cell value inside the cell.
    pub annotate: bool,
    pub colorbar_width: f64,
}

impl Default for GridPlotConfig {
    fn default() -> Self {
        // 9" x 7"
        Self {
            figure: FigureConfig { width: 648.0, height: 504.0 },
            annotate: false,
            colorbar_width: 14.0,
        }
    }
}

/// Resolve a VizConfig from a theme name and an optional YAML string.
///
/// The theme is taken from `theme`, else from the YAML `theme:` key, else
/// `cms`. Keys present in the YAML override the theme's values; absent keys
/// keep them.
pub fn resolve_config(theme: Option<&str>, user_yaml: Option<&str>) -> crate::Result<VizConfig> {
    let overlay = match user_yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml_ng::from_str::<Value>(yaml)
            .map_err(|e| RenderError::Config(e.to_string()))?,
        _ => Value::Null,
    };
    if !matches!(overlay, Value::Null | Value::Mapping(_)) {
        return Err(RenderError::Config("viz config must be a YAML mapping".into()));
    }

    let theme_name = theme
        .map(str::to_string)
        .or_else(|| overlay.get("theme").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| "cms".to_string());
    let theme = BuiltinTheme::parse(&theme_name)
        .ok_or_else(|| RenderError::Config(format!("unknown theme '{theme_name}'")))?;
    let base = theme.base_config();

    let mut merged =
        serde_yaml_ng::to_value(&base).map_err(|e| RenderError::Config(e.to_string()))?;
    merge(&mut merged, overlay);
    let mut config: VizConfig =
        serde_yaml_ng::from_value(merged).map_err(|e| RenderError::Config(e.to_string()))?;
    config.theme = theme.name().to_string();
    config.validate()?;
    tracing::debug!(theme = %config.theme, "resolved viz config");
    Ok(config)
}

/// Overlay `overlay` onto `base`, recursing into mappings.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(b), Value::Mapping(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

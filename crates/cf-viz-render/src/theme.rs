use crate::config::*;

/// Built-in theme presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTheme {
    /// CMS publication style: inward ticks on all sides, "CMS Simulation" header.
    Cms,
    /// No header, outward ticks on the bottom/left only, title on top.
    Minimal,
}

impl BuiltinTheme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cms" => Some(Self::Cms),
            "minimal" => Some(Self::Minimal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cms => "cms",
            Self::Minimal => "minimal",
        }
    }

    pub fn base_config(self) -> VizConfig {
        match self {
            Self::Cms => cms(),
            Self::Minimal => minimal(),
        }
    }
}

fn cms() -> VizConfig {
    VizConfig {
        theme: "cms".into(),
        figure: FigureConfig::default(),
        font: FontConfig::default(),
        axes: AxesConfig::default(),
        gridlines: GridlineConfig::default(),
        experiment: ExperimentConfig::default(),
        palette: "cms_petroff10".into(),
        show_title: false,
        output: OutputConfig::default(),
        ratio: RatioConfig::default(),
        grid: GridPlotConfig::default(),
    }
}

fn minimal() -> VizConfig {
    VizConfig {
        theme: "minimal".into(),
        font: FontConfig { size: 9.0, label_size: 10.0, tick_size: 8.0, ..FontConfig::default() },
        axes: AxesConfig {
            tick_direction: "out".into(),
            show_top_ticks: false,
            show_right_ticks: false,
            tick_length: 4.0,
            minor_tick_length: 2.0,
            ..AxesConfig::default()
        },
        gridlines: GridlineConfig { show: true, ..GridlineConfig::default() },
        experiment: ExperimentConfig {
            name: String::new(),
            status: String::new(),
            sqrt_s_tev: 0.0,
            lumi_fb_inv: 0.0,
        },
        palette: "tableau10".into(),
        show_title: true,
        ..cms()
    }
}

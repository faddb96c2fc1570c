//! cutflow CLI

mod plot;
mod ticks;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use cf_analysis::{GridRequest, HistogramLoader, RatioRequest, build_grid, build_ratio};
use cf_core::{CTau, DEFAULT_ERA, DecayChannel, DecaySelection};
use cf_viz_render::config::{VizConfig, resolve_config};
use cf_viz_render::{Artifact, OutputFormat};

use crate::plot::{PlotTarget, save_plot};

#[derive(Parser)]
#[command(name = "cutflow")]
#[command(about = "cutflow - ratio and grid plots of HSCP cut-flow histograms")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    /// Base directory holding `ntuples/` and `plots/`
    #[arg(long, global = true, default_value = ".")]
    base_dir: PathBuf,

    /// Directory of the input ntuples. Defaults to `<base-dir>/ntuples`.
    #[arg(long, global = true)]
    ntuples_dir: Option<PathBuf>,

    /// Directory plots are written to. Defaults to `<base-dir>/plots`.
    #[arg(long, global = true)]
    plots_dir: Option<PathBuf>,

    /// Directory inside each ntuple holding the histograms; repeat to try several in order.
    /// Defaults to HSCPMiniAODAnalyzer, then HSCPFullAODAnalyzer.
    #[arg(long = "prefix", global = true)]
    prefixes: Vec<String>,

    /// YAML file overriding plot styling.
    #[arg(long, global = true)]
    viz_config: Option<PathBuf>,

    /// Built-in theme (cms, minimal). Overrides the `theme` key of `--viz-config`.
    #[arg(long, global = true)]
    theme: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overlay two cτ points of one histogram and plot their ratio
    Ratio(RatioArgs),

    /// Stack one histogram over many (decay, cτ) points as a 2D colour map
    Grid(GridArgs),

    /// Re-render a plot from an artifact JSON written with `--artifact`
    Render {
        /// Artifact JSON (ratio or grid)
        input: PathBuf,

        /// Output image; format taken from the extension unless `--format` is given
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (pdf, png, svg)
        #[arg(long)]
        format: Option<String>,
    },

    /// List every key of a ROOT file, recursively
    Ls {
        /// ROOT file
        input: PathBuf,
    },
}

#[derive(Args)]
struct RatioArgs {
    /// Histogram to compare
    #[arg(long, default_value = "EventCutFlow")]
    hist_name: String,

    /// Gluino mass in GeV
    #[arg(long, default_value = "1800")]
    gluino_mass: u32,

    /// Neutralino mass in GeV
    #[arg(long, default_value = "1300")]
    neutralino_mass: u32,

    /// cτ of the numerator
    #[arg(long, default_value = "0p1mm")]
    ctau1: String,

    /// cτ of the denominator
    #[arg(long, default_value = "10000mm")]
    ctau2: String,

    /// Decay type (lightDecay, heavyDecay)
    #[arg(long, default_value = "lightDecay")]
    decay_type: String,

    /// Production era
    #[arg(long, default_value = DEFAULT_ERA)]
    era: String,

    #[command(flatten)]
    output: OutputArgs,

    /// Logarithmic y axis on the top panel
    #[arg(long)]
    log_scale: bool,

    /// Comma-separated tick positions of the ratio panel, e.g. `1.5,1,0.5`
    #[arg(long)]
    y_range: Option<String>,

    /// Comma-separated tick positions of the top panel, e.g. `1,0.1,0.01`
    #[arg(long)]
    overlay_y_range: Option<String>,
}

#[derive(Args)]
struct GridArgs {
    /// Histogram to collect
    #[arg(long, default_value = "EventCutFlow")]
    hist_name: String,

    /// Gluino mass in GeV
    #[arg(long, default_value = "1800")]
    gluino_mass: u32,

    /// Neutralino mass in GeV
    #[arg(long, default_value = "1300")]
    neutralino_mass: u32,

    /// Comma-separated cτ values, one row each
    #[arg(long, default_value = "0p1mm,1mm,10mm,100mm,1000mm,10000mm")]
    ctaus: String,

    /// Decay types: lightDecay, heavyDecay or both
    #[arg(long, default_value = "lightDecay")]
    decay_types: String,

    /// Production era
    #[arg(long, default_value = DEFAULT_ERA)]
    era: String,

    #[command(flatten)]
    output: OutputArgs,

    /// Logarithmic colour scale (default)
    #[arg(long)]
    log_scale_z: bool,

    /// Linear colour scale
    #[arg(long, conflicts_with = "log_scale_z")]
    linear_scale_z: bool,

    /// Normalize every row to its first bin
    #[arg(long)]
    normalize: bool,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file name inside the plots directory. Generated from the inputs if omitted.
    #[arg(long)]
    output_name: Option<String>,

    /// Output format (pdf, png, svg). Defaults to the output name's extension, then `pdf`.
    #[arg(long)]
    format: Option<String>,

    /// Also write the plot artifact (JSON) to this path
    #[arg(long)]
    artifact: Option<PathBuf>,
}

/// Directories and styling shared by the plotting commands.
struct Session {
    loader: HistogramLoader,
    plots_dir: PathBuf,
    viz: VizConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ratio(ref args) => cmd_ratio(&session(&cli)?, args),
        Commands::Grid(ref args) => cmd_grid(&session(&cli)?, args),
        Commands::Render { ref input, ref output, ref format } => {
            let viz = load_viz_config(cli.viz_config.as_deref(), cli.theme.as_deref())?;
            cmd_render(input, output, format.as_deref(), &viz)
        }
        Commands::Ls { ref input } => cmd_ls(input),
    }
}

fn session(cli: &Cli) -> Result<Session> {
    let ntuples_dir = cli.ntuples_dir.clone().unwrap_or_else(|| cli.base_dir.join("ntuples"));
    let plots_dir = cli.plots_dir.clone().unwrap_or_else(|| cli.base_dir.join("plots"));
    let viz = load_viz_config(cli.viz_config.as_deref(), cli.theme.as_deref())?;
    tracing::debug!(
        ntuples = %ntuples_dir.display(),
        plots = %plots_dir.display(),
        theme = %viz.theme,
        "session"
    );
    let mut loader = HistogramLoader::new(ntuples_dir);
    if !cli.prefixes.is_empty() {
        loader = loader.with_prefixes(&cli.prefixes);
    }
    Ok(Session { loader, plots_dir, viz })
}

fn load_viz_config(path: Option<&Path>, theme: Option<&str>) -> Result<VizConfig> {
    let yaml = match path {
        Some(p) => Some(
            std::fs::read_to_string(p)
                .with_context(|| format!("cannot read viz config {}", p.display()))?,
        ),
        None => None,
    };
    resolve_config(theme, yaml.as_deref()).context("invalid plot styling")
}

fn cmd_ratio(session: &Session, args: &RatioArgs) -> Result<()> {
    // Malformed inputs fail before any file is opened. A blank list means no override.
    let ratio_y_ticks = args
        .y_range
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(ticks::parse_tick_list)
        .transpose()
        .context("invalid --y-range")?;
    let overlay_y_ticks = args
        .overlay_y_range
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(ticks::parse_tick_list)
        .transpose()
        .context("invalid --overlay-y-range")?;
    let decay: DecayChannel = args.decay_type.parse()?;

    let request = RatioRequest {
        hist_name: args.hist_name.clone(),
        gluino_mass: args.gluino_mass,
        neutralino_mass: args.neutralino_mass,
        numerator: CTau::new(args.ctau1.as_str())?,
        denominator: CTau::new(args.ctau2.as_str())?,
        decay,
        era: args.era.clone(),
        log_scale: args.log_scale,
        ratio_y_ticks,
        overlay_y_ticks,
    };
    let target = PlotTarget::resolve(
        &session.plots_dir,
        args.output.output_name.as_deref(),
        &request.output_name(),
        args.output.format.as_deref(),
        &session.viz,
    )?;

    tracing::info!(
        "Ratio of {}: {} / {} ({})",
        request.hist_name,
        request.numerator,
        request.denominator,
        request.decay
    );
    let artifact = build_ratio(&session.loader, &request)?;

    let json = serde_json::to_value(&artifact)?;
    save_plot(&Artifact::Ratio(artifact), &target, &session.viz)?;
    write_artifact(args.output.artifact.as_deref(), json)
}

fn cmd_grid(session: &Session, args: &GridArgs) -> Result<()> {
    let decays: DecaySelection = args.decay_types.parse()?;
    let ctaus = CTau::parse_list(&args.ctaus).context("invalid --ctaus")?;

    let request = GridRequest {
        hist_name: args.hist_name.clone(),
        gluino_mass: args.gluino_mass,
        neutralino_mass: args.neutralino_mass,
        ctaus,
        decays,
        era: args.era.clone(),
        normalize: args.normalize,
        log_z: args.log_scale_z || !args.linear_scale_z,
    };
    let target = PlotTarget::resolve(
        &session.plots_dir,
        args.output.output_name.as_deref(),
        &request.output_name(),
        args.output.format.as_deref(),
        &session.viz,
    )?;

    tracing::info!(
        "Grid of {}: {} cτ points, decays {}",
        request.hist_name,
        request.ctaus.len(),
        request.decays.as_str()
    );
    let artifact = build_grid(&session.loader, &request)?;

    let json = serde_json::to_value(&artifact)?;
    save_plot(&Artifact::Grid(artifact), &target, &session.viz)?;
    write_artifact(args.output.artifact.as_deref(), json)
}

fn cmd_render(input: &Path, output: &Path, format: Option<&str>, viz: &VizConfig) -> Result<()> {
    let format: OutputFormat = match format {
        Some(f) => f.parse()?,
        None => OutputFormat::from_path(output)
            .with_context(|| format!("cannot infer the format of {}", output.display()))?,
    };
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read artifact {}", input.display()))?;
    let artifact = Artifact::from_json(&json)
        .with_context(|| format!("cannot parse artifact {}", input.display()))?;
    tracing::info!("re-rendering {} artifact from {}", artifact.kind(), input.display());

    save_plot(&artifact, &PlotTarget { path: output.to_path_buf(), format }, viz)
}

fn cmd_ls(input: &Path) -> Result<()> {
    let file = cf_root::RootFile::open(input)
        .with_context(|| format!("cannot open {}", input.display()))?;
    let keys = file.list_keys_recursive()?;
    let width = keys.iter().map(|k| k.path.len()).max().unwrap_or(0);
    for key in &keys {
        println!("{:<width$}  {:<16} ;{}", key.path, key.class_name, key.cycle);
    }
    tracing::debug!("{} keys", keys.len());
    Ok(())
}

fn write_artifact(path: Option<&Path>, value: serde_json::Value) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("cannot write artifact {}", path.display()))?;
    tracing::info!("artifact written to {}", path.display());
    Ok(())
}

use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::margins::PlotArea;
use crate::primitives::*;

/// Draw the experiment header above `area`: **CMS** *Simulation* on the left,
/// `√s = 13.6 TeV` (and luminosity, when set) on the right.
pub fn draw_experiment_header(canvas: &mut Canvas, area: &PlotArea, config: &VizConfig) {
    if config.experiment.name.is_empty() {
        return;
    }

    let header_size = config.font.label_size * 1.3;
    let x = area.left;
    let y = area.top - 6.0;

    let bold_style = TextStyle {
        size: header_size,
        weight: FontWeight::Bold,
        anchor: TextAnchor::Start,
        baseline: TextBaseline::Alphabetic,
        ..Default::default()
    };
    canvas.text(x, y, &config.experiment.name, &bold_style);

    let name_w = canvas.measure_text(&config.experiment.name, &bold_style).width;
    if !config.experiment.status.is_empty() {
        let italic_style = TextStyle {
            size: header_size * 0.85,
            style: FontStyle::Italic,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
            ..Default::default()
        };
        canvas.text(x + name_w + 5.0, y, &config.experiment.status, &italic_style);
    }

    let mut info_parts = Vec::new();
    if config.experiment.lumi_fb_inv > 0.0 {
        info_parts.push(format!("{} fb\u{207B}\u{00B9}", config.experiment.lumi_fb_inv));
    }
    if config.experiment.sqrt_s_tev > 0.0 {
        info_parts.push(format!("{} TeV", config.experiment.sqrt_s_tev));
    }
    if !info_parts.is_empty() {
        let info = if info_parts.len() == 1 {
            format!("\u{221A}s = {}", info_parts[0])
        } else {
            format!("{} (\u{221A}s = {})", info_parts[0], info_parts[1])
        };
        let info_style = TextStyle {
            size: config.font.size,
            color: Color::rgb(60, 60, 60),
            anchor: TextAnchor::End,
            baseline: TextBaseline::Alphabetic,
            ..Default::default()
        };
        canvas.text(area.right(), y, &info, &info_style);
    }
}

/// Draw `title` centred at the top of the canvas when the theme asks for it.
pub fn draw_title(canvas: &mut Canvas, title: &str, config: &VizConfig) {
    canvas.set_title(title);
    if !config.show_title || title.is_empty() {
        return;
    }
    let style = TextStyle {
        size: config.font.label_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };
    canvas.text(canvas.width / 2.0, 8.0, title, &style);
}

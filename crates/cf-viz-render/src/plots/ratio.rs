//! Two-panel overlay + ratio plot.

use cf_viz::RatioArtifact;

use crate::RenderError;
use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::{draw_experiment_header, draw_title};
use crate::layout::axes::Axis;
use crate::layout::legend::{LegendEntry, draw_legend};
use crate::layout::margins::PlotArea;
use crate::layout::multi_panel::MainRatioLayout;
use crate::plots::axes_draw::draw_axes;
use crate::primitives::*;

pub fn render(art: &RatioArtifact, config: &VizConfig) -> crate::Result<String> {
    let n_bins = art.numerator.y.len();
    if n_bins == 0 {
        return Err(RenderError::Layout(format!("ratio plot of {} has no bins", art.hist_name)));
    }
    if art.denominator.y.len() != n_bins
        || art.ratio_y.len() != n_bins
        || art.ratio_yerr.len() != n_bins
        || art.bin_edges.len() != n_bins + 1
    {
        return Err(RenderError::Layout(format!(
            "inconsistent ratio artifact: {} numerator bins, {} denominator bins, {} ratio \
             bins, {} edges",
            n_bins,
            art.denominator.y.len(),
            art.ratio_y.len(),
            art.bin_edges.len()
        )));
    }
    let edges = &art.bin_edges;

    let mut canvas = Canvas::new(config.figure.width, config.figure.height);
    canvas.set_font_family(config.font.family.clone());
    draw_title(&mut canvas, &art.title, config);

    let x_axis = if art.bin_labels.is_empty() {
        Axis::bounded_linear(edges[0], edges[n_bins], 6)
    } else {
        Axis::categorical(edges, &art.bin_labels)
            .with_label_angle(config.axes.category_label_angle)
    }
    .with_label(art.x_title.clone());
    let main_y = main_y_axis(art)?.with_label(config.ratio.y_label.clone());
    let ratio_y = ratio_y_axis(art)?.with_label(config.ratio.ratio_label.clone());

    let content = PlotArea::auto(&canvas, &[&main_y, &ratio_y], &x_axis, 0.0, config);
    let layout =
        MainRatioLayout::new(content, config.ratio.panel_gap, config.ratio.ratio_fraction);

    draw_experiment_header(&mut canvas, &layout.main, config);

    // --- Main panel ---
    let main = &layout.main;
    draw_axes(&mut canvas, main, &x_axis.clone().without_tick_labels(), &main_y, config);
    canvas.push_clip(main.left, main.top, main.width, main.height);
    let series = [&art.numerator, &art.denominator];
    for (i, s) in series.iter().enumerate() {
        let style = LineStyle::solid(config.series_color(i), config.ratio.line_width);
        let points = step_points(edges, &s.y, &x_axis, &main_y, main);
        canvas.polyline(&points, &style);
    }
    canvas.pop_clip();

    let entries: Vec<LegendEntry> = series
        .iter()
        .enumerate()
        .map(|(i, s)| LegendEntry {
            label: s.label.clone(),
            line: LineStyle::solid(config.series_color(i), config.ratio.line_width),
        })
        .collect();
    draw_legend(&mut canvas, main, &entries, config.font.size, config.ratio.legend_frame);

    // --- Ratio panel ---
    let ratio = &layout.ratio;
    draw_axes(&mut canvas, ratio, &x_axis, &ratio_y, config);
    canvas.push_clip(ratio.left, ratio.top, ratio.width, ratio.height);

    if ratio_y.contains(1.0) {
        let ref_py = ratio_y.data_to_pixel(1.0, ratio.bottom(), ratio.top);
        let ref_style = LineStyle::dashed(config.ratio.reference_color, 1.0);
        canvas.line(ratio.left, ref_py, ratio.right(), ref_py, &ref_style);
    }

    let marker = MarkerStyle { size: config.ratio.marker_size, ..Default::default() };
    let err_style = LineStyle::solid(marker.color, 0.8);
    for bi in 0..n_bins {
        let (y, err) = (art.ratio_y[bi], art.ratio_yerr[bi]);
        if !y.is_finite() {
            continue;
        }
        let x_center = 0.5 * (edges[bi] + edges[bi + 1]);
        let px = x_axis.data_to_pixel(x_center, ratio.left, ratio.right());
        let py = clamp_py(ratio_y.data_to_pixel(y, ratio.bottom(), ratio.top), ratio);
        if err.is_finite() && err > 0.0 {
            let py_lo = clamp_py(ratio_y.data_to_pixel(y - err, ratio.bottom(), ratio.top), ratio);
            let py_hi = clamp_py(ratio_y.data_to_pixel(y + err, ratio.bottom(), ratio.top), ratio);
            canvas.error_bar(px, py_lo, py_hi, 0.0, &err_style);
        }
        canvas.marker(px, py, &marker);
    }
    canvas.pop_clip();

    tracing::debug!(bins = n_bins, log_y = art.log_y, "rendered ratio plot");
    Ok(canvas.finish_svg())
}

/// Top-panel y axis: explicit ticks, else log or linear auto-range over both series.
fn main_y_axis(art: &RatioArtifact) -> crate::Result<Axis> {
    if let Some(ticks) = &art.overlay_y_ticks {
        return Axis::explicit(ticks, art.log_y);
    }
    let values = || art.numerator.y.iter().chain(&art.denominator.y).copied();
    let max = values().filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    if art.log_y {
        let min_pos = values().filter(|&v| v > 0.0 && v.is_finite()).fold(f64::INFINITY, f64::min);
        // headroom above the highest curve for the legend
        Ok(Axis::auto_log(min_pos, max * 3.0))
    } else {
        let top = if max > 0.0 { max * 1.25 } else { 1.0 };
        Ok(Axis::auto_linear(0.0, top, 6))
    }
}

/// Ratio-panel y axis: explicit ticks, else padded auto-range that includes 1.
fn ratio_y_axis(art: &RatioArtifact) -> crate::Result<Axis> {
    if let Some(ticks) = &art.ratio_y_ticks {
        return Axis::explicit(ticks, false);
    }
    let (mut lo, mut hi) = (1.0_f64, 1.0_f64);
    for (&y, &e) in art.ratio_y.iter().zip(&art.ratio_yerr) {
        if y.is_finite() && e.is_finite() {
            lo = lo.min(y - e);
            hi = hi.max(y + e);
        }
    }
    let pad = 0.1 * (hi - lo).max(0.1);
    Ok(Axis::auto_linear((lo - pad).max(0.0), hi + pad, 4))
}

/// Histogram outline: a horizontal segment per bin, joined by vertical risers.
fn step_points(
    edges: &[f64],
    y: &[f64],
    x_axis: &Axis,
    y_axis: &Axis,
    area: &PlotArea,
) -> Vec<(f64, f64)> {
    let mut points = Vec::with_capacity(2 * y.len());
    for (i, &v) in y.iter().enumerate() {
        let v = if v.is_finite() { v } else { 0.0 };
        let py = clamp_py(y_axis.data_to_pixel(v, area.bottom(), area.top), area);
        points.push((x_axis.data_to_pixel(edges[i], area.left, area.right()), py));
        points.push((x_axis.data_to_pixel(edges[i + 1], area.left, area.right()), py));
    }
    points
}

/// Keep off-scale values (zeros on a log axis) just outside the clip box.
fn clamp_py(py: f64, area: &PlotArea) -> f64 {
    py.clamp(area.top - 2.0, area.bottom() + 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::{Axis as BinAxis, Hist1D};
    use cf_viz::{RatioInput, RatioOptions, ratio_artifact};

    fn artifact(options: RatioOptions, labelled: bool) -> RatioArtifact {
        let mut axis = BinAxis::uniform(4, 0.0, 4.0).with_title("cut");
        if labelled {
            axis = axis.with_labels(["AllEvents", "Trigger", "MET", "Track"]);
        }
        let num = Hist1D::new("num", axis.clone(), vec![1.0, 0.5, 0.25, 0.1]).unwrap();
        let den = Hist1D::new("den", axis, vec![1.0, 0.4, 0.2, 0.05]).unwrap();
        let ratio = num.divide(&den).unwrap();
        ratio_artifact(
            "EventCutFlow",
            RatioInput::new(&num, "0p1mm", "c\u{03C4} = 0.1 mm (L)"),
            RatioInput::new(&den, "10000mm", "c\u{03C4} = 10k mm (L)"),
            &ratio,
            options,
        )
        .unwrap()
    }

    #[test]
    fn renders_both_panels() {
        let art = artifact(RatioOptions::default(), true);
        let svg = render(&art, &VizConfig::default()).unwrap();

        assert!(svg.contains("<title>EventCutFlow Ratio: 0p1mm / 10000mm</title>"));
        assert!(svg.contains("c\u{03C4} = 0.1 mm (L)"));
        assert!(svg.contains("c\u{03C4} = 10k mm (L)"));
        // palette colours 0 and 1 for the two curves
        assert!(svg.contains(r##"stroke="#3f90da""##));
        assert!(svg.contains(r##"stroke="#ffa90e""##));
        // dashed red reference line
        assert!(svg.contains(r##"stroke="#ff0000" stroke-width="1.00" stroke-dasharray="6 3""##));
        // bin labels only once, under the ratio panel
        assert_eq!(svg.matches(">Trigger</text>").count(), 1);
        assert!(svg.contains(">Ratio</text>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 4);
    }

    #[test]
    fn explicit_ticks_fix_panel_ranges() {
        let options = RatioOptions {
            log_y: true,
            ratio_y_ticks: Some(vec![1.5, 1.0, 0.5]),
            overlay_y_ticks: Some(vec![1.0, 0.1, 0.01]),
        };
        let art = artifact(options, false);
        let svg = render(&art, &VizConfig::default()).unwrap();
        for label in [">0.5</text>", ">1.5</text>", ">0.01</text>", ">0.1</text>"] {
            assert!(svg.contains(label), "missing tick {label}");
        }
        assert!(!svg.contains("10\u{207B}"));
    }

    #[test]
    fn log_scale_auto_ticks_are_powers_of_ten() {
        let art = artifact(RatioOptions { log_y: true, ..Default::default() }, false);
        let svg = render(&art, &VizConfig::default()).unwrap();
        assert!(svg.contains(">10\u{207B}\u{00B9}</text>"));
        assert!(svg.contains(">10\u{2070}</text>"));
    }

    #[test]
    fn auto_ratio_range_includes_one() {
        let mut art = artifact(RatioOptions::default(), false);
        art.ratio_y = vec![2.0, 2.5, 3.0, 3.5];
        art.ratio_yerr = vec![0.1; 4];
        let axis = ratio_y_axis(&art).unwrap();
        assert!(axis.contains(1.0));
        assert!(axis.contains(3.6));
    }

    #[test]
    fn inconsistent_artifact_is_rejected() {
        let mut art = artifact(RatioOptions::default(), false);
        art.ratio_y.pop();
        assert!(matches!(render(&art, &VizConfig::default()), Err(RenderError::Layout(_))));

        let mut bad_ticks = artifact(RatioOptions::default(), false);
        bad_ticks.log_y = true;
        bad_ticks.overlay_y_ticks = Some(vec![0.0, 1.0]);
        assert!(render(&bad_ticks, &VizConfig::default()).is_err());
    }
}

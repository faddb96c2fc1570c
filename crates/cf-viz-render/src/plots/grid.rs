//! Colour-mapped grid: one row per parameter point, one column per bin.

use cf_viz::GridArtifact;

use crate::RenderError;
use crate::canvas::Canvas;
use crate::color::{Color, viridis};
use crate::config::VizConfig;
use crate::header::{draw_experiment_header, draw_title};
use crate::layout::axes::{Axis, format_value};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::{draw_axes, draw_frame};
use crate::primitives::*;

const COLORBAR_GAP: f64 = 12.0;
const COLORBAR_STEPS: usize = 64;

pub fn render(art: &GridArtifact, config: &VizConfig) -> crate::Result<String> {
    let n_rows = art.values.len();
    let n_cols = art.x_edges.len().saturating_sub(1);
    if n_rows == 0 || n_cols == 0 {
        return Err(RenderError::Layout(format!("grid {} is empty", art.name)));
    }
    if let Some(bad) = art.values.iter().position(|row| row.len() != n_cols) {
        return Err(RenderError::Layout(format!(
            "grid row {bad} has {} columns, expected {n_cols}",
            art.values[bad].len()
        )));
    }

    let fig = &config.grid.figure;
    let mut canvas = Canvas::new(fig.width, fig.height);
    canvas.set_font_family(config.font.family.clone());
    draw_title(&mut canvas, &art.title, config);

    let x_axis = Axis::categorical(&art.x_edges, &art.x_labels)
        .with_label_angle(config.axes.category_label_angle)
        .with_label(art.x_title.clone());
    let row_edges: Vec<f64> = (0..=n_rows).map(|i| i as f64).collect();
    let y_axis = Axis::categorical(&row_edges, &art.y_labels).with_label(art.y_title.clone());
    let z_axis = z_axis(art);

    let tick_style = TextStyle { size: config.font.tick_size, ..Default::default() };
    let z_tick_w = z_axis
        .as_ref()
        .map(|z| {
            z.tick_labels
                .iter()
                .map(|l| canvas.measure_text(l, &tick_style).width)
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0);
    let right_extra = COLORBAR_GAP
        + config.grid.colorbar_width
        + 6.0
        + z_tick_w
        + 8.0
        + config.font.label_size;
    let area = PlotArea::auto(&canvas, &[&y_axis], &x_axis, right_extra, config);

    draw_experiment_header(&mut canvas, &area, config);

    // --- Cells ---
    let mut drawn = 0usize;
    for (row, values) in art.values.iter().enumerate() {
        let py_lo = y_axis.data_to_pixel(row as f64, area.bottom(), area.top);
        let py_hi = y_axis.data_to_pixel(row as f64 + 1.0, area.bottom(), area.top);
        for (col, &v) in values.iter().enumerate() {
            let Some(fill) = z_axis.as_ref().and_then(|z| cell_color(v, z)) else {
                continue;
            };
            let px_lo = x_axis.data_to_pixel(art.x_edges[col], area.left, area.right());
            let px_hi = x_axis.data_to_pixel(art.x_edges[col + 1], area.left, area.right());
            canvas.rect(px_lo, py_hi, px_hi - px_lo, py_lo - py_hi, &Style::filled(fill));
            drawn += 1;

            if config.grid.annotate {
                let style = TextStyle {
                    size: config.font.tick_size * 0.8,
                    color: fill.contrasting_text(),
                    anchor: TextAnchor::Middle,
                    baseline: TextBaseline::Central,
                    ..Default::default()
                };
                let (cx, cy) = (0.5 * (px_lo + px_hi), 0.5 * (py_lo + py_hi));
                canvas.text(cx, cy, &annotation(v), &style);
            }
        }
    }
    if drawn == 0 {
        tracing::warn!("grid {} has no cells to colour", art.name);
    }

    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    if let Some(z) = &z_axis {
        draw_colorbar(&mut canvas, &area, z, &art.z_title, config);
    }

    tracing::debug!(rows = n_rows, cols = n_cols, cells = drawn, "rendered grid plot");
    Ok(canvas.finish_svg())
}

/// Colour of one cell, `None` when the cell stays blank.
///
/// Non-positive values are blank on a log scale, exact zeros on a linear one.
pub fn cell_color(v: f64, z_axis: &Axis) -> Option<Color> {
    if !v.is_finite() || v == 0.0 || (z_axis.log && v <= 0.0) {
        return None;
    }
    let t = z_axis.data_to_pixel(v.clamp(z_axis.min, z_axis.max), 0.0, 1.0);
    Some(viridis(t))
}

/// Colour scale over the drawable cells, `None` if there are none.
fn z_axis(art: &GridArtifact) -> Option<Axis> {
    let values = || art.values.iter().flatten().copied().filter(|v| v.is_finite());
    let max = values().fold(f64::NEG_INFINITY, f64::max);
    if art.log_z {
        let min_pos = values().filter(|&v| v > 0.0).fold(f64::INFINITY, f64::min);
        if !min_pos.is_finite() {
            return None;
        }
        Some(Axis::auto_log(min_pos, max))
    } else {
        let min = values().fold(f64::INFINITY, f64::min);
        if !max.is_finite() || values().all(|v| v == 0.0) {
            return None;
        }
        Some(Axis::auto_linear(min.min(0.0), max, 5))
    }
}

fn draw_colorbar(canvas: &mut Canvas, area: &PlotArea, z: &Axis, title: &str, config: &VizConfig) {
    let cb_x = area.right() + COLORBAR_GAP;
    let cb_w = config.grid.colorbar_width;
    let step_h = area.height / COLORBAR_STEPS as f64;
    for i in 0..COLORBAR_STEPS {
        // top step first
        let t = 1.0 - (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let y = area.top + i as f64 * step_h;
        canvas.rect(cb_x, y, cb_w, step_h + 0.3, &Style::filled(viridis(t)));
    }
    let bar = PlotArea::manual(cb_x, area.top, cb_w, area.height);
    draw_frame(canvas, &bar);

    let tick_line = LineStyle::solid(Color::BLACK, 0.6);
    let label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::Start,
        baseline: TextBaseline::Central,
        ..Default::default()
    };
    let mut widest = 0.0_f64;
    for (pos, label) in z.tick_positions.iter().zip(&z.tick_labels) {
        if !z.contains(*pos) {
            continue;
        }
        let py = z.data_to_pixel(*pos, area.bottom(), area.top);
        canvas.line(cb_x + cb_w - 4.0, py, cb_x + cb_w, py, &tick_line);
        canvas.text(cb_x + cb_w + 4.0, py, label, &label_style);
        widest = widest.max(canvas.measure_text(label, &label_style).width);
    }

    if !title.is_empty() {
        let style = TextStyle {
            size: config.font.label_size,
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Hanging,
            ..Default::default()
        };
        let x = cb_x + cb_w + 4.0 + widest + 6.0 + config.font.label_size;
        canvas.text_rotated(x, area.top + area.height / 2.0, title, &style, 90.0);
    }
}

/// Cell annotation: three significant digits.
fn annotation(v: f64) -> String {
    let a = v.abs();
    if a >= 1000.0 {
        format!("{v:.0}")
    } else if a >= 0.01 {
        let decimals = 2 - a.log10().floor() as i32;
        format_value(format!("{v:.prec$}", prec = decimals.max(0) as usize).parse().unwrap_or(v))
    } else {
        format!("{v:.1e}")
    }
}

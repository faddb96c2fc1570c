use crate::canvas::Canvas;
use crate::color::Color;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::layout::margins::{PlotArea, x_tick_depth, y_tick_width};
use crate::primitives::*;

/// Draw a standard box frame with axes, ticks, grid lines, and labels.
pub fn draw_axes(
    canvas: &mut Canvas,
    area: &PlotArea,
    x_axis: &Axis,
    y_axis: &Axis,
    config: &VizConfig,
) {
    let frame_color = Color::BLACK;
    let tick_style_line = LineStyle::solid(frame_color, 0.6);
    let minor_tick_style = LineStyle::solid(frame_color, 0.4);

    let inward = config.axes.tick_direction == "in";
    let tl = config.axes.tick_length;
    let mtl = config.axes.minor_tick_length;
    let grid_style = LineStyle {
        color: config.gridlines.color.with_alpha(config.gridlines.alpha),
        width: 0.5,
        dash: Some("3 3".into()),
    };

    draw_frame(canvas, area);

    // --- X axis ticks ---
    let label_gap = if inward { 4.0 } else { tl + 4.0 };
    for (i, &val) in x_axis.tick_positions.iter().enumerate() {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }

        if config.gridlines.show {
            canvas.line(px, area.top, px, area.bottom(), &grid_style);
        }

        let dir = if inward { -1.0 } else { 1.0 };
        canvas.line(px, area.bottom(), px, area.bottom() + dir * tl, &tick_style_line);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top - dir * tl, &tick_style_line);
        }

        if let Some(label) = x_axis.tick_labels.get(i).filter(|l| !l.is_empty()) {
            let label_y = area.bottom() + label_gap;
            if x_axis.label_angle == 0.0 {
                let style = TextStyle {
                    size: config.font.tick_size,
                    anchor: TextAnchor::Middle,
                    baseline: TextBaseline::Hanging,
                    ..Default::default()
                };
                canvas.text(px, label_y, label, &style);
            } else {
                // Rotated labels hang from their end point under the tick
                let style = TextStyle {
                    size: config.font.tick_size,
                    anchor: TextAnchor::End,
                    baseline: TextBaseline::Central,
                    ..Default::default()
                };
                canvas.text_rotated(px, label_y, label, &style, x_axis.label_angle);
            }
        }
    }

    for &val in &x_axis.minor_ticks {
        let px = x_axis.data_to_pixel(val, area.left, area.right());
        if px < area.left - 0.5 || px > area.right() + 0.5 {
            continue;
        }
        let dir = if inward { -1.0 } else { 1.0 };
        canvas.line(px, area.bottom(), px, area.bottom() + dir * mtl, &minor_tick_style);
        if config.axes.show_top_ticks {
            canvas.line(px, area.top, px, area.top - dir * mtl, &minor_tick_style);
        }
    }

    // --- Y axis ticks ---
    let y_tick_label_style = TextStyle {
        size: config.font.tick_size,
        anchor: TextAnchor::End,
        baseline: TextBaseline::Central,
        ..Default::default()
    };

    for (i, &val) in y_axis.tick_positions.iter().enumerate() {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }

        if config.gridlines.show {
            canvas.line(area.left, py, area.right(), py, &grid_style);
        }

        let dir = if inward { 1.0 } else { -1.0 };
        canvas.line(area.left, py, area.left + dir * tl, py, &tick_style_line);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() - dir * tl, py, &tick_style_line);
        }

        if let Some(label) = y_axis.tick_labels.get(i) {
            canvas.text(area.left - label_gap, py, label, &y_tick_label_style);
        }
    }

    for &val in &y_axis.minor_ticks {
        let py = y_axis.data_to_pixel(val, area.bottom(), area.top);
        if py < area.top - 0.5 || py > area.bottom() + 0.5 {
            continue;
        }
        let dir = if inward { 1.0 } else { -1.0 };
        canvas.line(area.left, py, area.left + dir * mtl, py, &minor_tick_style);
        if config.axes.show_right_ticks {
            canvas.line(area.right(), py, area.right() - dir * mtl, py, &minor_tick_style);
        }
    }

    // --- Axis labels ---
    let label_style = TextStyle {
        size: config.font.label_size,
        anchor: TextAnchor::Middle,
        baseline: TextBaseline::Hanging,
        ..Default::default()
    };

    if !x_axis.label.is_empty() {
        let label_y = area.bottom() + label_gap + x_tick_depth(canvas, x_axis, config) + 6.0;
        canvas.text(area.left + area.width / 2.0, label_y, &x_axis.label, &label_style);
    }

    if !y_axis.label.is_empty() {
        let label_x =
            area.left - label_gap - y_tick_width(canvas, y_axis, config) - 6.0 - label_style.size;
        let label_y = area.top + area.height / 2.0;
        canvas.text_rotated(label_x, label_y, &y_axis.label, &label_style, -90.0);
    }
}

/// Draw the plot frame only (no ticks).
pub fn draw_frame(canvas: &mut Canvas, area: &PlotArea) {
    let style = LineStyle::solid(Color::BLACK, 0.8);
    canvas.line(area.left, area.top, area.right(), area.top, &style);
    canvas.line(area.left, area.bottom(), area.right(), area.bottom(), &style);
    canvas.line(area.left, area.top, area.left, area.bottom(), &style);
    canvas.line(area.right(), area.top, area.right(), area.bottom(), &style);
}

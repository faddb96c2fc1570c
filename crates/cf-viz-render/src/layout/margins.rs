use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::axes::Axis;
use crate::primitives::TextStyle;

/// Rectangular plot area within the canvas.
#[derive(Debug, Clone, Copy)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Compute margins from axis labels and config.
    ///
    /// `y_axes` are the axes stacked on the left edge (the widest tick label
    /// wins); `right_extra` reserves room for e.g. a colour bar.
    pub fn auto(
        canvas: &Canvas,
        y_axes: &[&Axis],
        x_axis: &Axis,
        right_extra: f64,
        config: &VizConfig,
    ) -> Self {
        let label_size = config.font.label_size;

        // Left margin: y-axis tick labels + axis label + padding
        let mut left = 15.0;
        left += y_axes.iter().map(|y| y_tick_width(canvas, y, config)).fold(0.0_f64, f64::max);
        left += 8.0;
        if y_axes.iter().any(|y| !y.label.is_empty()) {
            left += label_size + 6.0;
        }

        // Bottom margin: x-axis tick labels + axis label + padding
        let mut bottom = 15.0 + x_tick_depth(canvas, x_axis, config) + 6.0;
        if !x_axis.label.is_empty() {
            bottom += label_size + 6.0;
        }

        let top = header_height(config);
        let right = 15.0 + right_extra;

        let width = canvas.width - left - right;
        let height = canvas.height - top - bottom;
        Self { left, top, width: width.max(50.0), height: height.max(50.0) }
    }

    /// Manual margins (for multi-panel layouts).
    pub fn manual(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Space above the plot area taken by the header and title.
pub fn header_height(config: &VizConfig) -> f64 {
    let mut top = 12.0;
    if !config.experiment.name.is_empty() {
        top += config.font.label_size * 1.3 + 8.0;
    }
    if config.show_title {
        top += config.font.label_size + 8.0;
    }
    top
}

/// Widest y tick label.
pub fn y_tick_width(canvas: &Canvas, axis: &Axis, config: &VizConfig) -> f64 {
    let style = TextStyle { size: config.font.tick_size, ..Default::default() };
    axis.tick_labels.iter().map(|l| canvas.measure_text(l, &style).width).fold(0.0_f64, f64::max)
}

/// Vertical extent of the x tick labels, accounting for their rotation.
pub fn x_tick_depth(canvas: &Canvas, axis: &Axis, config: &VizConfig) -> f64 {
    let size = config.font.tick_size;
    if axis.tick_labels.iter().all(|l| l.is_empty()) {
        return 0.0;
    }
    if axis.label_angle == 0.0 {
        return size;
    }
    let style = TextStyle { size, ..Default::default() };
    let widest = axis
        .tick_labels
        .iter()
        .map(|l| canvas.measure_text(l, &style).width)
        .fold(0.0_f64, f64::max);
    let theta = axis.label_angle.abs().to_radians();
    widest * theta.sin() + size * theta.cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_labels_need_more_room() {
        let canvas = Canvas::new(400.0, 300.0);
        let config = VizConfig::default();
        let labels = vec!["AllEvents".to_string(), "PassTrigger".to_string()];
        let flat = Axis::categorical(&[0.0, 1.0, 2.0], &labels);
        let rotated = flat.clone().with_label_angle(-90.0);
        assert_eq!(x_tick_depth(&canvas, &flat, &config), config.font.tick_size);
        assert!(x_tick_depth(&canvas, &rotated, &config) > 40.0);

        let y = Axis::auto_linear(0.0, 1.0, 5).with_label("Fraction of events");
        let a = PlotArea::auto(&canvas, &[&y], &rotated, 30.0, &config);
        let b = PlotArea::auto(&canvas, &[&y], &flat, 0.0, &config);
        assert!(a.height < b.height);
        assert!(a.width < b.width);
        assert!((a.right() - (400.0 - 45.0)).abs() < 1e-9);
    }
}

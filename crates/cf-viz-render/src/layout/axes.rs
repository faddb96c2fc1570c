use crate::RenderError;

/// Axis configuration with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub log: bool,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
    /// Tick label rotation in degrees; 0 draws them horizontally.
    pub label_angle: f64,
}

impl Axis {
    fn with_ticks(min: f64, max: f64, log: bool, ticks: Vec<f64>, labels: Vec<String>) -> Self {
        Self {
            min,
            max,
            log,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: Vec::new(),
            label_angle: 0.0,
        }
    }

    /// Auto-scale linear axis with "nice number" ticks.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (nice_min, nice_max, step) = nice_range(data_min, data_max, target_ticks);
        let mut axis = Self::with_ticks(nice_min, nice_max, false, Vec::new(), Vec::new());
        axis.fill_linear_ticks(step);
        axis
    }

    /// Linear axis over exactly `[min, max]`, ticks at nice multiples inside it.
    pub fn bounded_linear(min: f64, max: f64, target_ticks: usize) -> Self {
        let (_, _, step) = nice_range(min, max, target_ticks);
        let (min, max) =
            if (max - min).abs() < 1e-15 { (min - 1.0, max + 1.0) } else { (min, max) };
        let mut axis = Self::with_ticks(min, max, false, Vec::new(), Vec::new());
        axis.fill_linear_ticks(step);
        axis
    }

    fn fill_linear_ticks(&mut self, step: f64) {
        let first = (self.min / step - 1e-9).ceil() * step;
        let mut v = first;
        while v <= self.max + step * 0.01 {
            self.tick_positions.push(v);
            self.tick_labels.push(format_tick(v, step));
            v += step;
        }

        // Minor ticks: 5 subdivisions per major
        let minor_step = step / 5.0;
        let mut mv = first - step;
        while mv <= self.max + minor_step * 0.01 {
            let on_major = self.tick_positions.iter().any(|t| (t - mv).abs() < minor_step * 0.01);
            if !on_major && mv >= self.min - minor_step * 0.01 {
                self.minor_ticks.push(mv);
            }
            mv += minor_step;
        }
    }

    /// Auto-scale logarithmic axis. `data_min` should be the smallest positive value.
    pub fn auto_log(data_min: f64, data_max: f64) -> Self {
        let data_max = if data_max > 0.0 { data_max } else { 1.0 };
        let data_min =
            if data_min > 0.0 && data_min <= data_max { data_min } else { data_max * 1e-3 };
        let log_min = data_min.log10().floor() as i32;
        let mut log_max = data_max.log10().ceil() as i32;
        if log_max <= log_min {
            log_max = log_min + 1;
        }

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut minor = Vec::new();
        for exp in log_min..=log_max {
            ticks.push(10.0_f64.powi(exp));
            labels.push(format!("10{}", superscript(exp)));
            if exp < log_max {
                // Minor ticks at 2..9
                for m in 2..=9 {
                    minor.push(m as f64 * 10.0_f64.powi(exp));
                }
            }
        }

        let mut axis =
            Self::with_ticks(10.0_f64.powi(log_min), 10.0_f64.powi(log_max), true, ticks, labels);
        axis.minor_ticks = minor;
        axis
    }

    /// Axis whose ticks are exactly `ticks` and whose range is their `[min, max]`.
    pub fn explicit(ticks: &[f64], log: bool) -> crate::Result<Self> {
        if ticks.is_empty() || ticks.iter().any(|t| !t.is_finite()) {
            return Err(RenderError::Layout(format!("invalid tick list {ticks:?}")));
        }
        if log && ticks.iter().any(|&t| t <= 0.0) {
            return Err(RenderError::Layout(format!(
                "log axis needs positive ticks, got {ticks:?}"
            )));
        }
        let mut sorted = ticks.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        let (mut min, mut max) = (sorted[0], sorted[sorted.len() - 1]);
        if max == min {
            if log {
                min /= 10.0;
                max *= 10.0;
            } else {
                min -= 0.5;
                max += 0.5;
            }
        }
        let labels = sorted.iter().map(|&t| format_value(t)).collect();
        Ok(Self::with_ticks(min, max, log, sorted, labels))
    }

    /// One labelled tick at the centre of each bin.
    pub fn categorical(edges: &[f64], labels: &[String]) -> Self {
        let min = edges.first().copied().unwrap_or(0.0);
        let max = edges.last().copied().unwrap_or(1.0);
        let centres = edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect::<Vec<_>>();
        let labels =
            (0..centres.len()).map(|i| labels.get(i).cloned().unwrap_or_default()).collect();
        Self::with_ticks(min, max, false, centres, labels)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_label_angle(mut self, degrees: f64) -> Self {
        self.label_angle = degrees;
        self
    }

    /// Same ticks, no tick labels (shared x axis of a stacked panel).
    pub fn without_tick_labels(mut self) -> Self {
        self.tick_labels.clear();
        self.label.clear();
        self
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = if self.log {
            let log_val = value.max(1e-300).ln();
            let log_min = self.min.max(1e-300).ln();
            let log_max = self.max.max(1e-300).ln();
            (log_val - log_min) / (log_max - log_min)
        } else {
            (value - self.min) / (self.max - self.min)
        };
        px_min + frac * (px_max - px_min)
    }

    /// Whether `value` lies inside the axis range.
    pub fn contains(&self, value: f64) -> bool {
        let eps = (self.max - self.min).abs() * 1e-9;
        value >= self.min - eps && value <= self.max + eps && (!self.log || value > 0.0)
    }
}

/// "Nice numbers" algorithm for pleasant tick spacing.
fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if (data_max - data_min).abs() < 1e-15 {
        return (data_min - 1.0, data_max + 1.0, 1.0);
    }
    let range = data_max - data_min;
    let rough_step = range / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let nice_min = (data_min / step).floor() * step;
    let nice_max = (data_max / step).ceil() * step;
    (nice_min, nice_max, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    if decimals == 0 {
        // Avoid "-0"
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{}", v.round() as i64)
    } else {
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{:.prec$}", v, prec = decimals)
    }
}

/// Shortest readable form of a value: `1`, `0.5`, `0.0001`, `1.2e-7`.
pub fn format_value(v: f64) -> String {
    if v == 0.0 {
        return "0".into();
    }
    let a = v.abs();
    if (1e-4..1e6).contains(&a) {
        let s = format!("{v:.6}");
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" { "0".into() } else { s.to_string() }
    } else {
        format!("{v:.2e}").replace(".00e", "e").replace("0e", "e")
    }
}

fn superscript(n: i32) -> String {
    let s = n.to_string();
    s.chars()
        .map(|c| match c {
            '-' => '\u{207B}',
            '0' => '\u{2070}',
            '1' => '\u{00B9}',
            '2' => '\u{00B2}',
            '3' => '\u{00B3}',
            '4' => '\u{2074}',
            '5' => '\u{2075}',
            '6' => '\u{2076}',
            '7' => '\u{2077}',
            '8' => '\u{2078}',
            '9' => '\u{2079}',
            _ => c,
        })
        .collect()
}

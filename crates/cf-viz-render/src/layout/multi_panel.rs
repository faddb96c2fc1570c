use crate::layout::margins::PlotArea;

/// Main + ratio panel layout sharing one x axis.
#[derive(Debug, Clone)]
pub struct MainRatioLayout {
    pub main: PlotArea,
    pub ratio: PlotArea,
}

impl MainRatioLayout {
    /// Split `content` vertically; the ratio panel gets `ratio_frac` of the height.
    pub fn new(content: PlotArea, gap: f64, ratio_frac: f64) -> Self {
        let ratio_h = content.height * ratio_frac;
        let main_h = content.height - ratio_h - gap;

        Self {
            main: PlotArea::manual(content.left, content.top, content.width, main_h),
            ratio: PlotArea::manual(
                content.left,
                content.top + main_h + gap,
                content.width,
                ratio_h,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seventy_thirty_split() {
        let layout = MainRatioLayout::new(PlotArea::manual(50.0, 40.0, 400.0, 500.0), 0.0, 0.3);
        assert!((layout.main.height - 350.0).abs() < 1e-9);
        assert!((layout.ratio.height - 150.0).abs() < 1e-9);
        assert!((layout.ratio.top - layout.main.bottom()).abs() < 1e-9);
        assert!((layout.ratio.bottom() - 540.0).abs() < 1e-9);
        assert_eq!(layout.main.left, layout.ratio.left);
    }
}

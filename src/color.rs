use eframe::egui::Color32;
use palette::{named, Srgb};

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// A plotted series, each with a fixed colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    RecordedMass,
    RecomputedMass,
    CleanMass,
    /// `M` in the overlay comparison.
    ComparisonRecorded,
    /// `M_New` in the overlay comparison.
    ComparisonRecomputed,
    DeltaMass,
    Scatter,
}

impl Series {
    /// CSS colour name for this series.
    fn named(self) -> Srgb<u8> {
        match self {
            Series::RecordedMass => named::MEDIUMORCHID,
            Series::RecomputedMass => named::BLUE,
            Series::CleanMass | Series::ComparisonRecomputed => named::DODGERBLUE,
            Series::ComparisonRecorded => named::ORCHID,
            Series::DeltaMass => named::CRIMSON,
            Series::Scatter => named::STEELBLUE,
        }
    }

    /// Opaque colour.
    pub fn color(self) -> Color32 {
        to_color32(self.named())
    }

    /// Colour with `alpha` in `[0, 1]`, for overlapping series.
    pub fn translucent(self, alpha: f32) -> Color32 {
        let c = self.named();
        let a = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
        Color32::from_rgba_unmultiplied(c.red, c.green, c.blue, a)
    }
}

fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colours_resolve() {
        assert_eq!(Series::DeltaMass.color(), Color32::from_rgb(220, 20, 60));
        assert_eq!(Series::RecomputedMass.color(), Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn translucent_keeps_hue() {
        let c = Series::ComparisonRecorded.translucent(0.5);
        assert_eq!(c.a(), 127);
        assert_eq!(
            Series::ComparisonRecorded.translucent(1.0),
            Series::ComparisonRecorded.color()
        );
    }
}

use ratatui::style::Color;

/// An sRGB color used by the choropleth and chart series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Swatch {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Swatch {
    /// Build from a packed `0xRRGGBB` value
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }
}

impl From<Swatch> for Color {
    fn from(s: Swatch) -> Self {
        Color::Rgb(s.r, s.g, s.b)
    }
}

/// Fill for missing, NaN or unjoinable values. Not part of any scale.
pub const NEUTRAL_GRAY: Swatch = Swatch::hex(0xCCCCCC);

/// Dashboard palette
pub mod palette {
    use super::Swatch;

    pub const PRIMARY: Swatch = Swatch::hex(0x333333);
    pub const DANGER: Swatch = Swatch::hex(0xD55E00);
    pub const SAFETY: Swatch = Swatch::hex(0x009E73);
    pub const EDUCATION: Swatch = Swatch::hex(0x56B4E9);
    pub const ACCENT: Swatch = Swatch::hex(0xF0E442);
    pub const GRID: Swatch = Swatch::hex(0xDDDDDD);
    pub const BORDER: Swatch = Swatch::hex(0x666666);
}

/// Which numeric field drives color encoding and labeling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MetricType {
    #[default]
    FatalityRate,
    PctLessHs,
    Population,
}

/// Ascending thresholds with one more color than thresholds
struct Scale {
    thresholds: [f64; 4],
    colors: [Swatch; 5],
}

// Hand-tuned against the 2010-2023 dataset quartiles
// (fatality rate spans roughly 5.6-72.2 with mean 29.8).
const FATALITY_SCALE: Scale = Scale {
    thresholds: [20.0, 28.0, 35.0, 45.0],
    colors: [
        Swatch::hex(0xFEE5D9),
        Swatch::hex(0xFCAE91),
        Swatch::hex(0xFB6A4A),
        Swatch::hex(0xDE2D26),
        Swatch::hex(0xA50F15),
    ],
};

const EDUCATION_SCALE: Scale = Scale {
    thresholds: [12.0, 16.0, 20.0, 25.0],
    colors: [
        Swatch::hex(0xEFF3FF),
        Swatch::hex(0xBDD7E7),
        Swatch::hex(0x6BAED6),
        Swatch::hex(0x3182BD),
        Swatch::hex(0x08519C),
    ],
};

const POPULATION_SCALE: Scale = Scale {
    thresholds: [1e6, 3e6, 6e6, 15e6],
    colors: [
        Swatch::hex(0xEDF8E9),
        Swatch::hex(0xBAE4B3),
        Swatch::hex(0x74C476),
        Swatch::hex(0x31A354),
        Swatch::hex(0x006D2C),
    ],
};

impl MetricType {
    pub const ALL: [MetricType; 3] = [
        MetricType::FatalityRate,
        MetricType::PctLessHs,
        MetricType::Population,
    ];

    /// Axis and tooltip label
    pub fn label(self) -> &'static str {
        match self {
            MetricType::FatalityRate => "Fatalities per 100k",
            MetricType::PctLessHs => "% Without HS Diploma",
            MetricType::Population => "Population",
        }
    }

    /// Label shown in the metric selector
    pub fn option_label(self) -> &'static str {
        match self {
            MetricType::FatalityRate => "Fatality Rate (per 100k)",
            MetricType::PctLessHs => "% Without HS Diploma",
            MetricType::Population => "Population",
        }
    }

    /// Next metric in selector order, wrapping
    pub fn next(self) -> Self {
        match self {
            MetricType::FatalityRate => MetricType::PctLessHs,
            MetricType::PctLessHs => MetricType::Population,
            MetricType::Population => MetricType::FatalityRate,
        }
    }

    /// Previous metric in selector order, wrapping
    pub fn prev(self) -> Self {
        match self {
            MetricType::FatalityRate => MetricType::Population,
            MetricType::PctLessHs => MetricType::FatalityRate,
            MetricType::Population => MetricType::PctLessHs,
        }
    }

    fn scale(self) -> &'static Scale {
        match self {
            MetricType::FatalityRate => &FATALITY_SCALE,
            MetricType::PctLessHs => &EDUCATION_SCALE,
            MetricType::Population => &POPULATION_SCALE,
        }
    }
}

fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Choropleth color for a value under the given metric.
///
/// Returns the color of the first threshold the value is strictly below,
/// the most intense color above all thresholds, and [`NEUTRAL_GRAY`] for
/// missing or NaN values.
pub fn color_for(value: Option<f64>, metric: MetricType) -> Swatch {
    let Some(v) = valid(value) else {
        return NEUTRAL_GRAY;
    };
    let scale = metric.scale();
    scale
        .thresholds
        .iter()
        .position(|&t| v < t)
        .map_or(scale.colors[scale.colors.len() - 1], |i| scale.colors[i])
}

/// Display string for a value under the given metric.
///
/// Population abbreviates to `1.5M` / `750k` style; everything else is
/// one-decimal fixed point. Missing or NaN values render as `N/A`.
pub fn format_value(value: Option<f64>, metric: MetricType) -> String {
    let Some(v) = valid(value) else {
        return "N/A".to_string();
    };
    match metric {
        MetricType::Population if v >= 1e6 => format!("{}M", to_fixed(v / 1e6, 1)),
        MetricType::Population => format!("{}k", to_fixed(v / 1e3, 0)),
        _ => to_fixed(v, 1),
    }
}

/// Fixed-point formatting with ties rounded away from zero
/// (`format!` alone rounds half to even, so 500 would show as "0k").
pub fn to_fixed(v: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (v * factor).round() / factor;
    format!("{rounded:.decimals$}")
}

/// Legend entries for a metric: range label and color per bucket
pub fn legend(metric: MetricType) -> Vec<(String, Swatch)> {
    let scale = metric.scale();
    let fmt = |v: f64| format_value(Some(v), metric);
    let t = &scale.thresholds;

    let mut entries = Vec::with_capacity(scale.colors.len());
    entries.push((format!("<{}", fmt(t[0])), scale.colors[0]));
    for i in 1..t.len() {
        entries.push((format!("{}-{}", fmt(t[i - 1]), fmt(t[i])), scale.colors[i]));
    }
    entries.push((format!("{}+", fmt(t[t.len() - 1])), scale.colors[t.len()]));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(value: f64, metric: MetricType) -> usize {
        let color = color_for(Some(value), metric);
        metric.scale().colors.iter().position(|&c| c == color).unwrap()
    }

    #[test]
    fn test_below_first_threshold_is_first_color() {
        for metric in MetricType::ALL {
            let scale = metric.scale();
            let v = scale.thresholds[0] - 0.001;
            assert_eq!(color_for(Some(v), metric), scale.colors[0]);
            assert_eq!(color_for(Some(0.0), metric), scale.colors[0]);
        }
    }

    #[test]
    fn test_at_or_above_last_threshold_is_last_color() {
        for metric in MetricType::ALL {
            let scale = metric.scale();
            let last = scale.thresholds[3];
            assert_eq!(color_for(Some(last), metric), scale.colors[4]);
            assert_eq!(color_for(Some(last * 10.0), metric), scale.colors[4]);
        }
    }

    #[test]
    fn test_threshold_is_exclusive_upper_bound() {
        // 20 is not < 20, so it falls into the second bucket
        assert_eq!(bucket(19.99, MetricType::FatalityRate), 0);
        assert_eq!(bucket(20.0, MetricType::FatalityRate), 1);
        assert_eq!(bucket(29.8, MetricType::FatalityRate), 2);
        assert_eq!(bucket(16.0, MetricType::PctLessHs), 2);
        assert_eq!(bucket(2_999_999.0, MetricType::Population), 1);
    }

    #[test]
    fn test_intensity_is_monotonic() {
        for metric in MetricType::ALL {
            let top = metric.scale().thresholds[3] * 1.5;
            let mut last = 0;
            for step in 0..=300 {
                let v = top * step as f64 / 300.0;
                let b = bucket(v, metric);
                assert!(b >= last, "{metric:?} bucket dropped at {v}");
                last = b;
            }
            assert_eq!(last, 4);
        }
    }

    #[test]
    fn test_missing_is_neutral_for_every_metric() {
        for metric in MetricType::ALL {
            assert_eq!(color_for(None, metric), NEUTRAL_GRAY);
            assert_eq!(color_for(Some(f64::NAN), metric), NEUTRAL_GRAY);
            assert!(!metric.scale().colors.contains(&NEUTRAL_GRAY));
        }
    }

    #[test]
    fn test_format_population() {
        assert_eq!(format_value(Some(1_500_000.0), MetricType::Population), "1.5M");
        assert_eq!(format_value(Some(1_000_000.0), MetricType::Population), "1.0M");
        assert_eq!(format_value(Some(750.0), MetricType::Population), "1k");
        assert_eq!(format_value(Some(999_499.0), MetricType::Population), "999k");
        assert_eq!(format_value(Some(54_321.0), MetricType::Population), "54k");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_value(Some(29.83), MetricType::FatalityRate), "29.8");
        assert_eq!(format_value(Some(12.0), MetricType::PctLessHs), "12.0");
        assert_eq!(format_value(Some(0.25), MetricType::FatalityRate), "0.3");
    }

    #[test]
    fn test_format_invalid() {
        assert_eq!(format_value(None, MetricType::FatalityRate), "N/A");
        assert_eq!(format_value(Some(f64::NAN), MetricType::Population), "N/A");
    }

    #[test]
    fn test_metric_cycle() {
        let mut m = MetricType::default();
        for _ in 0..3 {
            m = m.next();
        }
        assert_eq!(m, MetricType::FatalityRate);
        assert_eq!(MetricType::FatalityRate.prev(), MetricType::Population);
    }

    #[test]
    fn test_legend_matches_scale() {
        let entries = legend(MetricType::FatalityRate);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].0, "<20.0");
        assert_eq!(entries[4].0, "45.0+");
        let pop = legend(MetricType::Population);
        assert_eq!(pop[1].0, "1.0M-3.0M");
    }
}

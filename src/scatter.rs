use crate::data::{CountyData, Job, Outcome, Urbanicity};
use crate::metric::{format_value, to_fixed, MetricType};

/// Plotted range of `% Without High School Diploma`
pub const X_BOUNDS: [f64; 2] = [0.0, 50.0];
/// Plotted range of fatalities per 100k
pub const Y_BOUNDS: [f64; 2] = [0.0, 150.0];

pub const TITLE: &str = "Education vs Fatality Rate by County (2010-2023 Average)";
pub const X_TITLE: &str = "% Without High School Diploma";
pub const Y_TITLE: &str = "Fatalities per 100k Population";

/// Fatality rates at or above this are treated as outliers
const MAX_FATALITY_RATE: f64 = 150.0;

/// Plot coordinates for a row, or `None` if it should not be drawn
pub fn plot_point(row: &CountyData) -> Option<(f64, f64)> {
    let x = row.pct_less_hs.filter(|v| v.is_finite())?;
    let y = row.fatality_rate.filter(|v| v.is_finite())?;
    (y > 0.0 && y < MAX_FATALITY_RATE).then_some((x, y))
}

/// A plotted county
#[derive(Clone, Debug)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub urbanicity: Urbanicity,
    pub row: CountyData,
}

/// County scatter plot: rural and urban series plus a hovered point.
pub struct ScatterView {
    loading: bool,
    /// Points drawn inside the axes, ordered by education then fatality rate
    points: Vec<Point>,
    rural: Vec<(f64, f64)>,
    urban: Vec<(f64, f64)>,
    hovered: Option<usize>,
}

impl ScatterView {
    pub fn mount() -> (Self, Job) {
        let view = Self {
            loading: true,
            points: Vec::new(),
            rural: Vec::new(),
            urban: Vec::new(),
            hovered: None,
        };
        (view, Job::Scatter)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Scatter(Ok(rows)) => self.set_rows(rows),
            Outcome::Scatter(Err(e)) => log::error!("Failed to load scatter data: {e}"),
            _ => log::warn!("scatter view ignoring map data"),
        }
        self.loading = false;
    }

    fn set_rows(&mut self, rows: Vec<CountyData>) {
        let total = rows.len();
        let mut valid = 0;
        let mut points: Vec<Point> = rows
            .into_iter()
            .filter_map(|row| {
                let (x, y) = plot_point(&row)?;
                valid += 1;
                let urbanicity = row.urbanicity?;
                Some(Point {
                    x,
                    y,
                    urbanicity,
                    row,
                })
            })
            .collect();
        points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

        self.rural = series(&points, Urbanicity::Rural);
        self.urban = series(&points, Urbanicity::Urban);
        // Only points inside the fixed axes are drawn, so only they hover
        points.retain(|p| on_axes(p.x, p.y));
        self.points = points;
        self.hovered = None;

        log::info!("Total data points: {total}");
        log::info!("Valid data points: {valid}");
        log::info!("Rural: {} Urban: {}", self.rural.len(), self.urban.len());
    }

    pub fn rural(&self) -> &[(f64, f64)] {
        &self.rural
    }

    pub fn urban(&self) -> &[(f64, f64)] {
        &self.urban
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn hovered(&self) -> Option<&Point> {
        self.points.get(self.hovered?)
    }

    /// Hover the point closest to (x, y) within an elliptical tolerance
    /// of `tol_x` by `tol_y` data units. Clears the hover if none is close.
    pub fn hover_near(&mut self, x: f64, y: f64, tol_x: f64, tol_y: f64) {
        self.hovered = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let dx = (p.x - x) / tol_x;
                let dy = (p.y - y) / tol_y;
                (i, dx * dx + dy * dy)
            })
            .filter(|(_, d)| *d <= 1.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);
    }

    /// Move the hover to the next point along the x axis, wrapping
    pub fn hover_next(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.hovered = Some(match self.hovered {
            Some(i) => (i + 1) % self.points.len(),
            None => 0,
        });
    }

    pub fn hover_prev(&mut self) {
        if self.points.is_empty() {
            return;
        }
        let last = self.points.len() - 1;
        self.hovered = Some(match self.hovered {
            Some(0) | None => last,
            Some(i) => i - 1,
        });
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn tooltip(&self) -> Option<Vec<String>> {
        let p = self.hovered()?;
        Some(vec![
            format!("County: {}", p.row.fips),
            format!("State: {}", p.row.state.as_deref().unwrap_or("N/A")),
            format!("% Without HS: {}%", to_fixed(p.x, 1)),
            format!("Fatality Rate: {} per 100k", to_fixed(p.y, 1)),
            format!(
                "Population: {}",
                format_value(p.row.population, MetricType::Population)
            ),
            format!("Urbanicity: {}", p.urbanicity.as_str()),
        ])
    }
}

fn on_axes(x: f64, y: f64) -> bool {
    (X_BOUNDS[0]..=X_BOUNDS[1]).contains(&x) && (Y_BOUNDS[0]..=Y_BOUNDS[1]).contains(&y)
}

fn series(points: &[Point], urbanicity: Urbanicity) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|p| p.urbanicity == urbanicity)
        .map(|p| (p.x, p.y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LoadError;

    fn row(fips: &str, hs: Option<f64>, rate: Option<f64>, urb: Option<Urbanicity>) -> CountyData {
        CountyData {
            fips: fips.to_string(),
            county_id: None,
            pct_less_hs: hs,
            fatality_rate: rate,
            urbanicity: urb,
            population: Some(55_000.0),
            state: Some("AL".to_string()),
            drunk_rate_per_100k: None,
            dark_pct: None,
            weather_pct: None,
        }
    }

    fn loaded(rows: Vec<CountyData>) -> ScatterView {
        let (mut view, job) = ScatterView::mount();
        assert_eq!(job, Job::Scatter);
        view.apply(Outcome::Scatter(Ok(rows)));
        view
    }

    #[test]
    fn test_fatality_rate_bounds() {
        let rural = Some(Urbanicity::Rural);
        assert_eq!(plot_point(&row("1", Some(10.0), Some(0.0), rural)), None);
        assert_eq!(plot_point(&row("1", Some(10.0), Some(150.0), rural)), None);
        assert_eq!(plot_point(&row("1", Some(10.0), Some(151.0), rural)), None);
        assert_eq!(
            plot_point(&row("1", Some(10.0), Some(149.9), rural)),
            Some((10.0, 149.9))
        );
    }

    #[test]
    fn test_missing_or_nan_excluded() {
        let urban = Some(Urbanicity::Urban);
        assert_eq!(plot_point(&row("1", None, Some(20.0), urban)), None);
        assert_eq!(plot_point(&row("1", Some(f64::NAN), Some(20.0), urban)), None);
        assert_eq!(plot_point(&row("1", Some(10.0), None, urban)), None);
    }

    #[test]
    fn test_partition_by_urbanicity() {
        let view = loaded(vec![
            row("01001", Some(12.0), Some(30.0), Some(Urbanicity::Rural)),
            row("01003", Some(8.0), Some(12.0), Some(Urbanicity::Urban)),
            row("01005", Some(20.0), Some(200.0), Some(Urbanicity::Rural)),
            row("01007", Some(15.0), Some(25.0), None),
        ]);
        assert!(!view.is_loading());
        assert_eq!(view.rural(), &[(12.0, 30.0)]);
        assert_eq!(view.urban(), &[(8.0, 12.0)]);
        assert_eq!(view.points().len(), 2);
    }

    #[test]
    fn test_failure_dismisses_loading() {
        let (mut view, _) = ScatterView::mount();
        let err = LoadError::Io {
            path: "county_scatter.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        view.apply(Outcome::Scatter(Err(err)));
        assert!(!view.is_loading());
        assert!(view.points().is_empty());
    }

    #[test]
    fn test_hover_nearest_within_tolerance() {
        let mut view = loaded(vec![
            row("01001", Some(10.0), Some(30.0), Some(Urbanicity::Rural)),
            row("01003", Some(12.0), Some(31.0), Some(Urbanicity::Urban)),
        ]);
        view.hover_near(11.8, 30.0, 1.0, 3.0);
        assert_eq!(view.hovered().map(|p| p.row.fips.as_str()), Some("01003"));

        view.hover_near(30.0, 100.0, 1.0, 3.0);
        assert!(view.hovered().is_none());
    }

    #[test]
    fn test_step_wraps() {
        let mut view = loaded(vec![
            row("01001", Some(10.0), Some(30.0), Some(Urbanicity::Rural)),
            row("01003", Some(5.0), Some(31.0), Some(Urbanicity::Urban)),
        ]);
        view.hover_next();
        assert_eq!(view.hovered().unwrap().row.fips, "01003");
        view.hover_next();
        assert_eq!(view.hovered().unwrap().row.fips, "01001");
        view.hover_next();
        assert_eq!(view.hovered().unwrap().row.fips, "01003");
        view.hover_prev();
        assert_eq!(view.hovered().unwrap().row.fips, "01001");
    }

    #[test]
    fn test_tooltip_lines() {
        let mut view = loaded(vec![row(
            "01001",
            Some(12.44),
            Some(29.83),
            Some(Urbanicity::Rural),
        )]);
        assert_eq!(view.tooltip(), None);
        view.hover_next();
        assert_eq!(
            view.tooltip().unwrap(),
            [
                "County: 01001",
                "State: AL",
                "% Without HS: 12.4%",
                "Fatality Rate: 29.8 per 100k",
                "Population: 55k",
                "Urbanicity: Rural",
            ]
        );
    }

    #[test]
    fn test_points_off_axes_never_hover() {
        let mut view = loaded(vec![
            row("01001", Some(10.0), Some(30.0), Some(Urbanicity::Rural)),
            row("01003", Some(60.0), Some(40.0), Some(Urbanicity::Rural)),
        ]);
        assert_eq!(view.rural().len(), 2);
        assert_eq!(view.points().len(), 1);

        view.hover_next();
        view.hover_next();
        assert_eq!(view.hovered().unwrap().row.fips, "01001");
        view.hover_prev();
        assert_eq!(view.hovered().unwrap().row.fips, "01001");

        view.hover_near(58.0, 40.0, 5.0, 10.0);
        assert!(view.hovered().is_none());
        assert_eq!(view.tooltip(), None);
    }
}

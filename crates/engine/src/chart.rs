//! Price-history chart rendering.

use chrono::{DateTime, Utc};
use dealwatch_source::{keepa_minutes_to_utc, ProductDetail, SeriesIndex};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const WIDTH: u32 = 900;
const HEIGHT: u32 = 480;
const LINE_COLOR: RGBColor = RGBColor(66, 133, 244);

/// Preferred series, in order: marketplace price, then generic new.
const PREFERRED: [(SeriesIndex, &str); 2] =
    [(SeriesIndex::Amazon, "Amazon"), (SeriesIndex::New, "New")];

/// A decoded price point: timestamp and dollars.
type PricePoint = (DateTime<Utc>, f64);

/// Outcome of a render attempt. A missing chart is not a failure;
/// dispatch proceeds without an image.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Rendered(PathBuf),
    Unavailable,
}

impl ChartOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Rendered(path) => Some(path),
            Self::Unavailable => None,
        }
    }
}

/// Renders price-history charts into an output directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    out_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Render the best available history series for a product.
    pub fn render(&self, detail: &ProductDetail) -> ChartOutcome {
        let Some((label, points)) = usable_series(detail) else {
            debug!(asin = %detail.asin, "no usable price history, skipping chart");
            return ChartOutcome::Unavailable;
        };

        if let Err(err) = std::fs::create_dir_all(&self.out_dir) {
            warn!(error = %err, "could not create chart directory");
            return ChartOutcome::Unavailable;
        }

        let path = self.out_dir.join(format!("{}.png", detail.asin));
        let title = detail.title.as_deref().unwrap_or(&detail.asin);
        match draw(&path, title, label, &points) {
            Ok(()) => {
                debug!(asin = %detail.asin, points = points.len(), series = label, "chart rendered");
                ChartOutcome::Rendered(path)
            }
            Err(err) => {
                warn!(asin = %detail.asin, error = %err, "chart rendering failed");
                ChartOutcome::Unavailable
            }
        }
    }
}

/// Decode an interleaved `[minute, price, ...]` row, dropping sentinel
/// prices and converting to calendar time and dollars.
fn decode_row(row: &[i64]) -> Vec<PricePoint> {
    row.chunks_exact(2)
        .filter(|pair| pair[1] >= 0)
        .map(|pair| (keepa_minutes_to_utc(pair[0]), pair[1] as f64 / 100.0))
        .collect()
}

/// Pick the first series with enough points to draw: preferred indices
/// first, then any populated series as a fallback.
fn usable_series(detail: &ProductDetail) -> Option<(&'static str, Vec<PricePoint>)> {
    for (index, label) in PREFERRED {
        if let Some(row) = detail.series(index) {
            let points = decode_row(row);
            if points.len() >= 2 {
                return Some((label, points));
            }
        }
    }

    let csv = detail.csv.as_ref()?;
    for index in 0..csv.len() {
        if let Some(row) = detail.series_at(index) {
            let points = decode_row(row);
            if points.len() >= 2 {
                return Some(("Price", points));
            }
        }
    }
    None
}

fn draw(
    path: &Path,
    title: &str,
    series_label: &str,
    points: &[PricePoint],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    let start = points[0].0;
    let end = points[points.len() - 1].0;
    let low = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let high = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((high - low) * 0.1).max(0.5);

    let mut chart = ChartBuilder::on(&root)
        .caption(truncate(title, 60), ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(60)
        .build_cartesian_2d(start..end, (low - pad).max(0.0)..high + pad)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|dt| dt.format("%b %d").to_string())
        .x_desc("Date")
        .y_desc(format!("{series_label} price (USD)"))
        .draw()?;

    chart.draw_series(AreaSeries::new(
        points.iter().copied(),
        0.0,
        LINE_COLOR.mix(0.15),
    ))?;
    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        LINE_COLOR.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detail_with_csv(csv: Vec<Option<Vec<i64>>>) -> ProductDetail {
        ProductDetail {
            asin: "B01ABCDEFG".to_string(),
            csv: Some(csv),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_row_drops_sentinels() {
        let points = decode_row(&[100, 1999, 200, -1, 300, 1899]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].1, 19.99);
        assert_eq!(points[1].1, 18.99);
        assert!(points[1].0 > points[0].0);
    }

    #[test]
    fn test_preferred_series_order() {
        // Amazon series has only one usable point; New is complete
        let detail = detail_with_csv(vec![
            Some(vec![100, 1999, 200, -1]),
            Some(vec![100, 1799, 200, 1699]),
        ]);
        let (label, points) = usable_series(&detail).unwrap();
        assert_eq!(label, "New");
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_fallback_to_any_series() {
        // Neither preferred index usable; used-condition series is
        let detail = detail_with_csv(vec![
            None,
            None,
            Some(vec![100, 999, 200, 899, 300, 799]),
        ]);
        let (label, points) = usable_series(&detail).unwrap();
        assert_eq!(label, "Price");
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_no_series_is_unavailable() {
        let detail = detail_with_csv(vec![None, Some(vec![100, 1999])]);
        // single point is not drawable
        assert!(usable_series(&detail).is_none());
        assert!(usable_series(&ProductDetail::default()).is_none());
    }

    #[test]
    fn test_render_without_history_is_unavailable() {
        let renderer = ChartRenderer::new(std::env::temp_dir());
        let outcome = renderer.render(&ProductDetail::default());
        assert_eq!(outcome, ChartOutcome::Unavailable);
        assert_eq!(outcome.path(), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-ten", 11), "exactly-ten");
        assert_eq!(truncate("abcdefghij", 5), "abcde…");
    }
}

//! Hour-of-day usage distributions.

use crate::appliance::Appliance;

use super::types::HOURS_PER_DAY;
use super::window::{HourSpan, UsageWindow};

/// Windows up to this many hours long are treated as short bursts.
const BURST_MAX_SPAN_HOURS: usize = 6;

/// Intra-window usage curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Uniform weight across each window.
    Flat,
    /// Gaussian-like bump centred on each window's midpoint.
    Peaked,
}

/// Picks the usage curve for an appliance.
///
/// The refrigerator draws continuously and is always flat. Otherwise
/// several windows, or a single short one, indicate burst usage and get a
/// peaked curve; long single windows stay flat.
pub fn select_shape(appliance: Appliance, windows: &[UsageWindow]) -> Shape {
    if appliance == Appliance::Refrigerator {
        return Shape::Flat;
    }
    if windows.len() > 1 {
        return Shape::Peaked;
    }
    let longest = windows.iter().map(UsageWindow::span_hours).max().unwrap_or(0);
    if longest <= BURST_MAX_SPAN_HOURS {
        Shape::Peaked
    } else {
        Shape::Flat
    }
}

/// Builds a 24-entry probability vector over the given spans.
///
/// Contributions of overlapping spans add up. The result sums to 1, or is
/// all zeros when `spans` carries no weight; callers treat the latter as
/// "no usage".
pub fn build_distribution(spans: &[HourSpan], shape: Shape) -> [f64; HOURS_PER_DAY] {
    let mut weights = [0.0_f64; HOURS_PER_DAY];

    for span in spans.iter().filter(|s| !s.is_empty()) {
        let hours = span.start..span.end.min(HOURS_PER_DAY);
        match shape {
            Shape::Flat => {
                let w = 1.0 / span.len() as f64;
                for h in hours {
                    weights[h] += w;
                }
            }
            Shape::Peaked => {
                let mid = span.midpoint();
                let sigma = (span.len() as f64 / 3.0).max(1.0);
                for h in hours {
                    // Hour centres, not hour starts.
                    let z = (h as f64 + 0.5 - mid) / sigma;
                    weights[h] += (-0.5 * z * z).exp();
                }
            }
        }
    }

    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in &mut weights {
            *w /= total;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::window::normalize_windows;

    fn sum(d: &[f64]) -> f64 {
        d.iter().sum()
    }

    #[test]
    fn flat_distribution_is_uniform_inside_window() {
        let spans = normalize_windows(&[UsageWindow::new(9.0, 13.0)]);
        let d = build_distribution(&spans, Shape::Flat);
        for (h, &w) in d.iter().enumerate() {
            if (9..13).contains(&h) {
                assert!((w - 0.25).abs() < 1e-12, "hour {h}: {w}");
            } else {
                assert_eq!(w, 0.0, "hour {h}");
            }
        }
    }

    #[test]
    fn distributions_sum_to_one() {
        let cases = [
            vec![UsageWindow::new(22.0, 3.0)],
            vec![UsageWindow::new(6.0, 8.0), UsageWindow::new(18.0, 23.0)],
            vec![UsageWindow::new(0.0, 0.0)],
            vec![UsageWindow::new(7.0, 8.0), UsageWindow::new(7.0, 12.0)],
        ];
        for windows in cases {
            let spans = normalize_windows(&windows);
            for shape in [Shape::Flat, Shape::Peaked] {
                let d = build_distribution(&spans, shape);
                assert!((sum(&d) - 1.0).abs() < 1e-9, "{windows:?} {shape:?}");
            }
        }
    }

    #[test]
    fn empty_spans_give_all_zero() {
        let d = build_distribution(&[], Shape::Peaked);
        assert!(d.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn overlapping_flat_windows_accumulate() {
        let spans = normalize_windows(&[UsageWindow::new(8.0, 10.0), UsageWindow::new(9.0, 10.0)]);
        let d = build_distribution(&spans, Shape::Flat);
        // raw weights: h8 = 0.5, h9 = 0.5 + 1.0
        assert!((d[9] / d[8] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn peaked_distribution_is_highest_at_centre() {
        let spans = normalize_windows(&[UsageWindow::new(10.0, 16.0)]);
        let d = build_distribution(&spans, Shape::Peaked);
        assert!(d[12] > d[10]);
        assert!((d[12] - d[13]).abs() < 1e-12, "symmetric around 13:00");
        assert_eq!(d[9], 0.0);
        assert_eq!(d[16], 0.0);
    }

    #[test]
    fn refrigerator_is_always_flat() {
        let windows = [UsageWindow::new(1.0, 2.0), UsageWindow::new(5.0, 6.0)];
        assert_eq!(select_shape(Appliance::Refrigerator, &windows), Shape::Flat);
    }

    #[test]
    fn shape_heuristic_distinguishes_bursts() {
        let long = [UsageWindow::new(9.0, 17.0)];
        let short = [UsageWindow::new(18.0, 23.0)];
        let many = [UsageWindow::new(9.0, 17.0), UsageWindow::new(18.0, 23.0)];
        assert_eq!(select_shape(Appliance::Computer, &long), Shape::Flat);
        assert_eq!(select_shape(Appliance::Tv, &short), Shape::Peaked);
        assert_eq!(select_shape(Appliance::Lights, &many), Shape::Peaked);
        // wraps midnight: 20 -> 8 spans 12 hours
        let overnight = [UsageWindow::new(20.0, 8.0)];
        assert_eq!(select_shape(Appliance::Fan, &overnight), Shape::Flat);
    }
}

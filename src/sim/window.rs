//! Usage-window normalization.
//!
//! Configured windows may wrap past midnight (`start > end`). The
//! distribution builder only understands non-wrapping hour spans, so every
//! window is reduced into `[0, 24)` and split at midnight when needed.

use serde::{Deserialize, Serialize};

use super::types::HOURS_PER_DAY;

/// A configured `[start, end)` interval of hours during which an appliance runs.
///
/// `start > end` denotes a window that wraps past midnight; `start == end`
/// denotes the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub start: f64,
    pub end: f64,
}

/// A non-wrapping span of whole hours, `0 <= start < end <= 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourSpan {
    pub start: usize,
    pub end: usize,
}

impl UsageWindow {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Floors both bounds and reduces them into `[0, 24)`.
    ///
    /// Returns `None` when either bound is not finite.
    fn reduced(&self) -> Option<(usize, usize)> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return None;
        }
        let day = HOURS_PER_DAY as f64;
        let start = self.start.floor().rem_euclid(day) as usize;
        let end = self.end.floor().rem_euclid(day) as usize;
        Some((start, end))
    }

    /// Number of hours covered once wraparound is taken into account.
    ///
    /// A degenerate window counts as the whole day; an unusable one as zero.
    pub fn span_hours(&self) -> usize {
        match self.reduced() {
            None => 0,
            Some((start, end)) if start == end => HOURS_PER_DAY,
            Some((start, end)) if start < end => end - start,
            Some((start, end)) => HOURS_PER_DAY - start + end,
        }
    }
}

impl HourSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Midpoint of the span in fractional hours.
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) as f64 / 2.0
    }
}

/// Converts configured windows into non-wrapping hour spans.
///
/// Windows with a non-finite bound are dropped silently, so the result may
/// be empty.
///
/// # Examples
///
/// ```
/// use home_emissions::sim::window::{normalize_windows, HourSpan, UsageWindow};
///
/// let spans = normalize_windows(&[UsageWindow::new(22.0, 3.0)]);
/// assert_eq!(spans, vec![HourSpan { start: 22, end: 24 }, HourSpan { start: 0, end: 3 }]);
/// ```
pub fn normalize_windows(windows: &[UsageWindow]) -> Vec<HourSpan> {
    let mut spans = Vec::with_capacity(windows.len() + 1);
    for window in windows {
        let Some((start, end)) = window.reduced() else {
            continue;
        };
        if start == end {
            spans.push(HourSpan {
                start: 0,
                end: HOURS_PER_DAY,
            });
        } else if start < end {
            spans.push(HourSpan { start, end });
        } else {
            spans.push(HourSpan {
                start,
                end: HOURS_PER_DAY,
            });
            // `end == 0` means the window stops exactly at midnight.
            if end > 0 {
                spans.push(HourSpan { start: 0, end });
            }
        }
    }
    spans
}

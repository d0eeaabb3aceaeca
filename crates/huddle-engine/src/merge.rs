//! Normalize busy time into a sorted, non-overlapping timeline.
//!
//! Sorts intervals by start time, then folds every interval that genuinely
//! overlaps the current one into it. Intervals that only touch stay separate
//! entries with a zero-width gap between them.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::interval::TimeInterval;

/// The union of one or more overlapping busy intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedInterval {
    interval: TimeInterval,
}

impl MergedInterval {
    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }

    pub fn duration(&self) -> Duration {
        self.interval.duration()
    }

    /// The merged range as a plain interval.
    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    /// The part of this block inside `window`, if any.
    pub(crate) fn clipped_to(&self, window: &TimeInterval) -> Option<MergedInterval> {
        if !self.interval.overlaps(window) {
            return None;
        }
        Some(MergedInterval {
            interval: TimeInterval::from_ordered(
                self.start().max(window.start()),
                self.end().min(window.end()),
            ),
        })
    }
}

/// Merge possibly-overlapping intervals into a minimal sorted sequence.
///
/// Returns entries sorted by start where no two entries overlap. Adjacent
/// entries may touch (`a.end == b.start`). Empty input yields an empty vec.
pub fn merge_intervals<I>(intervals: I) -> Vec<MergedInterval>
where
    I: IntoIterator<Item = TimeInterval>,
{
    let mut sorted: Vec<TimeInterval> = intervals.into_iter().collect();
    if sorted.is_empty() {
        return Vec::new();
    }

    // Sort by start time (then by end time for stability).
    sorted.sort_by_key(|iv| (iv.start(), iv.end()));

    let mut merged: Vec<MergedInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        if let Some(current) = merged.last_mut() {
            if interval.start() < current.end() {
                // Genuine overlap: extend the current entry.
                if interval.end() > current.end() {
                    current.interval = TimeInterval::from_ordered(current.start(), interval.end());
                }
                continue;
            }
        }
        merged.push(MergedInterval { interval });
    }

    merged
}

//! Carve fixed-length free slots out of the gaps in a busy timeline.
//!
//! Walks a cursor across the bounding window. Each gap between busy blocks is
//! cut into consecutive slots of exactly the requested length, starting at the
//! gap's own start. Whatever is left at the end of a gap is dropped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::TimeInterval;
use crate::merge::MergedInterval;

/// A free time slot of exactly the requested length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FreeSlot {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn interval(&self) -> TimeInterval {
        TimeInterval::from_ordered(self.start, self.end)
    }
}

/// Generate every free slot of length `duration` inside `bounds`.
///
/// `busy` must be sorted by start, as produced by
/// [`merge_intervals`](crate::merge::merge_intervals). Blocks that lie partly or
/// wholly outside `bounds` are allowed; only the part inside the window
/// matters.
///
/// Slots are aligned to the start of the gap they were cut from, not to any
/// wall-clock boundary.
///
/// # Errors
/// Returns [`EngineError::InvalidDuration`] if `duration` is zero or negative.
pub fn generate_slots(
    bounds: &TimeInterval,
    busy: &[MergedInterval],
    duration: Duration,
) -> Result<Vec<FreeSlot>> {
    if duration <= Duration::zero() {
        return Err(EngineError::InvalidDuration(duration));
    }

    let mut slots = Vec::new();
    let mut cursor = bounds.start();

    for block in busy {
        if cursor >= bounds.end() {
            break;
        }
        if cursor < block.start() {
            fill_gap(cursor, block.start().min(bounds.end()), duration, &mut slots);
        }
        cursor = cursor.max(block.end());
    }

    // Trailing gap after the last busy block.
    if cursor < bounds.end() {
        fill_gap(cursor, bounds.end(), duration, &mut slots);
    }

    Ok(slots)
}

fn fill_gap(
    gap_start: DateTime<Utc>,
    gap_end: DateTime<Utc>,
    duration: Duration,
    slots: &mut Vec<FreeSlot>,
) {
    let mut slot_start = gap_start;
    // An end past the representable range cannot fit in the gap either.
    while let Some(slot_end) = slot_start.checked_add_signed(duration) {
        if slot_end > gap_end {
            break;
        }
        slots.push(FreeSlot {
            start: slot_start,
            end: slot_end,
        });
        slot_start = slot_end;
    }
}

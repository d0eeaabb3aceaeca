//! Group free-slot search over a shared commitment store.
//!
//! All commitments of all requested participants are pooled into one
//! timeline: the group is busy whenever any member is busy. The pooled
//! timeline is merged, then cut into fixed-length free slots inside the
//! requested window.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::interval::{ParticipantSet, TimeInterval};
use crate::merge::{merge_intervals, MergedInterval};
use crate::slots::{generate_slots, FreeSlot};
use crate::store::{self, CommitmentStore};

/// Busy timeline and free slots of a group within a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAvailability {
    /// The analysis window start.
    pub window_start: DateTime<Utc>,
    /// The analysis window end.
    pub window_end: DateTime<Utc>,
    /// Merged busy blocks clipped to the window (sorted by start).
    pub busy: Vec<MergedInterval>,
    /// Free slots of the requested length.
    pub free: Vec<FreeSlot>,
}

/// Find every free slot of `slot_duration` common to `participants` in
/// `[from, to)`.
///
/// An empty participant set leaves the whole window free and skips the store.
///
/// # Errors
/// - [`EngineError::InvalidRange`] if `from >= to`.
/// - [`EngineError::InvalidDuration`] if `slot_duration` is not positive.
/// - [`EngineError::Store`] if the store fails; no partial result is returned.
pub fn find_free_slots<S: CommitmentStore + ?Sized>(
    participants: &ParticipantSet,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    slot_duration: Duration,
    store: &S,
) -> Result<Vec<FreeSlot>> {
    let window = validate(from, to, slot_duration)?;
    let busy = busy_timeline(participants, &window, store)?;
    let free = generate_slots(&window, &busy, slot_duration)?;

    debug!(
        participants = participants.len(),
        busy_blocks = busy.len(),
        slots = free.len(),
        "found free slots"
    );
    Ok(free)
}

/// The earliest free slot of `slot_duration` common to `participants`, if any.
///
/// Same validation and errors as [`find_free_slots`].
pub fn find_first_free_slot<S: CommitmentStore + ?Sized>(
    participants: &ParticipantSet,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    slot_duration: Duration,
    store: &S,
) -> Result<Option<FreeSlot>> {
    Ok(find_free_slots(participants, from, to, slot_duration, store)?
        .into_iter()
        .next())
}

/// Compute both the merged busy timeline and the free slots of a group.
///
/// Same validation and errors as [`find_free_slots`].
pub fn group_availability<S: CommitmentStore + ?Sized>(
    participants: &ParticipantSet,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    slot_duration: Duration,
    store: &S,
) -> Result<GroupAvailability> {
    let window = validate(from, to, slot_duration)?;
    let busy = busy_timeline(participants, &window, store)?;
    let free = generate_slots(&window, &busy, slot_duration)?;

    let busy = busy
        .iter()
        .filter_map(|block| block.clipped_to(&window))
        .collect();

    Ok(GroupAvailability {
        window_start: from,
        window_end: to,
        busy,
        free,
    })
}

fn validate(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    slot_duration: Duration,
) -> Result<TimeInterval> {
    let window = TimeInterval::new(from, to)?;
    if slot_duration <= Duration::zero() {
        return Err(EngineError::InvalidDuration(slot_duration));
    }
    Ok(window)
}

/// Fetch and merge the pooled commitments of `participants` overlapping `window`.
fn busy_timeline<S: CommitmentStore + ?Sized>(
    participants: &ParticipantSet,
    window: &TimeInterval,
    store: &S,
) -> Result<Vec<MergedInterval>> {
    if participants.is_empty() {
        return Ok(Vec::new());
    }

    let commitments = store::fetch(store, participants, window.start(), window.end(), None)?;
    let fetched = commitments.len();
    let merged = merge_intervals(
        commitments
            .into_iter()
            .map(|c| c.interval)
            .filter(|interval| interval.overlaps(window)),
    );

    debug!(fetched, merged = merged.len(), "merged group commitments");
    Ok(merged)
}

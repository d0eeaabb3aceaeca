//! Detect whether a candidate event time collides with existing commitments.
//!
//! Each fetched commitment is compared directly against the candidate; there
//! is no merge step. Adjacent events (where one ends exactly when another
//! starts) are NOT conflicts.

use chrono::Duration;
use tracing::debug;

use crate::error::Result;
use crate::interval::{Commitment, EventId, ParticipantSet, TimeInterval};
use crate::store::{self, CommitmentStore};

/// An existing commitment that overlaps the candidate interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    /// The colliding commitment as returned by the store.
    pub commitment: Commitment,
    /// Length of the shared part of the candidate and the commitment.
    pub overlap: Duration,
}

/// Report whether any of `participants` is already committed during `candidate`.
///
/// `exclude_event` names the event being edited so it does not collide with
/// itself. An empty participant set never conflicts and does not touch the
/// store.
///
/// # Errors
/// Returns [`EngineError::Store`](crate::EngineError::Store) if the fetch fails.
pub fn has_conflict<S: CommitmentStore + ?Sized>(
    participants: &ParticipantSet,
    candidate: &TimeInterval,
    store: &S,
    exclude_event: Option<EventId>,
) -> Result<bool> {
    if participants.is_empty() {
        return Ok(false);
    }

    let commitments = store::fetch(
        store,
        participants,
        candidate.start(),
        candidate.end(),
        exclude_event,
    )?;
    let conflict = commitments
        .iter()
        .any(|c| collides(c, candidate, exclude_event));

    debug!(
        participants = participants.len(),
        fetched = commitments.len(),
        conflict,
        candidate = %candidate,
        "conflict check"
    );
    Ok(conflict)
}

/// Like [`has_conflict`], but returns every colliding commitment with its
/// overlap, ordered by commitment start.
pub fn find_conflicts<S: CommitmentStore + ?Sized>(
    participants: &ParticipantSet,
    candidate: &TimeInterval,
    store: &S,
    exclude_event: Option<EventId>,
) -> Result<Vec<Conflict>> {
    if participants.is_empty() {
        return Ok(Vec::new());
    }

    let commitments = store::fetch(
        store,
        participants,
        candidate.start(),
        candidate.end(),
        exclude_event,
    )?;

    let mut conflicts: Vec<Conflict> = commitments
        .into_iter()
        .filter(|c| Some(c.event_id) != exclude_event)
        .filter_map(|c| {
            c.interval.overlap_with(candidate).map(|overlap| Conflict {
                commitment: c,
                overlap,
            })
        })
        .collect();
    conflicts.sort_by_key(|c| (c.commitment.interval.start(), c.commitment.event_id));

    Ok(conflicts)
}

// Overlap iff c.start < candidate.end AND c.end > candidate.start.
fn collides(c: &Commitment, candidate: &TimeInterval, exclude_event: Option<EventId>) -> bool {
    Some(c.event_id) != exclude_event && c.interval.overlaps(candidate)
}

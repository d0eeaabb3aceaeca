//! The engine's only view of persisted calendar data.

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::interval::{Commitment, EventId, ParticipantSet};

/// Source of existing commitments.
///
/// Implementations own all I/O. The engine calls [`fetch_commitments`] once per
/// query and never writes through this trait.
///
/// Booking (check for conflicts, then write) is not atomic from the engine's
/// side. A store that accepts writes must serialize check-and-write itself,
/// either with a lock or transaction scoped to the participants involved or
/// with an exclusion constraint that rejects the losing writer.
/// [`MemoryStore`](crate::memory::MemoryStore) holds one write lock across both.
///
/// [`fetch_commitments`]: CommitmentStore::fetch_commitments
pub trait CommitmentStore {
    /// Every commitment held by any of `participants` whose interval overlaps
    /// `[range_start, range_end)`, minus the commitment of `exclude_event`.
    fn fetch_commitments(
        &self,
        participants: &ParticipantSet,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        exclude_event: Option<EventId>,
    ) -> Result<Vec<Commitment>, StoreError>;
}

impl<S: CommitmentStore + ?Sized> CommitmentStore for &S {
    fn fetch_commitments(
        &self,
        participants: &ParticipantSet,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        exclude_event: Option<EventId>,
    ) -> Result<Vec<Commitment>, StoreError> {
        (**self).fetch_commitments(participants, range_start, range_end, exclude_event)
    }
}

/// Fetch through `store`, logging failures before handing them back unchanged.
pub(crate) fn fetch<S: CommitmentStore + ?Sized>(
    store: &S,
    participants: &ParticipantSet,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    exclude_event: Option<EventId>,
) -> crate::error::Result<Vec<Commitment>> {
    store
        .fetch_commitments(participants, range_start, range_end, exclude_event)
        .map_err(|err| {
            tracing::warn!(
                participants = participants.len(),
                %range_start,
                %range_end,
                error = %err,
                "commitment fetch failed"
            );
            err.into()
        })
}

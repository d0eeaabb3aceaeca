//! In-memory event store with serialized booking.
//!
//! [`MemoryStore`] keeps events in a `BTreeMap` behind one `RwLock`. Queries
//! take the read lock. Creating or moving an event, and adding participants
//! to one, take the write lock and hold it across the conflict check and the
//! write, so two overlapping bookings for the same participant can never both
//! succeed.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::conflict::has_conflict;
use crate::error::{EngineError, Result, StoreError};
use crate::interval::{Commitment, EventId, ParticipantId, ParticipantSet, TimeInterval};
use crate::store::CommitmentStore;

/// A calendar event as kept by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub interval: TimeInterval,
    pub created_by: ParticipantId,
    pub participants: ParticipantSet,
}

impl Event {
    /// The commitment this event places on its participants.
    pub fn commitment(&self) -> Commitment {
        Commitment {
            event_id: self.id,
            interval: self.interval,
            participants: self.participants.clone(),
        }
    }
}

/// Request to create an event. The creator is always added as a participant.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub interval: TimeInterval,
    pub created_by: ParticipantId,
    pub participants: ParticipantSet,
}

/// Partial edit of an existing event. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Events {
    by_id: BTreeMap<EventId, Event>,
    next_id: u64,
}

impl Events {
    fn allocate_id(&mut self) -> EventId {
        self.next_id += 1;
        EventId(self.next_id)
    }
}

impl CommitmentStore for Events {
    fn fetch_commitments(
        &self,
        participants: &ParticipantSet,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        exclude_event: Option<EventId>,
    ) -> std::result::Result<Vec<Commitment>, StoreError> {
        let mut commitments: Vec<Commitment> = self
            .by_id
            .values()
            .filter(|e| Some(e.id) != exclude_event)
            .filter(|e| e.interval.start() < range_end && e.interval.end() > range_start)
            .filter(|e| e.participants.intersects(participants))
            .map(Event::commitment)
            .collect();
        commitments.sort_by_key(|c| (c.interval.start(), c.event_id));
        Ok(commitments)
    }
}

/// Thread-safe in-memory calendar.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<Events>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing events without conflict checks.
    ///
    /// Later ids are allocated above the largest id seen. A repeated id keeps
    /// the last event given.
    pub fn from_events<I: IntoIterator<Item = Event>>(events: I) -> Self {
        let mut state = Events::default();
        for event in events {
            state.next_id = state.next_id.max(event.id.0);
            state.by_id.insert(event.id, event);
        }
        Self {
            events: RwLock::new(state),
        }
    }

    /// Create an event after checking its participants are free.
    ///
    /// # Errors
    /// - [`EngineError::Conflict`] if any participant (creator included) has
    ///   an overlapping commitment.
    /// - [`EngineError::Store`] if the store lock is poisoned.
    pub fn create_event(&self, request: NewEvent) -> Result<Event> {
        let mut participants = request.participants;
        participants.insert(request.created_by);

        let mut state = self.write()?;
        if has_conflict(&participants, &request.interval, &*state, None)? {
            warn!(interval = %request.interval, "booking rejected: participant busy");
            return Err(EngineError::Conflict);
        }

        let event = Event {
            id: state.allocate_id(),
            title: request.title,
            description: request.description,
            interval: request.interval,
            created_by: request.created_by,
            participants,
        };
        state.by_id.insert(event.id, event.clone());

        debug!(event = %event.id, interval = %event.interval, "event created");
        Ok(event)
    }

    /// Apply `update` to event `id`.
    ///
    /// Missing start/end fall back to the stored ones. When the time changes,
    /// the new interval is checked against the commitments of the event's
    /// participants and its creator, ignoring the event itself. Title and
    /// description are only replaced by non-blank values.
    ///
    /// # Errors
    /// - [`EngineError::EventNotFound`] if no such event exists.
    /// - [`EngineError::InvalidRange`] if the resulting start is not before the end.
    /// - [`EngineError::Conflict`] if the new time collides with another event.
    pub fn update_event(&self, id: EventId, update: EventUpdate) -> Result<Event> {
        let mut state = self.write()?;
        let current = state
            .by_id
            .get(&id)
            .cloned()
            .ok_or(EngineError::EventNotFound(id))?;

        let interval = TimeInterval::new(
            update.start.unwrap_or(current.interval.start()),
            update.end.unwrap_or(current.interval.end()),
        )?;

        if interval != current.interval {
            let mut participants = current.participants.clone();
            participants.insert(current.created_by);
            if has_conflict(&participants, &interval, &*state, Some(id))? {
                warn!(event = %id, interval = %interval, "update rejected: participant busy");
                return Err(EngineError::Conflict);
            }
        }

        let mut updated = current;
        if let Some(title) = update.title.filter(|t| !t.trim().is_empty()) {
            updated.title = title;
        }
        if let Some(description) = update.description.filter(|d| !d.trim().is_empty()) {
            updated.description = Some(description);
        }
        updated.interval = interval;
        state.by_id.insert(id, updated.clone());

        debug!(event = %id, interval = %interval, "event updated");
        Ok(updated)
    }

    /// Remove event `id`, returning it.
    pub fn delete_event(&self, id: EventId) -> Result<Event> {
        let removed = self
            .write()?
            .by_id
            .remove(&id)
            .ok_or(EngineError::EventNotFound(id))?;
        debug!(event = %id, "event deleted");
        Ok(removed)
    }

    /// Current participants of event `id`.
    ///
    /// # Errors
    /// Returns [`EngineError::EventNotFound`] if no such event exists.
    pub fn participants(&self, id: EventId) -> Result<ParticipantSet> {
        self.read()?
            .by_id
            .get(&id)
            .map(|e| e.participants.clone())
            .ok_or(EngineError::EventNotFound(id))
    }

    /// Add participants to event `id`. Ids already on the event are skipped.
    ///
    /// Newcomers are checked against their other commitments under the same
    /// write lock as the insert. Either all of them join or none do.
    ///
    /// # Errors
    /// - [`EngineError::EventNotFound`] if no such event exists.
    /// - [`EngineError::Conflict`] if any newcomer is busy during the event.
    pub fn add_participants<I>(&self, id: EventId, ids: I) -> Result<Event>
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        let mut state = self.write()?;
        let current = state.by_id.get(&id).ok_or(EngineError::EventNotFound(id))?;

        let newcomers: ParticipantSet = ids
            .into_iter()
            .filter(|p| !current.participants.contains(p))
            .collect();
        if newcomers.is_empty() {
            return Ok(current.clone());
        }

        let interval = current.interval;
        if has_conflict(&newcomers, &interval, &*state, Some(id))? {
            warn!(event = %id, added = newcomers.len(), "participants rejected: busy");
            return Err(EngineError::Conflict);
        }

        let event = state
            .by_id
            .get_mut(&id)
            .ok_or(EngineError::EventNotFound(id))?;
        for participant in &newcomers {
            event.participants.insert(*participant);
        }

        debug!(event = %id, added = newcomers.len(), "participants added");
        Ok(event.clone())
    }

    /// Remove `participant` from event `id`.
    ///
    /// # Errors
    /// - [`EngineError::EventNotFound`] if no such event exists.
    /// - [`EngineError::CreatorRemoval`] if `participant` created the event.
    /// - [`EngineError::ParticipantNotFound`] if `participant` is not on the event.
    pub fn remove_participant(&self, id: EventId, participant: ParticipantId) -> Result<Event> {
        let mut state = self.write()?;
        let event = state
            .by_id
            .get_mut(&id)
            .ok_or(EngineError::EventNotFound(id))?;

        if event.created_by == participant {
            return Err(EngineError::CreatorRemoval {
                event: id,
                participant,
            });
        }
        if !event.participants.remove(&participant) {
            return Err(EngineError::ParticipantNotFound {
                event: id,
                participant,
            });
        }

        debug!(event = %id, %participant, "participant removed");
        Ok(event.clone())
    }

    pub fn event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.read()?.by_id.get(&id).cloned())
    }

    /// Events lying entirely inside the given bounds, ordered by start.
    ///
    /// An absent bound is open. Equal bounds are allowed.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidRange`] if `from > to`.
    pub fn events_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Event>> {
        if let (Some(start), Some(end)) = (from, to) {
            if start > end {
                return Err(EngineError::InvalidRange { start, end });
            }
        }

        let state = self.read()?;
        let mut events: Vec<Event> = state
            .by_id
            .values()
            .filter(|e| from.is_none_or(|f| e.interval.start() >= f))
            .filter(|e| to.is_none_or(|t| e.interval.end() <= t))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.interval.start(), e.id));
        Ok(events)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.by_id.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.by_id.is_empty())
    }

    fn read(&self) -> std::result::Result<RwLockReadGuard<'_, Events>, StoreError> {
        self.events
            .read()
            .map_err(|_| StoreError::new("event store lock poisoned"))
    }

    fn write(&self) -> std::result::Result<RwLockWriteGuard<'_, Events>, StoreError> {
        self.events
            .write()
            .map_err(|_| StoreError::new("event store lock poisoned"))
    }
}

impl CommitmentStore for MemoryStore {
    fn fetch_commitments(
        &self,
        participants: &ParticipantSet,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        exclude_event: Option<EventId>,
    ) -> std::result::Result<Vec<Commitment>, StoreError> {
        self.read()?
            .fetch_commitments(participants, range_start, range_end, exclude_event)
    }
}

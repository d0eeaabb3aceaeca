//! Tests for conflict detection against stored commitments.

use std::cell::Cell;

use chrono::{DateTime, Duration, TimeZone, Utc};
use huddle_engine::{
    find_conflicts, has_conflict, Commitment, CommitmentStore, EngineError, Event, EventId,
    MemoryStore, ParticipantId, ParticipantSet, StoreError, TimeInterval,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, min, 0).unwrap()
}

fn iv(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> TimeInterval {
    TimeInterval::new(at(start_hour, start_min), at(end_hour, end_min)).unwrap()
}

fn people(ids: &[u64]) -> ParticipantSet {
    ids.iter().copied().map(ParticipantId).collect()
}

fn event(id: u64, interval: TimeInterval, participants: &[u64]) -> Event {
    Event {
        id: EventId(id),
        title: format!("event {id}"),
        description: None,
        interval,
        created_by: ParticipantId(participants[0]),
        participants: people(participants),
    }
}

/// Returns every commitment it holds, ignoring all filters.
struct OverFetchingStore(Vec<Commitment>);

impl CommitmentStore for OverFetchingStore {
    fn fetch_commitments(
        &self,
        _participants: &ParticipantSet,
        _range_start: DateTime<Utc>,
        _range_end: DateTime<Utc>,
        _exclude_event: Option<EventId>,
    ) -> Result<Vec<Commitment>, StoreError> {
        Ok(self.0.clone())
    }
}

struct FailingStore {
    calls: Cell<usize>,
}

impl CommitmentStore for FailingStore {
    fn fetch_commitments(
        &self,
        _participants: &ParticipantSet,
        _range_start: DateTime<Utc>,
        _range_end: DateTime<Utc>,
        _exclude_event: Option<EventId>,
    ) -> Result<Vec<Commitment>, StoreError> {
        self.calls.set(self.calls.get() + 1);
        Err(StoreError::new("database unavailable"))
    }
}

// ── has_conflict ────────────────────────────────────────────────────────────

#[test]
fn touching_commitment_is_not_a_conflict() {
    // Existing 09:00-10:00, candidate 10:00-11:00 for the same participant.
    let store = MemoryStore::from_events(vec![event(1, iv(9, 0, 10, 0), &[7])]);

    let conflict = has_conflict(&people(&[7]), &iv(10, 0, 11, 0), &store, None).unwrap();

    assert!(!conflict, "an event ending when another begins must not conflict");
}

#[test]
fn candidate_ending_at_commitment_start_is_not_a_conflict() {
    let store = MemoryStore::from_events(vec![event(1, iv(10, 0, 11, 0), &[7])]);

    let conflict = has_conflict(&people(&[7]), &iv(9, 0, 10, 0), &store, None).unwrap();

    assert!(!conflict);
}

#[test]
fn one_second_overlap_is_a_conflict() {
    let store = MemoryStore::from_events(vec![event(1, iv(9, 0, 10, 0), &[7])]);
    let candidate =
        TimeInterval::new(at(10, 0) - Duration::seconds(1), at(11, 0)).unwrap();

    let conflict = has_conflict(&people(&[7]), &candidate, &store, None).unwrap();

    assert!(conflict);
}

#[test]
fn partial_overlap_is_a_conflict() {
    let store = MemoryStore::from_events(vec![event(1, iv(9, 0, 10, 0), &[7])]);

    assert!(has_conflict(&people(&[7]), &iv(9, 30, 10, 30), &store, None).unwrap());
}

#[test]
fn containing_candidate_is_a_conflict() {
    let store = MemoryStore::from_events(vec![event(1, iv(9, 30, 9, 45), &[7])]);

    assert!(has_conflict(&people(&[7]), &iv(9, 0, 10, 0), &store, None).unwrap());
}

#[test]
fn other_participants_commitments_are_ignored() {
    let store = MemoryStore::from_events(vec![event(1, iv(9, 0, 10, 0), &[8])]);

    assert!(!has_conflict(&people(&[7]), &iv(9, 0, 10, 0), &store, None).unwrap());
}

#[test]
fn any_participant_in_the_set_can_cause_a_conflict() {
    let store = MemoryStore::from_events(vec![event(1, iv(9, 0, 10, 0), &[8])]);

    assert!(has_conflict(&people(&[7, 8]), &iv(9, 0, 10, 0), &store, None).unwrap());
}

#[test]
fn excluded_event_does_not_conflict_with_itself() {
    let store = MemoryStore::from_events(vec![event(1, iv(9, 0, 10, 0), &[7])]);

    let conflict =
        has_conflict(&people(&[7]), &iv(9, 30, 10, 30), &store, Some(EventId(1))).unwrap();

    assert!(!conflict);
}

#[test]
fn exclusion_only_skips_the_named_event() {
    let store = MemoryStore::from_events(vec![
        event(1, iv(9, 0, 10, 0), &[7]),
        event(2, iv(10, 0, 11, 0), &[7]),
    ]);

    let conflict =
        has_conflict(&people(&[7]), &iv(9, 30, 10, 30), &store, Some(EventId(1))).unwrap();

    assert!(conflict, "event 2 still overlaps 10:00-10:30");
}

#[test]
fn exclusion_and_overlap_are_reapplied_to_store_results() {
    let store = OverFetchingStore(vec![
        event(1, iv(9, 0, 10, 0), &[7]).commitment(),
        event(2, iv(12, 0, 13, 0), &[7]).commitment(),
    ]);

    let conflict =
        has_conflict(&people(&[7]), &iv(9, 0, 10, 0), &store, Some(EventId(1))).unwrap();

    assert!(!conflict);
}

#[test]
fn empty_participant_set_never_conflicts_or_fetches() {
    let store = FailingStore { calls: Cell::new(0) };

    let conflict = has_conflict(&ParticipantSet::new(), &iv(9, 0, 10, 0), &store, None).unwrap();

    assert!(!conflict);
    assert_eq!(store.calls.get(), 0, "the store must not be consulted");
}

#[test]
fn store_failure_is_propagated() {
    let store = FailingStore { calls: Cell::new(0) };

    let err = has_conflict(&people(&[7]), &iv(9, 0, 10, 0), &store, None).unwrap_err();

    match err {
        EngineError::Store(inner) => assert_eq!(inner.message(), "database unavailable"),
        other => panic!("expected a store failure, got {other:?}"),
    }
}

#[test]
fn inverted_candidate_is_rejected_at_construction() {
    let err = TimeInterval::new(at(11, 0), at(10, 0)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange { .. }));

    let err = TimeInterval::new(at(10, 0), at(10, 0)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange { .. }));
}

// ── find_conflicts ──────────────────────────────────────────────────────────

#[test]
fn find_conflicts_reports_every_overlap_in_start_order() {
    let store = MemoryStore::from_events(vec![
        event(3, iv(14, 30, 15, 30), &[8]),
        event(1, iv(9, 30, 10, 30), &[7]),
        event(2, iv(11, 0, 12, 0), &[7]),
    ]);

    let conflicts = find_conflicts(&people(&[7, 8]), &iv(10, 0, 15, 0), &store, None).unwrap();

    let ids: Vec<_> = conflicts.iter().map(|c| c.commitment.event_id).collect();
    assert_eq!(ids, vec![EventId(1), EventId(2), EventId(3)]);
    assert_eq!(conflicts[0].overlap, Duration::minutes(30));
    assert_eq!(conflicts[1].overlap, Duration::hours(1));
    assert_eq!(conflicts[2].overlap, Duration::minutes(30));
}

#[test]
fn find_conflicts_skips_touching_and_excluded() {
    let store = MemoryStore::from_events(vec![
        event(1, iv(9, 0, 10, 0), &[7]),
        event(2, iv(10, 0, 11, 0), &[7]),
        event(3, iv(11, 0, 12, 0), &[7]),
    ]);

    let conflicts =
        find_conflicts(&people(&[7]), &iv(10, 0, 11, 0), &store, Some(EventId(2))).unwrap();

    assert!(conflicts.is_empty());
}

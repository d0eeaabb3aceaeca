//! # huddle-engine
//!
//! Availability and conflict engine for shared group calendars.
//!
//! Given the existing commitments of a group of participants, the engine answers
//! two questions: does a candidate event time collide with anything they already
//! hold, and which fixed-length slots are free for all of them over a range.
//! All time ranges are half-open `[start, end)` in UTC, so back-to-back events
//! never collide.
//!
//! ## Modules
//!
//! - [`interval`] — `TimeInterval`, participants, commitments
//! - [`merge`] — Normalize busy time into a sorted, non-overlapping timeline
//! - [`slots`] — Cut fixed-length free slots out of the gaps
//! - [`conflict`] — Strict overlap checks against existing commitments
//! - [`availability`] — Group free-slot search over a store
//! - [`store`] — The `CommitmentStore` trait the engine reads through
//! - [`memory`] — In-memory store with serialized check-and-write booking
//! - [`error`] — Error types

pub mod availability;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod memory;
pub mod merge;
pub mod slots;
pub mod store;

pub use availability::{
    find_first_free_slot, find_free_slots, group_availability, GroupAvailability,
};
pub use conflict::{find_conflicts, has_conflict, Conflict};
pub use error::{EngineError, StoreError};
pub use interval::{Commitment, EventId, ParticipantId, ParticipantSet, TimeInterval};
pub use memory::{Event, EventUpdate, MemoryStore, NewEvent};
pub use merge::{merge_intervals, MergedInterval};
pub use slots::{generate_slots, FreeSlot};
pub use store::CommitmentStore;

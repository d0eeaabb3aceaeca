//! Error types for huddle-engine operations.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::interval::{EventId, ParticipantId};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid slot duration: {0} (must be positive)")]
    InvalidDuration(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("One or more participants already have an event at this time")]
    Conflict,

    #[error("Event {0} not found")]
    EventNotFound(EventId),

    #[error("Participant {participant} is not part of event {event}")]
    ParticipantNotFound {
        event: EventId,
        participant: ParticipantId,
    },

    #[error("The creator ({participant}) cannot be removed from event {event}")]
    CreatorRemoval {
        event: EventId,
        participant: ParticipantId,
    },
}

/// Failure reported by a [`CommitmentStore`](crate::store::CommitmentStore).
///
/// The engine never retries and never inspects the cause; it hands the error
/// back to its caller untouched.
#[derive(Error, Debug)]
#[error("Store failure: {message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Date-time arguments and the JSON calendar file.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use huddle_engine::{Event, EventId, MemoryStore, ParticipantId, ParticipantSet, TimeInterval};
use serde::Deserialize;

/// Parse a date-time argument into a UTC instant.
///
/// Accepts RFC 3339 with an offset (e.g. "2026-03-16T09:00:00Z") or a naive
/// local time ("2026-03-16T09:00" or "2026-03-16T09:00:00") read in `tz`.
/// Local times skipped or repeated by a DST transition are rejected.
pub fn parse_instant(s: &str, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .with_context(|| {
            format!("Invalid datetime '{}': expected RFC 3339 or YYYY-MM-DDTHH:MM[:SS]", s)
        })?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, later) => bail!(
            "Ambiguous local time '{}' in {}: could be {} or {}",
            s,
            tz,
            earlier.to_rfc3339(),
            later.to_rfc3339()
        ),
        LocalResult::None => bail!("Local time '{}' does not exist in {} (DST gap)", s, tz),
    }
}

/// One entry of the calendar file.
#[derive(Debug, Deserialize)]
struct CalendarEntry {
    id: u64,
    #[serde(default)]
    title: String,
    description: Option<String>,
    start: String,
    end: String,
    created_by: u64,
    #[serde(default)]
    participants: Vec<u64>,
}

impl CalendarEntry {
    fn into_event(self, tz: Tz) -> Result<Event> {
        let start = parse_instant(&self.start, tz)?;
        let end = parse_instant(&self.end, tz)?;
        let interval = TimeInterval::new(start, end)
            .with_context(|| format!("Event {} has an invalid time range", self.id))?;

        let mut participants: ParticipantSet =
            self.participants.into_iter().map(ParticipantId).collect();
        participants.insert(ParticipantId(self.created_by));

        Ok(Event {
            id: EventId(self.id),
            title: self.title,
            description: self.description,
            interval,
            created_by: ParticipantId(self.created_by),
            participants,
        })
    }
}

/// Load a JSON array of events into a [`MemoryStore`].
pub fn load_calendar(path: &str, tz: Tz) -> Result<MemoryStore> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar file: {}", path))?;
    parse_calendar(&content, tz).with_context(|| format!("Invalid calendar file: {}", path))
}

pub fn parse_calendar(json: &str, tz: Tz) -> Result<MemoryStore> {
    let entries: Vec<CalendarEntry> = serde_json::from_str(json)?;
    let events = entries
        .into_iter()
        .map(|entry| entry.into_event(tz))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(events = events.len(), "calendar loaded");
    Ok(MemoryStore::from_events(events))
}

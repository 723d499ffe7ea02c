//! Fixed personal commitments.
//!
//! An event blocks time the same way a class does; every generated
//! schedule must avoid it.

use serde::{Deserialize, Serialize};

use super::TimeBlock;
use crate::error::Result;

/// A user-defined event, keyed by its meeting string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Meeting string, e.g. `"MoFr 10:00AM - 11:30AM"`. Doubles as the key.
    pub days: String,
    /// Whether the event is shown on the grid.
    pub display: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

impl Event {
    /// Creates an event.
    pub fn new(days: impl Into<String>, display: bool) -> Self {
        Self {
            days: days.into(),
            display,
            title: None,
            description: None,
            room: None,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// The event key (its meeting string).
    pub fn key(&self) -> &str {
        &self.days
    }

    /// Converts to a time block. `None` if the time is TBA.
    pub fn to_time_block(&self) -> Result<Option<TimeBlock>> {
        let block = TimeBlock::parse_meeting(&self.days)?;
        Ok(block.map(|b| match &self.room {
            Some(room) => b.with_room(room.clone()),
            None => b,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_to_block() {
        let e = Event::new("MoFr 10:00AM - 11:30AM", true)
            .with_title("title asd")
            .with_room("Gym");
        let b = e.to_time_block().unwrap().unwrap();
        assert_eq!((b.start, b.end), (600, 690));
        assert_eq!(b.room.as_deref(), Some("Gym"));
        assert_eq!(e.key(), "MoFr 10:00AM - 11:30AM");
    }

    #[test]
    fn test_event_malformed() {
        assert!(Event::new("whenever", false).to_time_block().is_err());
        assert!(Event::new("TBA", false).to_time_block().unwrap().is_none());
    }
}

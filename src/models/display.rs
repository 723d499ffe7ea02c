//! Display projection of ranked schedules.
//!
//! The planner does not render anything; it hands the UI layer a plain,
//! serializable list of `(course, sections)` pairs.

use serde::{Deserialize, Serialize};

/// One course of a displayed schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Course key.
    pub key: String,
    /// Chosen section ids.
    pub section_ids: Vec<u32>,
}

/// Raw display form: one entry per course.
pub type RawSchedule = Vec<ScheduleEntry>;

/// A ranked schedule ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleView {
    /// Display title.
    pub title: String,
    /// 1-based rank.
    pub id: usize,
    /// Courses and their sections.
    pub entries: RawSchedule,
}

impl ScheduleView {
    /// Creates a view.
    pub fn new(title: impl Into<String>, id: usize, entries: RawSchedule) -> Self {
        Self {
            title: title.into(),
            id,
            entries,
        }
    }

    /// Sections chosen for a course, if the course is in this schedule.
    pub fn sections_for(&self, key: &str) -> Option<&[u32]> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.section_ids.as_slice())
    }
}

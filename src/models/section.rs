//! Section and course models.
//!
//! A [`Course`] owns its [`Section`]s. A section belongs to one course
//! component (`"Lecture"`, `"Laboratory"`, ...). A student takes exactly
//! one section of every component of every chosen course.

use serde::{Deserialize, Serialize};

use super::TimeBlock;
use crate::error::Result;

/// One concrete, selectable section of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier (catalog-wide).
    pub id: u32,
    /// Key of the owning course.
    pub course_key: String,
    /// Component this section fulfils. Empty = the course has one component.
    #[serde(default)]
    pub component: String,
    /// Instructor names.
    #[serde(default)]
    pub instructors: Vec<String>,
    /// Weekly meetings. Empty = time to be announced.
    #[serde(default)]
    pub meetings: Vec<TimeBlock>,
}

impl Section {
    /// Creates a section with no meetings.
    pub fn new(id: u32, course_key: impl Into<String>) -> Self {
        Self {
            id,
            course_key: course_key.into(),
            component: String::new(),
            instructors: Vec::new(),
            meetings: Vec::new(),
        }
    }

    /// Sets the component.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Adds an instructor.
    pub fn with_instructor(mut self, name: impl Into<String>) -> Self {
        self.instructors.push(name.into());
        self
    }

    /// Adds a meeting.
    pub fn with_meeting(mut self, block: TimeBlock) -> Self {
        self.meetings.push(block);
        self
    }

    /// Adds a meeting from a catalog string such as `"MoWe 10:00AM - 11:15AM"`.
    ///
    /// `"TBA"` adds nothing.
    pub fn with_meeting_str(mut self, meeting: &str) -> Result<Self> {
        if let Some(block) = TimeBlock::parse_meeting(meeting)? {
            self.meetings.push(block);
        }
        Ok(self)
    }

    /// Whether two sections meet at exactly the same slots, in the same order.
    pub fn same_time(&self, other: &Self) -> bool {
        self.meetings.len() == other.meetings.len()
            && self
                .meetings
                .iter()
                .zip(&other.meetings)
                .all(|(a, b)| a.same_slot(b))
    }
}

/// A course and all of its sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course key (e.g. `"cs11105"`).
    pub key: String,
    /// Human-readable title.
    #[serde(default)]
    pub title: String,
    /// All sections, in catalog order.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Course {
    /// Creates a course with no sections.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: String::new(),
            sections: Vec::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Finds a section by id.
    pub fn section(&self, id: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Whether the course has a section with this id.
    pub fn has_section(&self, id: u32) -> bool {
        self.section(id).is_some()
    }

    /// Component labels in first-appearance order.
    pub fn components(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for s in &self.sections {
            if !seen.contains(&s.component.as_str()) {
                seen.push(&s.component);
            }
        }
        seen
    }

    /// Sections of one component, in catalog order.
    pub fn sections_of<'a>(
        &'a self,
        component: &'a str,
    ) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |s| s.component == component)
    }
}

//! Course catalog and per-course selections.
//!
//! The catalog is owned by the data layer; the planner only reads it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Course;
use crate::error::{PlannerError, Result};

/// All courses of a term, keyed by course key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    courses: BTreeMap<String, Course>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course (builder form).
    pub fn with_course(mut self, course: Course) -> Self {
        self.insert(course);
        self
    }

    /// Adds or replaces a course.
    pub fn insert(&mut self, course: Course) {
        self.courses.insert(course.key.clone(), course);
    }

    /// Looks up a course.
    pub fn get(&self, key: &str) -> Option<&Course> {
        self.courses.get(key)
    }

    /// Looks up a course, failing with [`PlannerError::UnknownCourse`].
    pub fn course(&self, key: &str) -> Result<&Course> {
        self.get(key)
            .ok_or_else(|| PlannerError::UnknownCourse(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }
}

/// A course the student wants, with optional manual section filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSelection {
    /// Course key.
    pub key: String,
    /// Only these sections are eligible. `None` = every section.
    #[serde(default)]
    pub included: Option<BTreeSet<u32>>,
    /// Sections removed from consideration (applied after `included`).
    #[serde(default)]
    pub excluded: BTreeSet<u32>,
}

impl CourseSelection {
    /// Selects every section of a course.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            included: None,
            excluded: BTreeSet::new(),
        }
    }

    /// Restricts the selection to the given sections.
    pub fn with_sections(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.included = Some(ids.into_iter().collect());
        self
    }

    /// Excludes one section.
    pub fn excluding(mut self, id: u32) -> Self {
        self.excluded.insert(id);
        self
    }

    /// Whether a section passes the include/exclude filters.
    pub fn allows(&self, id: u32) -> bool {
        !self.excluded.contains(&id)
            && self.included.as_ref().map_or(true, |ids| ids.contains(&id))
    }
}

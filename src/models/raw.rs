//! Raw algorithm-level schedule representation.
//!
//! These are the structures the generator assembles and the evaluator
//! scores. Courses are shared through `Arc` so that the tens of thousands
//! of schedules produced for a modest course load reuse one allocation
//! per course option.

use std::sync::Arc;

use super::TimeBlock;

/// One course's contribution to a candidate schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAlgoCourse {
    /// Course key.
    pub key: String,
    /// Chosen section ids. More than one when same-time sections were
    /// combined or when the course has several components.
    pub section_ids: Vec<u32>,
    /// Merged meetings of every chosen section.
    pub blocks: Vec<TimeBlock>,
}

impl RawAlgoCourse {
    /// Creates a raw course.
    pub fn new(key: impl Into<String>, section_ids: Vec<u32>, blocks: Vec<TimeBlock>) -> Self {
        Self {
            key: key.into(),
            section_ids,
            blocks,
        }
    }

    /// Whether any of this course's blocks conflicts with `block`.
    pub fn conflicts_with(&self, block: &TimeBlock) -> bool {
        self.blocks.iter().any(|b| b.conflicts(block))
    }
}

/// A fully resolved candidate: one [`RawAlgoCourse`] per requested course,
/// in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAlgoSchedule {
    courses: Vec<Arc<RawAlgoCourse>>,
}

impl RawAlgoSchedule {
    /// Creates the empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a course.
    pub fn push(&mut self, course: Arc<RawAlgoCourse>) {
        self.courses.push(course);
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses in request order.
    pub fn courses(&self) -> impl Iterator<Item = &RawAlgoCourse> {
        self.courses.iter().map(|c| c.as_ref())
    }

    /// Every time block of every course.
    pub fn blocks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.courses.iter().flat_map(|c| c.blocks.iter())
    }

    /// Whether no two blocks overlap, including against `fixed` blocks.
    pub fn is_conflict_free(&self, fixed: &[TimeBlock]) -> bool {
        let blocks: Vec<&TimeBlock> = self.blocks().collect();
        for (i, a) in blocks.iter().enumerate() {
            if blocks[i + 1..].iter().any(|b| a.conflicts(b)) {
                return false;
            }
            if fixed.iter().any(|f| a.conflicts(f)) {
                return false;
            }
        }
        true
    }
}

impl FromIterator<Arc<RawAlgoCourse>> for RawAlgoSchedule {
    fn from_iter<I: IntoIterator<Item = Arc<RawAlgoCourse>>>(iter: I) -> Self {
        Self {
            courses: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<RawAlgoCourse> for RawAlgoSchedule {
    fn from_iter<I: IntoIterator<Item = RawAlgoCourse>>(iter: I) -> Self {
        iter.into_iter().map(Arc::new).collect()
    }
}

//! Input validation for planning requests.
//!
//! Checks structural integrity of the catalog slice and the request
//! before generation. Detects:
//! - Unknown course keys
//! - The same course requested twice
//! - Duplicate section IDs within a course
//! - Sections filed under the wrong course
//! - Included or locked section IDs the course does not have
//! - Locked section IDs the selection itself filters out
//! - Time blocks violating `start < end <= 1440` (possible through
//!   deserialization, which bypasses [`TimeBlock::new`])
//!
//! A course with no sections is *not* an error: it simply produces no
//! schedules.

use crate::models::{Catalog, Course, CourseSelection, TimeBlock, MINUTES_PER_DAY};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A selection names a course missing from the catalog.
    UnknownCourse,
    /// The same course is requested more than once.
    DuplicateSelection,
    /// Two sections of a course share an ID.
    DuplicateId,
    /// A section's `course_key` does not match its owning course.
    MismatchedCourse,
    /// An included or locked section ID does not exist in the course.
    InvalidSectionReference,
    /// A time block is empty, reversed, or spills past midnight.
    InvalidTimeBlock,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a planning request against the catalog.
///
/// Checks:
/// 1. Every selected course exists and is selected once
/// 2. Selected courses have unique section IDs filed under the right key
/// 3. Included and locked section IDs exist in their course, and locked
///    IDs pass the selection's include/exclude filters
/// 4. Every section meeting and fixed block satisfies the time invariant
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    catalog: &Catalog,
    selections: &[CourseSelection],
    locked: &HashMap<String, BTreeSet<u32>>,
    fixed: &[TimeBlock],
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut selected = HashSet::new();

    for selection in selections {
        if !selected.insert(selection.key.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSelection,
                format!("Course '{}' is selected more than once", selection.key),
            ));
            continue;
        }

        let Some(course) = catalog.get(&selection.key) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCourse,
                format!("Unknown course '{}'", selection.key),
            ));
            continue;
        };

        check_course(course, &mut errors);

        for id in selection.included.iter().flatten() {
            if !course.has_section(*id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSectionReference,
                    format!("Course '{}' has no section {id} to include", course.key),
                ));
            }
        }

        if let Some(ids) = locked.get(&course.key) {
            for id in ids {
                if !course.has_section(*id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidSectionReference,
                        format!("Course '{}' has no section {id} to lock", course.key),
                    ));
                } else if !selection.allows(*id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidSectionReference,
                        format!(
                            "Course '{}' locks section {id}, which the selection excludes",
                            course.key
                        ),
                    ));
                }
            }
        }
    }

    for key in locked.keys() {
        if !selected.contains(key.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownCourse,
                format!("Locked course '{key}' is not selected"),
            ));
        }
    }

    for block in fixed {
        if let Some(err) = check_block(block, "fixed event") {
            errors.push(err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_course(course: &Course, errors: &mut Vec<ValidationError>) {
    let mut ids = HashSet::new();
    for section in &course.sections {
        if !ids.insert(section.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate section ID {} in '{}'", section.id, course.key),
            ));
        }
        if section.course_key != course.key {
            errors.push(ValidationError::new(
                ValidationErrorKind::MismatchedCourse,
                format!(
                    "Section {} belongs to '{}' but is filed under '{}'",
                    section.id, section.course_key, course.key
                ),
            ));
        }
        for block in &section.meetings {
            let owner = format!("section {}", section.id);
            if let Some(err) = check_block(block, &owner) {
                errors.push(err);
            }
        }
    }
}

fn check_block(block: &TimeBlock, owner: &str) -> Option<ValidationError> {
    if block.days.is_empty() || block.start >= block.end || block.end > MINUTES_PER_DAY {
        Some(ValidationError::new(
            ValidationErrorKind::InvalidTimeBlock,
            format!(
                "Invalid time block for {owner}: days '{}', [{}, {})",
                block.days, block.start, block.end
            ),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DaySet, Section};

    fn sample_catalog() -> Catalog {
        Catalog::new()
            .with_course(
                Course::new("cs1110")
                    .with_section(
                        Section::new(1, "cs1110")
                            .with_meeting_str("MoWe 9:00AM - 9:50AM")
                            .unwrap(),
                    )
                    .with_section(
                        Section::new(2, "cs1110")
                            .with_meeting_str("TuTh 9:00AM - 9:50AM")
                            .unwrap(),
                    ),
            )
            .with_course(Course::new("empty"))
    }

    fn no_locks() -> HashMap<String, BTreeSet<u32>> {
        HashMap::new()
    }

    #[test]
    fn test_valid_input() {
        let catalog = sample_catalog();
        let selections = vec![CourseSelection::new("cs1110"), CourseSelection::new("empty")];
        assert!(validate_input(&catalog, &selections, &no_locks(), &[]).is_ok());
    }

    #[test]
    fn test_unknown_course() {
        let catalog = sample_catalog();
        let errors = validate_input(&catalog, &[CourseSelection::new("nope")], &no_locks(), &[])
            .unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownCourse));
    }

    #[test]
    fn test_duplicate_selection() {
        let catalog = sample_catalog();
        let selections = vec![CourseSelection::new("cs1110"), CourseSelection::new("cs1110")];
        let errors = validate_input(&catalog, &selections, &no_locks(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateSelection));
    }

    #[test]
    fn test_duplicate_section_id() {
        let catalog = Catalog::new().with_course(
            Course::new("a")
                .with_section(Section::new(1, "a"))
                .with_section(Section::new(1, "a")),
        );
        let errors =
            validate_input(&catalog, &[CourseSelection::new("a")], &no_locks(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_mismatched_course_key() {
        let catalog =
            Catalog::new().with_course(Course::new("a").with_section(Section::new(1, "b")));
        let errors =
            validate_input(&catalog, &[CourseSelection::new("a")], &no_locks(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MismatchedCourse));
    }

    #[test]
    fn test_invalid_included_and_locked_ids() {
        let catalog = sample_catalog();
        let selections = vec![CourseSelection::new("cs1110").with_sections([1, 99])];
        let locks = HashMap::from([("cs1110".to_string(), BTreeSet::from([42]))]);
        let errors = validate_input(&catalog, &selections, &locks, &[]).unwrap_err();
        let refs = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidSectionReference)
            .count();
        assert_eq!(refs, 2);
    }

    #[test]
    fn test_lock_on_filtered_out_section() {
        let catalog = sample_catalog();
        let locks = HashMap::from([("cs1110".to_string(), BTreeSet::from([1]))]);

        let excluded = vec![CourseSelection::new("cs1110").excluding(1)];
        let errors = validate_input(&catalog, &excluded, &locks, &[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidSectionReference);

        let not_included = vec![CourseSelection::new("cs1110").with_sections([2])];
        assert!(validate_input(&catalog, &not_included, &locks, &[]).is_err());

        let allowed = vec![CourseSelection::new("cs1110").excluding(2)];
        assert!(validate_input(&catalog, &allowed, &locks, &[]).is_ok());
    }

    #[test]
    fn test_lock_on_unselected_course() {
        let catalog = sample_catalog();
        let locks = HashMap::from([("cs1110".to_string(), BTreeSet::from([1]))]);
        let errors = validate_input(&catalog, &[], &locks, &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::UnknownCourse));
    }

    #[test]
    fn test_invalid_time_block_from_deserialization() {
        let bad = TimeBlock {
            days: "Mo".parse::<DaySet>().unwrap(),
            start: 700,
            end: 600,
            room: None,
        };
        let catalog = Catalog::new().with_course(
            Course::new("a").with_section(Section::new(1, "a").with_meeting(bad.clone())),
        );
        let selections = [CourseSelection::new("a")];
        let errors = validate_input(&catalog, &selections, &no_locks(), &[bad]).unwrap_err();
        let count = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidTimeBlock)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_multiple_errors() {
        let catalog = sample_catalog();
        let selections = vec![
            CourseSelection::new("nope"),
            CourseSelection::new("cs1110").with_sections([7]),
        ];
        let errors = validate_input(&catalog, &selections, &no_locks(), &[]).unwrap_err();
        assert!(errors.len() >= 2);
    }
}

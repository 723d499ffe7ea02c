//! Section/course aggregation.
//!
//! Resolves each requested course into the list of options the generator
//! branches on. An option picks one section group per course component
//! (e.g. one lecture group and one lab group).
//!
//! # Algorithm
//!
//! 1. Keep the sections allowed by the selection's include/exclude filters.
//! 2. Split them by component, in catalog order.
//! 3. Within a component, merge sections that meet at identical times into
//!    one [`SectionGroup`] (when combining is enabled). Such sections are
//!    interchangeable for conflicts and for every ranking metric.
//! 4. Take the Cartesian product of the per-component groups, dropping any
//!    combination that conflicts with itself.
//!
//! A course left with no eligible section yields zero options, which in
//! turn makes the overall result empty.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Catalog, Course, CourseSelection, RawAlgoCourse, Section, TimeBlock};

/// Sections of one component that share identical meeting times.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup {
    /// Component label.
    pub component: String,
    /// Interchangeable section ids, in catalog order.
    pub section_ids: Vec<u32>,
    /// Shared meetings.
    pub blocks: Vec<TimeBlock>,
}

impl SectionGroup {
    fn from_section(section: &Section) -> Self {
        Self {
            component: section.component.clone(),
            section_ids: vec![section.id],
            blocks: section.meetings.clone(),
        }
    }
}

/// One legal way to take a course: a group for each of its components.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOption {
    /// One group per component.
    pub groups: Vec<SectionGroup>,
}

impl CourseOption {
    /// All section ids of this option.
    pub fn section_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.iter().flat_map(|g| g.section_ids.iter().copied())
    }

    /// All meetings of this option.
    pub fn blocks(&self) -> impl Iterator<Item = &TimeBlock> {
        self.groups.iter().flat_map(|g| g.blocks.iter())
    }

    /// Whether any meeting of this option conflicts with `block`.
    pub fn conflicts_with(&self, block: &TimeBlock) -> bool {
        self.blocks().any(|b| b.conflicts(block))
    }

    /// Flattens into the generator's per-course unit.
    pub fn to_raw(&self, key: &str) -> Arc<RawAlgoCourse> {
        Arc::new(RawAlgoCourse::new(
            key,
            self.section_ids().collect(),
            self.blocks().cloned().collect(),
        ))
    }
}

/// Every option of one requested course.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseCandidates {
    /// Course key.
    pub key: String,
    /// Options, in catalog order.
    pub options: Vec<CourseOption>,
}

impl CourseCandidates {
    /// Creates candidates directly from options.
    pub fn new(key: impl Into<String>, options: Vec<CourseOption>) -> Self {
        Self {
            key: key.into(),
            options,
        }
    }

    /// Number of options.
    pub fn option_count(&self) -> usize {
        self.options.len()
    }
}

/// Resolves selections against a catalog.
///
/// # Example
/// ```
/// use u_course::aggregate::Aggregator;
/// use u_course::models::{Catalog, Course, CourseSelection, Section};
///
/// let catalog = Catalog::new().with_course(
///     Course::new("cs1110")
///         .with_section(Section::new(1, "cs1110").with_meeting_str("MoWe 9:00AM - 9:50AM")?)
///         .with_section(Section::new(2, "cs1110").with_meeting_str("MoWe 9:00AM - 9:50AM")?),
/// );
/// let resolved = Aggregator::new(&catalog)
///     .resolve(&[CourseSelection::new("cs1110")])?;
/// // Two same-time sections collapse into one option.
/// assert_eq!(resolved[0].option_count(), 1);
/// # Ok::<(), u_course::PlannerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Aggregator<'a> {
    catalog: &'a Catalog,
    combine_sections: bool,
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator that combines same-time sections.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            combine_sections: true,
        }
    }

    /// Enables or disables same-time section combining.
    pub fn with_combine_sections(mut self, combine: bool) -> Self {
        self.combine_sections = combine;
        self
    }

    /// Resolves every selection, in order.
    pub fn resolve(&self, selections: &[CourseSelection]) -> Result<Vec<CourseCandidates>> {
        selections.iter().map(|s| self.resolve_one(s)).collect()
    }

    /// Resolves one selection.
    pub fn resolve_one(&self, selection: &CourseSelection) -> Result<CourseCandidates> {
        let course = self.catalog.course(&selection.key)?;
        Ok(CourseCandidates::new(
            &course.key,
            self.course_options(course, selection),
        ))
    }

    fn course_options(&self, course: &Course, selection: &CourseSelection) -> Vec<CourseOption> {
        let per_component: Vec<Vec<SectionGroup>> = course
            .components()
            .into_iter()
            .map(|component| {
                let eligible = course
                    .sections_of(component)
                    .filter(|s| selection.allows(s.id));
                self.group_sections(eligible)
            })
            .filter(|groups| !groups.is_empty())
            .collect();

        // Every section filtered out: nothing to take, not one empty option.
        if per_component.is_empty() {
            return Vec::new();
        }
        // A component lost all of its sections: the course cannot be completed.
        if per_component.len() < course.components().len() {
            return Vec::new();
        }

        cartesian_product(per_component)
    }

    fn group_sections<'s>(&self, sections: impl Iterator<Item = &'s Section>) -> Vec<SectionGroup> {
        let mut groups: Vec<(&'s Section, SectionGroup)> = Vec::new();
        for section in sections {
            if self.combine_sections {
                let same_time = groups.iter_mut().find(|(rep, _)| rep.same_time(section));
                if let Some((_, group)) = same_time {
                    group.section_ids.push(section.id);
                    continue;
                }
            }
            groups.push((section, SectionGroup::from_section(section)));
        }
        groups.into_iter().map(|(_, g)| g).collect()
    }
}

/// Product over components, skipping internally conflicting partials.
fn cartesian_product(per_component: Vec<Vec<SectionGroup>>) -> Vec<CourseOption> {
    let mut partials: Vec<Vec<SectionGroup>> = vec![Vec::new()];
    for groups in per_component {
        let mut next = Vec::with_capacity(partials.len() * groups.len());
        for partial in &partials {
            for group in &groups {
                let clashes = partial
                    .iter()
                    .flat_map(|g| g.blocks.iter())
                    .any(|b| group.blocks.iter().any(|c| c.conflicts(b)));
                if clashes {
                    continue;
                }
                let mut extended = partial.clone();
                extended.push(group.clone());
                next.push(extended);
            }
        }
        partials = next;
    }
    partials
        .into_iter()
        .map(|groups| CourseOption { groups })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;

    fn section(id: u32, key: &str, component: &str, meeting: &str) -> Section {
        Section::new(id, key)
            .with_component(component)
            .with_meeting_str(meeting)
            .unwrap()
    }

    fn sample_catalog() -> Catalog {
        Catalog::new()
            .with_course(
                Course::new("cs2150")
                    .with_section(section(1, "cs2150", "Lecture", "MoWe 2:00PM - 3:15PM"))
                    .with_section(section(2, "cs2150", "Lecture", "MoWe 2:00PM - 3:15PM"))
                    .with_section(section(3, "cs2150", "Lecture", "TuTh 9:30AM - 10:45AM"))
                    .with_section(section(4, "cs2150", "Laboratory", "Tu 10:00AM - 11:00AM"))
                    .with_section(section(5, "cs2150", "Laboratory", "We 5:00PM - 6:00PM")),
            )
            .with_course(
                Course::new("math3100")
                    .with_section(section(10, "math3100", "", "MoWeFr 11:00AM - 11:50AM"))
                    .with_section(section(11, "math3100", "", "TuTh 12:30PM - 1:45PM")),
            )
            .with_course(Course::new("empty"))
    }

    #[test]
    fn test_single_component() {
        let catalog = sample_catalog();
        let agg = Aggregator::new(&catalog);
        let c = agg.resolve_one(&CourseSelection::new("math3100")).unwrap();
        assert_eq!(c.key, "math3100");
        assert_eq!(c.option_count(), 2);
        assert_eq!(c.options[0].section_ids().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_components_product_with_internal_conflict() {
        let catalog = sample_catalog();
        let c = Aggregator::new(&catalog)
            .resolve_one(&CourseSelection::new("cs2150"))
            .unwrap();
        // Lecture groups: {1,2} MoWe, {3} TuTh. Labs: {4} Tu 10-11, {5} We 17-18.
        // {3} + {4} clash on Tuesday, leaving 2 * 2 - 1 = 3 options.
        assert_eq!(c.option_count(), 3);
        let ids: Vec<Vec<u32>> = c
            .options
            .iter()
            .map(|o| o.section_ids().collect())
            .collect();
        assert_eq!(ids, vec![vec![1, 2, 4], vec![1, 2, 5], vec![3, 5]]);
    }

    #[test]
    fn test_without_combining() {
        let catalog = sample_catalog();
        let c = Aggregator::new(&catalog)
            .with_combine_sections(false)
            .resolve_one(&CourseSelection::new("cs2150"))
            .unwrap();
        assert_eq!(c.option_count(), 5);
    }

    #[test]
    fn test_selection_filters_applied() {
        let catalog = sample_catalog();
        let c = Aggregator::new(&catalog)
            .resolve_one(&CourseSelection::new("cs2150").excluding(2).excluding(5))
            .unwrap();
        let ids: Vec<Vec<u32>> = c
            .options
            .iter()
            .map(|o| o.section_ids().collect())
            .collect();
        assert_eq!(ids, vec![vec![1, 4]]);
    }

    #[test]
    fn test_component_emptied_yields_no_options() {
        let catalog = sample_catalog();
        let c = Aggregator::new(&catalog)
            .resolve_one(&CourseSelection::new("cs2150").with_sections([1, 2, 3]))
            .unwrap();
        assert_eq!(c.option_count(), 0);
    }

    #[test]
    fn test_course_without_sections() {
        let catalog = sample_catalog();
        let c = Aggregator::new(&catalog)
            .resolve_one(&CourseSelection::new("empty"))
            .unwrap();
        assert_eq!(c.option_count(), 0);
    }

    #[test]
    fn test_unknown_course() {
        let catalog = sample_catalog();
        let err = Aggregator::new(&catalog)
            .resolve(&[CourseSelection::new("nope")])
            .unwrap_err();
        assert!(matches!(err, PlannerError::UnknownCourse(_)));
    }

    #[test]
    fn test_to_raw_merges_groups() {
        let catalog = sample_catalog();
        let c = Aggregator::new(&catalog)
            .resolve_one(&CourseSelection::new("cs2150"))
            .unwrap();
        let raw = c.options[0].to_raw(&c.key);
        assert_eq!(raw.key, "cs2150");
        assert_eq!(raw.section_ids, vec![1, 2, 4]);
        assert_eq!(raw.blocks.len(), 2);
    }
}

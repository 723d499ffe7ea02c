//! Conflict-free schedule enumeration.
//!
//! # Algorithm
//!
//! Depth-first backtracking over courses. Each depth picks one option of
//! one course; an option is rejected the moment one of its blocks
//! conflicts with a block committed at a shallower depth, so a doomed
//! branch is never completed. Reaching the last course emits a schedule.
//!
//! The search runs on an explicit stack instead of the call stack:
//! `cursor[d]` is the option index tried at depth `d`, and `frames[d]`
//! marks where depth `d`'s blocks start in the committed-block stack.
//! Backtracking truncates that stack back to the frame start. The
//! cancellation flag is polled once per step.
//!
//! Options that conflict with a fixed event are dropped before the
//! search starts, which is equivalent to checking them at every depth.
//!
//! # Complexity
//! Worst case O(Π options_i). Visiting courses with fewer options first
//! usually prunes earlier; see [`CourseOrder`].

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{CourseCandidates, CourseOption, SectionGroup};
use crate::error::{PlannerError, Result};
use crate::models::{RawAlgoCourse, RawAlgoSchedule, TimeBlock};

/// Order in which courses are branched on.
///
/// Output schedules always list courses in request order regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseOrder {
    /// Request order.
    Input,
    /// Ascending option count (stable among ties).
    #[default]
    FewestOptionsFirst,
}

/// Shared flag for cooperative cancellation of a generation pass.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Input to one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Resolved courses, in request order.
    pub courses: Vec<CourseCandidates>,
    /// Locked section ids per course key.
    pub locked: HashMap<String, BTreeSet<u32>>,
    /// Fixed blocks every schedule must avoid.
    pub events: Vec<TimeBlock>,
}

impl GenerateRequest {
    /// Creates a request with no locks or events.
    pub fn new(courses: Vec<CourseCandidates>) -> Self {
        Self {
            courses,
            ..Default::default()
        }
    }

    /// Locks a course to the given sections.
    pub fn with_lock(mut self, key: impl Into<String>, ids: impl IntoIterator<Item = u32>) -> Self {
        self.locked.entry(key.into()).or_default().extend(ids);
        self
    }

    /// Adds a fixed block.
    pub fn with_event(mut self, block: TimeBlock) -> Self {
        self.events.push(block);
        self
    }

    /// Adds several fixed blocks.
    pub fn with_events(mut self, blocks: impl IntoIterator<Item = TimeBlock>) -> Self {
        self.events.extend(blocks);
        self
    }
}

/// Counters from one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Options tried during the search.
    pub nodes: u64,
    /// Options rejected for conflicts (during the search or against events).
    pub pruned: u64,
    /// Schedules emitted.
    pub schedules: usize,
    /// Whether the schedule cap stopped the search early.
    pub truncated: bool,
}

/// Exhaustive conflict-free schedule generator.
///
/// # Example
///
/// ```
/// use u_course::aggregate::{CourseCandidates, CourseOption, SectionGroup};
/// use u_course::generator::{GenerateRequest, ScheduleGenerator};
///
/// let option = |id: u32, meeting: &str| CourseOption {
///     groups: vec![SectionGroup {
///         component: String::new(),
///         section_ids: vec![id],
///         blocks: vec![meeting.parse().unwrap()],
///     }],
/// };
/// let a = CourseCandidates::new("A", vec![
///     option(1, "Mo 9:00AM - 10:00AM"),
///     option(2, "Mo 10:00AM - 11:00AM"),
/// ]);
/// let b = CourseCandidates::new("B", vec![option(3, "Mo 9:30AM - 10:00AM")]);
///
/// let schedules = ScheduleGenerator::new()
///     .generate(&GenerateRequest::new(vec![a, b]))
///     .unwrap();
/// assert_eq!(schedules.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator {
    order: CourseOrder,
    max_schedules: Option<usize>,
    cancel: Option<CancelToken>,
}

impl ScheduleGenerator {
    /// Creates an uncapped generator branching on fewest options first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the branching order.
    pub fn with_order(mut self, order: CourseOrder) -> Self {
        self.order = order;
        self
    }

    /// Caps the number of emitted schedules.
    pub fn with_max_schedules(mut self, max: Option<usize>) -> Self {
        self.max_schedules = max;
        self
    }

    /// Attaches a cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Enumerates every conflict-free schedule.
    pub fn generate(&self, request: &GenerateRequest) -> Result<Vec<RawAlgoSchedule>> {
        self.generate_with_stats(request).map(|(schedules, _)| schedules)
    }

    /// Enumerates every conflict-free schedule and reports search counters.
    pub fn generate_with_stats(
        &self,
        request: &GenerateRequest,
    ) -> Result<(Vec<RawAlgoSchedule>, GenerationStats)> {
        let started = Instant::now();
        let mut stats = GenerationStats::default();

        info!(
            event = "generate_start",
            course_count = request.courses.len(),
            event_count = request.events.len(),
        );

        // Per course: options surviving locks and events, as shared raw courses.
        let mut levels: Vec<Vec<Arc<RawAlgoCourse>>> = Vec::with_capacity(request.courses.len());
        for course in &request.courses {
            let options = match request.locked.get(&course.key) {
                Some(ids) => apply_locks(&course.options, ids),
                None => course.options.clone(),
            };
            let before = options.len();
            let survivors: Vec<Arc<RawAlgoCourse>> = options
                .iter()
                .filter(|o| !request.events.iter().any(|e| o.conflicts_with(e)))
                .map(|o| o.to_raw(&course.key))
                .collect();
            stats.pruned += (before - survivors.len()) as u64;
            debug!(
                course = %course.key,
                options = course.options.len(),
                eligible = survivors.len(),
            );
            levels.push(survivors);
        }

        let schedules = if levels.iter().any(Vec::is_empty) {
            Vec::new()
        } else {
            self.search(&levels, &mut stats)?
        };
        stats.schedules = schedules.len();

        if stats.truncated {
            warn!(
                max_schedules = ?self.max_schedules,
                "schedule cap reached, search stopped early"
            );
        }
        info!(
            event = "generate_end",
            schedules = stats.schedules,
            nodes = stats.nodes,
            pruned = stats.pruned,
            elapsed_ms = started.elapsed().as_millis() as u64,
        );
        Ok((schedules, stats))
    }

    fn search(
        &self,
        levels: &[Vec<Arc<RawAlgoCourse>>],
        stats: &mut GenerationStats,
    ) -> Result<Vec<RawAlgoSchedule>> {
        let n = levels.len();
        let mut schedules: Vec<RawAlgoSchedule> = Vec::new();

        if n == 0 {
            if self.max_schedules == Some(0) {
                stats.truncated = true;
            } else {
                schedules.push(RawAlgoSchedule::new());
            }
            return Ok(schedules);
        }

        // order[depth] = course index; position[course index] = depth
        let mut order: Vec<usize> = (0..n).collect();
        if self.order == CourseOrder::FewestOptionsFirst {
            order.sort_by_key(|&i| levels[i].len());
        }
        let mut position = vec![0usize; n];
        for (depth, &course) in order.iter().enumerate() {
            position[course] = depth;
        }
        let ordered: Vec<&[Arc<RawAlgoCourse>]> =
            order.iter().map(|&i| levels[i].as_slice()).collect();

        let mut cursor = vec![0usize; n];
        let mut frames: Vec<usize> = Vec::with_capacity(n);
        let mut committed: Vec<&TimeBlock> = Vec::new();
        let mut depth = 0;

        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(PlannerError::Cancelled);
            }

            let options = ordered[depth];
            if cursor[depth] >= options.len() {
                if depth == 0 {
                    break;
                }
                cursor[depth] = 0;
                depth -= 1;
                if let Some(start) = frames.pop() {
                    committed.truncate(start);
                }
                cursor[depth] += 1;
                continue;
            }

            stats.nodes += 1;
            let candidate = &options[cursor[depth]];
            let clashes = candidate
                .blocks
                .iter()
                .any(|b| committed.iter().any(|c| c.conflicts(b)));
            if clashes {
                stats.pruned += 1;
                cursor[depth] += 1;
                continue;
            }

            if depth + 1 == n {
                if self.max_schedules.is_some_and(|max| schedules.len() >= max) {
                    stats.truncated = true;
                    break;
                }
                schedules.push(
                    position
                        .iter()
                        .map(|&d| Arc::clone(&ordered[d][cursor[d]]))
                        .collect(),
                );
                cursor[depth] += 1;
                continue;
            }

            frames.push(committed.len());
            committed.extend(candidate.blocks.iter());
            depth += 1;
        }

        Ok(schedules)
    }
}

/// Restricts options to locked sections.
///
/// A component is locked when any of its sections is locked; its groups
/// then keep only locked ids, and options whose group empties are dropped.
/// A locked id that no option offers cannot be honored, so the course is
/// left with no options.
fn apply_locks(options: &[CourseOption], locked: &BTreeSet<u32>) -> Vec<CourseOption> {
    let offered: BTreeSet<u32> = options.iter().flat_map(CourseOption::section_ids).collect();
    if !locked.is_subset(&offered) {
        return Vec::new();
    }

    let locked_components: BTreeSet<&str> = options
        .iter()
        .flat_map(|o| o.groups.iter())
        .filter(|g| g.section_ids.iter().any(|id| locked.contains(id)))
        .map(|g| g.component.as_str())
        .collect();

    options
        .iter()
        .filter_map(|option| {
            let groups: Option<Vec<SectionGroup>> = option
                .groups
                .iter()
                .map(|g| {
                    if !locked_components.contains(g.component.as_str()) {
                        return Some(g.clone());
                    }
                    let ids: Vec<u32> = g
                        .section_ids
                        .iter()
                        .copied()
                        .filter(|id| locked.contains(id))
                        .collect();
                    (!ids.is_empty()).then(|| SectionGroup {
                        section_ids: ids,
                        ..g.clone()
                    })
                })
                .collect();
            groups.map(|groups| CourseOption { groups })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(component: &str, ids: &[u32], meetings: &[&str]) -> SectionGroup {
        SectionGroup {
            component: component.to_string(),
            section_ids: ids.to_vec(),
            blocks: meetings.iter().map(|m| m.parse().unwrap()).collect(),
        }
    }

    fn single(id: u32, meeting: &str) -> CourseOption {
        CourseOption {
            groups: vec![group("", &[id], &[meeting])],
        }
    }

    fn three_sections(key: &str, base: u32, day: &str) -> CourseCandidates {
        CourseCandidates::new(
            key,
            vec![
                single(base, &format!("{day} 8:00AM - 9:00AM")),
                single(base + 1, &format!("{day} 10:00AM - 11:00AM")),
                single(base + 2, &format!("{day} 1:00PM - 2:00PM")),
            ],
        )
    }

    fn ids(schedule: &RawAlgoSchedule) -> Vec<Vec<u32>> {
        schedule.courses().map(|c| c.section_ids.clone()).collect()
    }

    #[test]
    fn test_completeness_with_one_conflicting_pair() {
        // A on Monday, B on Tuesday except one section that clashes with A's first.
        let a = three_sections("A", 1, "Mo");
        let b = CourseCandidates::new(
            "B",
            vec![
                single(11, "Mo 8:30AM - 9:30AM"),
                single(12, "Tu 10:00AM - 11:00AM"),
                single(13, "Tu 1:00PM - 2:00PM"),
            ],
        );
        let schedules = ScheduleGenerator::new()
            .generate(&GenerateRequest::new(vec![a, b]))
            .unwrap();
        assert_eq!(schedules.len(), 3 * 3 - 1);
        assert!(schedules.iter().all(|s| s.is_conflict_free(&[])));
    }

    #[test]
    fn test_no_conflicts_full_product() {
        let courses = vec![
            three_sections("A", 1, "Mo"),
            three_sections("B", 10, "Tu"),
            three_sections("C", 20, "We"),
        ];
        let schedules = ScheduleGenerator::new()
            .generate(&GenerateRequest::new(courses))
            .unwrap();
        assert_eq!(schedules.len(), 27);
    }

    #[test]
    fn test_empty_course_set_yields_one_empty_schedule() {
        let schedules = ScheduleGenerator::new()
            .generate(&GenerateRequest::new(vec![]))
            .unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].is_empty());
    }

    #[test]
    fn test_course_without_options_yields_nothing() {
        let courses = vec![three_sections("A", 1, "Mo"), CourseCandidates::new("B", vec![])];
        let schedules = ScheduleGenerator::new()
            .generate(&GenerateRequest::new(courses))
            .unwrap();
        assert!(schedules.is_empty());
    }

    #[test]
    fn test_events_are_avoided() {
        let request = GenerateRequest::new(vec![three_sections("A", 1, "Mo")])
            .with_event("Mo 10:30AM - 12:00PM".parse().unwrap());
        let (schedules, stats) = ScheduleGenerator::new()
            .generate_with_stats(&request)
            .unwrap();
        assert_eq!(schedules.len(), 2);
        assert_eq!(stats.pruned, 1);
        assert!(schedules.iter().all(|s| s.is_conflict_free(&request.events)));
    }

    #[test]
    fn test_output_keeps_request_order() {
        // B has fewer options, so it is branched on first.
        let a = three_sections("A", 1, "Mo");
        let b = CourseCandidates::new("B", vec![single(50, "Fr 9:00AM - 10:00AM")]);
        for order in [CourseOrder::Input, CourseOrder::FewestOptionsFirst] {
            let schedules = ScheduleGenerator::new()
                .with_order(order)
                .generate(&GenerateRequest::new(vec![a.clone(), b.clone()]))
                .unwrap();
            assert_eq!(schedules.len(), 3);
            for s in &schedules {
                let keys: Vec<&str> = s.courses().map(|c| c.key.as_str()).collect();
                assert_eq!(keys, vec!["A", "B"]);
            }
        }
    }

    #[test]
    fn test_order_does_not_change_result_set() {
        let courses = vec![
            three_sections("A", 1, "Mo"),
            CourseCandidates::new(
                "B",
                vec![single(11, "Mo 8:30AM - 9:30AM"), single(12, "Mo 1:30PM - 2:30PM")],
            ),
        ];
        let mut by_input: Vec<_> = ScheduleGenerator::new()
            .with_order(CourseOrder::Input)
            .generate(&GenerateRequest::new(courses.clone()))
            .unwrap()
            .iter()
            .map(ids)
            .collect();
        let mut by_size: Vec<_> = ScheduleGenerator::new()
            .generate(&GenerateRequest::new(courses))
            .unwrap()
            .iter()
            .map(ids)
            .collect();
        by_input.sort();
        by_size.sort();
        assert_eq!(by_input, by_size);
        assert_eq!(by_input.len(), 4);
    }

    #[test]
    fn test_locks_restrict_choices() {
        let request = GenerateRequest::new(vec![
            three_sections("A", 1, "Mo"),
            three_sections("B", 10, "Tu"),
        ])
        .with_lock("A", [2]);
        let schedules = ScheduleGenerator::new().generate(&request).unwrap();
        assert_eq!(schedules.len(), 3);
        assert!(schedules.iter().all(|s| ids(s)[0] == vec![2]));
    }

    #[test]
    fn test_lock_narrows_combined_group() {
        let option = CourseOption {
            groups: vec![
                group("Lecture", &[1, 2], &["MoWe 9:00AM - 9:50AM"]),
                group("Laboratory", &[5], &["Fr 2:00PM - 4:00PM"]),
            ],
        };
        let other = CourseOption {
            groups: vec![
                group("Lecture", &[3], &["TuTh 9:00AM - 9:50AM"]),
                group("Laboratory", &[5], &["Fr 2:00PM - 4:00PM"]),
            ],
        };
        let locked = apply_locks(&[option, other], &BTreeSet::from([2]));
        assert_eq!(locked.len(), 1);
        assert_eq!(locked[0].section_ids().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn test_lock_on_missing_section_yields_nothing() {
        let options = vec![
            CourseOption {
                groups: vec![group("", &[2], &["Tu 9:00AM - 10:00AM"])],
            },
            CourseOption {
                groups: vec![group("", &[3], &["We 9:00AM - 10:00AM"])],
            },
        ];
        assert!(apply_locks(&options, &BTreeSet::from([1])).is_empty());
        assert!(apply_locks(&options, &BTreeSet::from([1, 3])).is_empty());
        assert_eq!(apply_locks(&options, &BTreeSet::from([3])).len(), 1);

        let request = GenerateRequest::new(vec![CourseCandidates::new("A", options)])
            .with_lock("A", [1]);
        let schedules = ScheduleGenerator::new().generate(&request).unwrap();
        assert!(schedules.is_empty());
    }

    #[test]
    fn test_max_schedules_cap() {
        let courses = vec![three_sections("A", 1, "Mo"), three_sections("B", 10, "Tu")];
        let (schedules, stats) = ScheduleGenerator::new()
            .with_max_schedules(Some(4))
            .generate_with_stats(&GenerateRequest::new(courses.clone()))
            .unwrap();
        assert_eq!(schedules.len(), 4);
        assert!(stats.truncated);

        let (all, stats) = ScheduleGenerator::new()
            .with_max_schedules(Some(9))
            .generate_with_stats(&GenerateRequest::new(courses))
            .unwrap();
        assert_eq!(all.len(), 9);
        assert!(!stats.truncated);
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancelToken::new();
        token.cancel();
        let result = ScheduleGenerator::new()
            .with_cancel_token(token.clone())
            .generate(&GenerateRequest::new(vec![three_sections("A", 1, "Mo")]));
        assert!(matches!(result, Err(PlannerError::Cancelled)));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_multi_block_options_prune() {
        // Option spanning two days conflicts with B on Wednesday only.
        let a = CourseCandidates::new(
            "A",
            vec![CourseOption {
                groups: vec![group("", &[1], &["Mo 9:00AM - 10:00AM", "We 9:00AM - 10:00AM"])],
            }],
        );
        let b = CourseCandidates::new(
            "B",
            vec![single(2, "We 9:30AM - 10:30AM"), single(3, "Th 9:30AM - 10:30AM")],
        );
        let schedules = ScheduleGenerator::new()
            .generate(&GenerateRequest::new(vec![a, b]))
            .unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(ids(&schedules[0]), vec![vec![1], vec![3]]);
    }
}

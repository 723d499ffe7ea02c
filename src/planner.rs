//! End-to-end planning: aggregate → generate → evaluate.
//!
//! [`Planner::plan`] runs the pipeline on the calling thread.
//! [`Planner::spawn`] runs it on a dedicated worker thread so that a long
//! pass does not block the caller; the returned [`PlanHandle`] can cancel
//! it cooperatively.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::thread;

use tracing::info;

use crate::aggregate::Aggregator;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::evaluator::ScheduleEvaluator;
use crate::generator::{CancelToken, GenerateRequest, GenerationStats, ScheduleGenerator};
use crate::models::{Catalog, CourseSelection, Event, TimeBlock};
use crate::validation::validate_input;

/// What the student asked for.
#[derive(Debug, Clone, Default)]
pub struct PlanRequest {
    /// Requested courses, in order.
    pub selections: Vec<CourseSelection>,
    /// Locked section ids per course key.
    pub locked: HashMap<String, BTreeSet<u32>>,
    /// Fixed commitments.
    pub events: Vec<Event>,
}

impl PlanRequest {
    /// Creates a request for the given courses.
    pub fn new(selections: Vec<CourseSelection>) -> Self {
        Self {
            selections,
            ..Default::default()
        }
    }

    /// Adds a course.
    pub fn with_selection(mut self, selection: CourseSelection) -> Self {
        self.selections.push(selection);
        self
    }

    /// Locks a course to the given sections.
    pub fn with_lock(mut self, key: impl Into<String>, ids: impl IntoIterator<Item = u32>) -> Self {
        self.locked.entry(key.into()).or_default().extend(ids);
        self
    }

    /// Adds an event.
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }
}

/// A scored, ranked result set plus search counters.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Ranked candidates, ready for re-sorting.
    pub evaluator: ScheduleEvaluator,
    /// Generation counters.
    pub stats: GenerationStats,
}

/// Runs the planning pipeline over a shared catalog.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use u_course::models::{Catalog, Course, CourseSelection, Section};
/// use u_course::planner::{PlanRequest, Planner};
///
/// let catalog = Catalog::new().with_course(
///     Course::new("cs1110")
///         .with_section(Section::new(1, "cs1110").with_meeting_str("MoWe 9:00AM - 9:50AM")?)
///         .with_section(Section::new(2, "cs1110").with_meeting_str("TuTh 9:00AM - 9:50AM")?),
/// );
/// let planner = Planner::new(Arc::new(catalog));
/// let outcome = planner.plan(&PlanRequest::new(vec![CourseSelection::new("cs1110")]))?;
/// assert_eq!(outcome.evaluator.size(), 2);
/// # Ok::<(), u_course::PlannerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Planner {
    catalog: Arc<Catalog>,
    config: PlannerConfig,
}

impl Planner {
    /// Creates a planner with the default configuration.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            config: PlannerConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Runs the pipeline on the calling thread.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanOutcome> {
        self.run(request, None)
    }

    /// Runs the pipeline, polling `cancel` at every search step.
    pub fn plan_with_cancel(
        &self,
        request: &PlanRequest,
        cancel: CancelToken,
    ) -> Result<PlanOutcome> {
        self.run(request, Some(cancel))
    }

    /// Runs the pipeline on a dedicated worker thread.
    pub fn spawn(&self, request: PlanRequest) -> Result<PlanHandle> {
        let planner = self.clone();
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let handle = thread::Builder::new()
            .name("u-course-planner".into())
            .spawn(move || planner.run(&request, Some(token)))
            .map_err(|e| PlannerError::Worker(e.to_string()))?;
        Ok(PlanHandle { cancel, handle })
    }

    fn run(&self, request: &PlanRequest, cancel: Option<CancelToken>) -> Result<PlanOutcome> {
        let mut fixed: Vec<TimeBlock> = Vec::with_capacity(request.events.len());
        for event in &request.events {
            if let Some(block) = event.to_time_block()? {
                fixed.push(block);
            }
        }

        validate_input(&self.catalog, &request.selections, &request.locked, &fixed)
            .map_err(PlannerError::Validation)?;

        let courses = Aggregator::new(&self.catalog)
            .with_combine_sections(self.config.combine_sections)
            .resolve(&request.selections)?;

        let generate = GenerateRequest {
            courses,
            locked: request.locked.clone(),
            events: fixed,
        };
        let mut generator = ScheduleGenerator::new()
            .with_order(self.config.course_order)
            .with_max_schedules(self.config.max_schedules);
        if let Some(token) = cancel {
            generator = generator.with_cancel_token(token);
        }
        let (schedules, stats) = generator.generate_with_stats(&generate)?;

        let mut evaluator = ScheduleEvaluator::new(Some(self.config.sort.clone()))?;
        if let Some(seed) = self.config.random_seed {
            evaluator = evaluator.with_seed(seed);
        }
        evaluator.extend(schedules);
        evaluator.change_sort(Some(self.config.sort.clone()), true)?;

        info!(
            event = "plan_end",
            schedules = evaluator.size(),
            truncated = stats.truncated,
        );
        Ok(PlanOutcome { evaluator, stats })
    }
}

/// Handle to a planning pass running on a worker thread.
#[derive(Debug)]
pub struct PlanHandle {
    cancel: CancelToken,
    handle: thread::JoinHandle<Result<PlanOutcome>>,
}

impl PlanHandle {
    /// Requests cancellation; [`join`](Self::join) then yields
    /// [`PlannerError::Cancelled`] unless the pass already finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the worker has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker's result.
    pub fn join(self) -> Result<PlanOutcome> {
        self.handle
            .join()
            .map_err(|_| PlannerError::Worker("planner thread panicked".into()))?
    }
}

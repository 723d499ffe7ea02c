//! Schedule evaluation and ranking.
//!
//! Holds the generator's candidates, scores them under the active
//! [`SortOptions`], and keeps them in rank order. Re-scoring with new
//! options is cheap compared to regeneration, so the evaluator is built to
//! be re-ranked in place with [`ScheduleEvaluator::change_sort`].
//!
//! # Coefficients
//!
//! - `IamFeelingLucky` enabled: every candidate gets an independent random
//!   value; nothing else is evaluated.
//! - One metric enabled: the metric's raw value.
//! - Several metrics enabled: each metric is scaled so its maximum over all
//!   candidates maps to 64, squared, and summed across metrics. A metric
//!   whose maximum is 0 contributes 0.
//! - No metric enabled: every coefficient is 0.
//!
//! Sorting is stable, ascending unless `reverseSort` is set.
//!
//! # Usage
//!
//! The evaluator is single-writer: finish populating it with
//! [`add`](ScheduleEvaluator::add) before scoring.

mod metric;
mod options;

pub use metric::{
    compactness, lunch_time, minutes_per_day, variance, Metric, LUNCH_END, LUNCH_START,
};
pub use options::SortOptions;

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::models::{RawAlgoSchedule, RawSchedule, ScheduleEntry, ScheduleView};

/// Scale each normalized metric onto `[0, NORMALIZED_MAX]` before squaring.
pub const NORMALIZED_MAX: f64 = 64.0;

/// A candidate paired with its quality coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableSchedule {
    pub schedule: RawAlgoSchedule,
    /// Lower is better unless the sort is reversed.
    pub coeff: f64,
}

/// Ranked collection of candidate schedules.
///
/// # Example
///
/// ```
/// use u_course::evaluator::{Metric, ScheduleEvaluator, SortOptions};
/// use u_course::models::{RawAlgoCourse, RawAlgoSchedule};
///
/// let course = |key: &str, meeting: &str| {
///     RawAlgoCourse::new(key, vec![1], vec![meeting.parse().unwrap()])
/// };
/// let spread: RawAlgoSchedule =
///     vec![course("a", "Mo 9:00AM - 10:00AM"), course("b", "Mo 3:00PM - 4:00PM")]
///         .into_iter()
///         .collect();
/// let tight: RawAlgoSchedule =
///     vec![course("a", "Mo 9:00AM - 10:00AM"), course("b", "Mo 10:00AM - 11:00AM")]
///         .into_iter()
///         .collect();
///
/// let mut evaluator = ScheduleEvaluator::new(None).unwrap();
/// evaluator.add(spread);
/// evaluator.add(tight);
/// evaluator
///     .change_sort(Some(SortOptions::by(Metric::Compactness)), true)
///     .unwrap();
/// assert_eq!(evaluator.get(0).unwrap().coeff, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleEvaluator {
    schedules: Vec<ComparableSchedule>,
    options: SortOptions,
    metrics: Vec<Metric>,
    rng: SmallRng,
}

impl ScheduleEvaluator {
    /// Creates an empty evaluator. `None` selects the default options.
    pub fn new(options: Option<SortOptions>) -> Result<Self> {
        let options = options.unwrap_or_default();
        let metrics = options.enabled_metrics()?;
        Ok(Self {
            schedules: Vec::new(),
            options,
            metrics,
            rng: SmallRng::from_os_rng(),
        })
    }

    /// Seeds the random metric for reproducible orders.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Active options.
    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Appends a candidate with coefficient 0. Neither scores nor sorts.
    pub fn add(&mut self, schedule: RawAlgoSchedule) {
        self.schedules.push(ComparableSchedule {
            schedule,
            coeff: 0.0,
        });
    }

    /// Recomputes every coefficient under the active options.
    pub fn compute_coeff(&mut self) {
        let started = Instant::now();

        if self.metrics.iter().any(|m| m.is_random()) {
            for cmp in &mut self.schedules {
                cmp.coeff = self.rng.random::<f64>();
            }
            return;
        }

        match self.metrics.as_slice() {
            [] => {
                for cmp in &mut self.schedules {
                    cmp.coeff = 0.0;
                }
            }
            [metric] => {
                let metric = *metric;
                for cmp in &mut self.schedules {
                    cmp.coeff = metric.evaluate(&cmp.schedule, &mut self.rng);
                }
            }
            metrics => {
                let mut coeffs = vec![0.0; self.schedules.len()];
                for &metric in metrics {
                    let values: Vec<f64> = self
                        .schedules
                        .iter()
                        .map(|cmp| metric.evaluate(&cmp.schedule, &mut self.rng))
                        .collect();
                    let max = values.iter().copied().fold(0.0, f64::max);
                    if max <= 0.0 {
                        warn!(metric = %metric, "metric is zero for every schedule, skipping");
                        continue;
                    }
                    let ratio = max / NORMALIZED_MAX;
                    for (coeff, value) in coeffs.iter_mut().zip(&values) {
                        *coeff += (value / ratio).powi(2);
                    }
                }
                for (cmp, coeff) in self.schedules.iter_mut().zip(coeffs) {
                    cmp.coeff = coeff;
                }
                debug!(
                    metrics = metrics.len(),
                    schedules = self.schedules.len(),
                    elapsed_us = started.elapsed().as_micros() as u64,
                    "normalized coefficients"
                );
            }
        }
    }

    /// Stable sort by coefficient in the active direction.
    pub fn sort(&mut self) {
        let started = Instant::now();
        if self.options.reverse_sort {
            self.schedules.sort_by(|a, b| b.coeff.total_cmp(&a.coeff));
        } else {
            self.schedules.sort_by(|a, b| a.coeff.total_cmp(&b.coeff));
        }
        debug!(
            schedules = self.schedules.len(),
            reverse = self.options.reverse_sort,
            elapsed_us = started.elapsed().as_micros() as u64,
            "sorted schedules"
        );
    }

    /// Replaces the options, rescores, and sorts unless `do_sort` is false.
    ///
    /// `None` resets to the default options. Invalid options leave the
    /// evaluator untouched.
    pub fn change_sort(&mut self, options: Option<SortOptions>, do_sort: bool) -> Result<()> {
        let options = options.unwrap_or_default();
        self.metrics = options.enabled_metrics()?;
        self.options = options;
        self.compute_coeff();
        if do_sort {
            self.sort();
        }
        Ok(())
    }

    /// Number of candidates.
    pub fn size(&self) -> usize {
        self.schedules.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Drops every candidate.
    pub fn clear(&mut self) {
        self.schedules.clear();
    }

    /// Candidate at a rank.
    pub fn get(&self, index: usize) -> Option<&ComparableSchedule> {
        self.schedules.get(index)
    }

    /// Candidates in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &ComparableSchedule> {
        self.schedules.iter()
    }

    /// Display entries of the candidate at `index`.
    pub fn get_raw(&self, index: i64) -> Result<RawSchedule> {
        let cmp = self.checked(index)?;
        Ok(cmp
            .schedule
            .courses()
            .map(|c| ScheduleEntry {
                key: c.key.clone(),
                section_ids: c.section_ids.clone(),
            })
            .collect())
    }

    /// Display view of the candidate at `index`, numbered from 1.
    pub fn get_schedule(&self, index: i64) -> Result<ScheduleView> {
        let raw = self.get_raw(index)?;
        Ok(ScheduleView::new("Schedule", index as usize + 1, raw))
    }

    fn checked(&self, index: i64) -> Result<&ComparableSchedule> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.schedules.get(i))
            .ok_or(PlannerError::IndexOutOfRange {
                index,
                len: self.schedules.len(),
            })
    }
}

impl Extend<RawAlgoSchedule> for ScheduleEvaluator {
    fn extend<I: IntoIterator<Item = RawAlgoSchedule>>(&mut self, iter: I) {
        for schedule in iter {
            self.add(schedule);
        }
    }
}

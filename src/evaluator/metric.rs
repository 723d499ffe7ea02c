//! Schedule quality metrics.
//!
//! Pure functions from a candidate schedule to a number. Lower is better
//! for every deterministic metric.
//!
//! | Metric | Option key | Definition |
//! |--------|-----------|-----------|
//! | Variance | `variance` | Summed absolute deviation of Mo–Fr class minutes per day |
//! | Compactness | `compactness` | Total idle minutes between consecutive classes, per day |
//! | Lunch time | `lunchTime` | Minutes of class overlapping 11:00–14:00, per block |
//! | Feeling lucky | `IamFeelingLucky` | Uniform random value in `[0, 1)` |
//!
//! `variance` is named after the quantity it historically stood for but
//! computes the summed absolute deviation from the mean. Callers compare
//! coefficients across versions, so the formula stays.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::PlannerError;
use crate::models::{overlap_minutes, RawAlgoSchedule, TimeBlock, Weekday};

/// Start of the lunch window (11:00).
pub const LUNCH_START: u32 = 11 * 60;
/// End of the lunch window (14:00, exclusive).
pub const LUNCH_END: u32 = 14 * 60;

/// The metric registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Variance,
    Compactness,
    LunchTime,
    FeelingLucky,
}

impl Metric {
    /// Every registered metric, in evaluation order.
    pub const ALL: [Metric; 4] = [
        Metric::Variance,
        Metric::Compactness,
        Metric::LunchTime,
        Metric::FeelingLucky,
    ];

    /// Option key used by callers.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Variance => "variance",
            Metric::Compactness => "compactness",
            Metric::LunchTime => "lunchTime",
            Metric::FeelingLucky => "IamFeelingLucky",
        }
    }

    /// Whether the metric produces a random order rather than a score.
    pub fn is_random(self) -> bool {
        matches!(self, Metric::FeelingLucky)
    }

    /// Evaluates the metric. `rng` is only drawn from by [`Metric::FeelingLucky`].
    pub fn evaluate<R: Rng>(self, schedule: &RawAlgoSchedule, rng: &mut R) -> f64 {
        match self {
            Metric::Variance => variance(schedule),
            Metric::Compactness => compactness(schedule),
            Metric::LunchTime => lunch_time(schedule),
            Metric::FeelingLucky => rng.random::<f64>(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| PlannerError::InvalidOption(s.to_string()))
    }
}

/// Class minutes per teaching day, Monday first.
pub fn minutes_per_day(schedule: &RawAlgoSchedule) -> [u32; 5] {
    let mut minutes = [0u32; 5];
    for block in schedule.blocks() {
        for (i, day) in Weekday::TEACHING.into_iter().enumerate() {
            if block.meets_on(day) {
                minutes[i] += block.duration();
            }
        }
    }
    minutes
}

/// Sum of the absolute deviations of the per-day class minutes from
/// their mean.
pub fn variance(schedule: &RawAlgoSchedule) -> f64 {
    absolute_deviation(&minutes_per_day(schedule).map(f64::from))
}

/// Sum of the gaps between consecutive classes on each teaching day.
pub fn compactness(schedule: &RawAlgoSchedule) -> f64 {
    let mut dist = 0.0;
    for day in Weekday::TEACHING {
        let mut blocks: Vec<&TimeBlock> = schedule.blocks().filter(|b| b.meets_on(day)).collect();
        blocks.sort_by_key(|b| b.start);
        for pair in blocks.windows(2) {
            dist += f64::from(pair[1].start) - f64::from(pair[0].end);
        }
    }
    dist
}

/// Total overlap of every block with the lunch window.
///
/// Each block counts once, however many days it meets on.
pub fn lunch_time(schedule: &RawAlgoSchedule) -> f64 {
    schedule
        .blocks()
        .map(|b| f64::from(overlap_minutes(LUNCH_START, LUNCH_END, b.start, b.end)))
        .sum()
}

fn absolute_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).abs()).sum()
}

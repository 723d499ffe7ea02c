//! Course schedule generation and ranking.
//!
//! Enumerates every conflict-free weekly timetable for a set of requested
//! courses and ranks the results by weighted quality metrics.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeBlock`, `Section`, `Course`, `Catalog`,
//!   `Event`, `RawAlgoCourse`, `RawAlgoSchedule`, `ScheduleView`
//! - **`aggregate`**: Resolves selections into per-course options, merging
//!   same-time sections and expanding multi-component courses
//! - **`validation`**: Input integrity checks (unknown courses, duplicate IDs,
//!   stale locks)
//! - **`generator`**: Exhaustive backtracking enumeration with fail-fast pruning
//! - **`evaluator`**: Metrics, multi-metric normalization, and ranking
//! - **`config`**: TOML-backed planner settings
//! - **`planner`**: The end-to-end pipeline, foreground or on a worker thread
//!
//! # Pipeline
//!
//! ```text
//! Catalog + selections ──▶ Aggregator ──▶ ScheduleGenerator ──▶ ScheduleEvaluator
//!                          (options)      (conflict-free)       (scored, sorted)
//! ```
//!
//! # References
//!
//! - Golomb & Baumert (1965), "Backtrack Programming"
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod aggregate;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod models;
pub mod planner;
pub mod validation;

pub use config::PlannerConfig;
pub use error::{ConfigError, PlannerError, Result};
pub use evaluator::{Metric, ScheduleEvaluator, SortOptions};
pub use generator::{CancelToken, ScheduleGenerator};
pub use planner::{PlanHandle, PlanOutcome, PlanRequest, Planner};

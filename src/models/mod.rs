//! Course planning domain models.
//!
//! Provides the data types the planner consumes (catalog, courses,
//! sections, events) and the ones it produces (raw candidate schedules
//! and their display projection).
//!
//! | Type | Role |
//! |------|------|
//! | `TimeBlock` | One weekly meeting slot; the unit of conflict detection |
//! | `Section` / `Course` | Catalog entries, read-only to the planner |
//! | `CourseSelection` | A requested course with manual include/exclude |
//! | `Event` | A fixed personal commitment |
//! | `RawAlgoSchedule` | A conflict-free candidate |
//! | `ScheduleView` | Display projection of a ranked candidate |

mod catalog;
mod display;
mod event;
mod raw;
mod section;
mod time_block;

pub use catalog::{Catalog, CourseSelection};
pub use display::{RawSchedule, ScheduleEntry, ScheduleView};
pub use event::Event;
pub use raw::{RawAlgoCourse, RawAlgoSchedule};
pub use section::{Course, Section};
pub use time_block::{overlap_minutes, DaySet, TimeBlock, Weekday, MINUTES_PER_DAY};

//! Time-block model and conflict detection.
//!
//! A [`TimeBlock`] is one recurring weekly meeting: a set of weekdays and a
//! half-open minute-of-day interval `[start, end)`.
//!
//! # Time Model
//! All times are whole minutes since midnight, `0..=1440`.
//!
//! # Conflicts
//! Two blocks conflict iff they share at least one weekday AND their
//! intervals overlap. Touching intervals (`a.end == b.start`) do not overlap.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Minutes in one day; the exclusive upper bound of any block.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Day of the week, using the two-letter catalog codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl Weekday {
    /// All seven days, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mo,
        Weekday::Tu,
        Weekday::We,
        Weekday::Th,
        Weekday::Fr,
        Weekday::Sa,
        Weekday::Su,
    ];

    /// The five teaching days that the ranking metrics look at.
    pub const TEACHING: [Weekday; 5] = [
        Weekday::Mo,
        Weekday::Tu,
        Weekday::We,
        Weekday::Th,
        Weekday::Fr,
    ];

    /// Two-letter code (`"Mo"`, `"Tu"`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Weekday::Mo => "Mo",
            Weekday::Tu => "Tu",
            Weekday::We => "We",
            Weekday::Th => "Th",
            Weekday::Fr => "Fr",
            Weekday::Sa => "Sa",
            Weekday::Su => "Su",
        }
    }

    /// Parses a two-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of weekdays, stored as a bitmask.
///
/// Serializes as the concatenated day codes, e.g. `"MoWeFr"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DaySet(u8);

impl DaySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Builds a set from a list of days.
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut set = Self::new();
        for day in days {
            set.insert(day);
        }
        set
    }

    /// Adds a day.
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= day.bit();
    }

    /// Adds a day (builder form).
    pub fn with(mut self, day: Weekday) -> Self {
        self.insert(day);
        self
    }

    /// Whether the set contains `day`.
    #[inline]
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    /// Whether the two sets share at least one day.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of days in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::ALL.into_iter().filter(|d| self.contains(*d))
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            f.write_str(day.code())?;
        }
        Ok(())
    }
}

impl FromStr for DaySet {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.len() % 2 != 0 || !s.is_ascii() {
            return Err(PlannerError::InvalidTimeBlock(format!(
                "malformed day list '{s}'"
            )));
        }
        let mut set = DaySet::new();
        for i in (0..s.len()).step_by(2) {
            let code = &s[i..i + 2];
            let day = Weekday::from_code(code).ok_or_else(|| {
                PlannerError::InvalidTimeBlock(format!("unknown day code '{code}'"))
            })?;
            set.insert(day);
        }
        Ok(set)
    }
}

impl TryFrom<String> for DaySet {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DaySet> for String {
    fn from(value: DaySet) -> Self {
        value.to_string()
    }
}

/// One recurring weekly meeting slot.
///
/// Invariant: `start < end <= 1440` and `days` is non-empty. Use
/// [`TimeBlock::new`] or parsing to uphold it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Days this block meets on.
    pub days: DaySet,
    /// Start, minutes since midnight (inclusive).
    pub start: u32,
    /// End, minutes since midnight (exclusive).
    pub end: u32,
    /// Meeting room, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl TimeBlock {
    /// Creates a time block, checking its invariant.
    pub fn new(days: DaySet, start: u32, end: u32) -> Result<Self> {
        if days.is_empty() {
            return Err(PlannerError::InvalidTimeBlock(
                "time block has no days".into(),
            ));
        }
        if start >= end || end > MINUTES_PER_DAY {
            return Err(PlannerError::InvalidTimeBlock(format!(
                "interval [{start}, {end}) is not within a single day"
            )));
        }
        Ok(Self {
            days,
            start,
            end,
            room: None,
        })
    }

    /// Sets the room.
    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Length of one meeting in minutes.
    #[inline]
    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    /// Whether this block meets on `day`.
    #[inline]
    pub fn meets_on(&self, day: Weekday) -> bool {
        self.days.contains(day)
    }

    /// Whether the minute intervals overlap, ignoring days.
    #[inline]
    pub fn overlaps_time(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether two blocks conflict: a shared weekday and overlapping intervals.
    #[inline]
    pub fn conflicts(&self, other: &Self) -> bool {
        self.days.intersects(&other.days) && self.overlaps_time(other)
    }

    /// Whether two blocks occupy exactly the same slot (room ignored).
    pub fn same_slot(&self, other: &Self) -> bool {
        self.days == other.days && self.start == other.start && self.end == other.end
    }

    /// Parses a catalog meeting string, mapping `"TBA"`/`"TBD"` to `None`.
    ///
    /// ```
    /// use u_course::models::TimeBlock;
    ///
    /// let block = TimeBlock::parse_meeting("MoWe 10:00AM - 11:15AM").unwrap().unwrap();
    /// assert_eq!((block.start, block.end), (600, 675));
    /// assert!(TimeBlock::parse_meeting("TBA").unwrap().is_none());
    /// ```
    pub fn parse_meeting(s: &str) -> Result<Option<Self>> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("TBA")
            || trimmed.eq_ignore_ascii_case("TBD")
        {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl FromStr for TimeBlock {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (days, times) = s.split_once(char::is_whitespace).ok_or_else(|| {
            PlannerError::InvalidTimeBlock(format!("expected '<days> <start> - <end>', got '{s}'"))
        })?;
        let (start, end) = times.split_once('-').ok_or_else(|| {
            PlannerError::InvalidTimeBlock(format!("missing '-' in time range '{times}'"))
        })?;
        TimeBlock::new(days.parse()?, parse_clock(start)?, parse_clock(end)?)
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {}",
            self.days,
            format_clock(self.start),
            format_clock(self.end)
        )
    }
}

/// Overlap in minutes between the window `[a, b)` and the block `[c, d)`.
///
/// Cases are tested in order: block inside window, block starting inside
/// the window, block ending inside the window, block covering the window.
pub fn overlap_minutes(a: u32, b: u32, c: u32, d: u32) -> u32 {
    if a <= c && d <= b {
        d - c
    } else if a <= c && c <= b {
        b - c
    } else if a <= d && d <= b {
        d - a
    } else if a >= c && b <= d {
        b - a
    } else {
        0
    }
}

/// Parses `"10:00AM"`, `"1:30 pm"` or 24-hour `"13:30"` into minutes since midnight.
fn parse_clock(s: &str) -> Result<u32> {
    let s = s.trim();
    let invalid = || PlannerError::InvalidTimeBlock(format!("malformed clock time '{s}'"));

    let upper = s.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let (h, m) = clock.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if minute >= 60 {
        return Err(invalid());
    }

    let hour = match meridiem {
        Some(pm) => {
            if hour == 0 || hour > 12 {
                return Err(invalid());
            }
            match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            }
        }
        None if hour <= 24 => hour,
        None => return Err(invalid()),
    };

    Ok(hour * 60 + minute)
}

fn format_clock(minutes: u32) -> String {
    let hour = (minutes / 60) % 24;
    let minute = minutes % 60;
    let (display, suffix) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{display}:{minute:02}{suffix}")
}

//! Planner configuration.
//!
//! Load from TOML to tune generation and ranking without code changes.
//!
//! ```
//! use u_course::config::PlannerConfig;
//! use u_course::generator::CourseOrder;
//!
//! let config = PlannerConfig::from_toml_str(r#"
//!     course_order = "input"
//!     max_schedules = 50000
//!     random_seed = 7
//!
//!     [sort]
//!     reverseSort = false
//!     [sort.sortBy]
//!     compactness = true
//!     lunchTime = true
//! "#).unwrap();
//!
//! assert_eq!(config.course_order, CourseOrder::Input);
//! assert_eq!(config.max_schedules, Some(50000));
//! assert_eq!(config.sort.enabled_metrics().unwrap().len(), 2);
//! ```
//!
//! Fall back to defaults when the file is missing:
//!
//! ```
//! use u_course::config::PlannerConfig;
//!
//! let config = PlannerConfig::load("planner.toml").unwrap_or_default();
//! assert!(config.combine_sections);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluator::SortOptions;
use crate::generator::CourseOrder;

/// Generation and ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Initial ranking options.
    pub sort: SortOptions,
    /// Branching order of the search.
    pub course_order: CourseOrder,
    /// Stop after this many schedules. `None` = enumerate all.
    pub max_schedules: Option<usize>,
    /// Merge same-time sections into one branching option.
    pub combine_sections: bool,
    /// Seed for the random metric. `None` = OS entropy.
    pub random_seed: Option<u64>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            sort: SortOptions::default(),
            course_order: CourseOrder::default(),
            max_schedules: None,
            combine_sections: true,
            random_seed: None,
        }
    }
}

impl PlannerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML, or
    /// names an unknown sort metric.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sort
            .enabled_metrics()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Sets the sort options.
    pub fn with_sort(mut self, sort: SortOptions) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the branching order.
    pub fn with_course_order(mut self, order: CourseOrder) -> Self {
        self.course_order = order;
        self
    }

    /// Caps the number of generated schedules.
    pub fn with_max_schedules(mut self, max: usize) -> Self {
        self.max_schedules = Some(max);
        self
    }

    /// Enables or disables same-time section combining.
    pub fn with_combine_sections(mut self, combine: bool) -> Self {
        self.combine_sections = combine;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
}

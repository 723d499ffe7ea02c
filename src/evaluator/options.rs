//! Sort options.
//!
//! The external surface is a map of named boolean flags, serialized with
//! the keys callers already send:
//!
//! ```json
//! { "sortBy": { "variance": true, "lunchTime": true }, "reverseSort": false }
//! ```
//!
//! Unknown keys survive deserialization so that validation can reject them
//! instead of dropping them silently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Metric;
use crate::error::{PlannerError, Result};

/// Which metrics rank schedules, and in which direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOptions {
    /// Metric key → enabled.
    #[serde(default)]
    pub sort_by: BTreeMap<String, bool>,
    /// Descending order when set (higher coefficient first).
    #[serde(default)]
    pub reverse_sort: bool,
}

impl Default for SortOptions {
    /// `variance` only, ascending.
    fn default() -> Self {
        let mut sort_by = BTreeMap::new();
        for metric in Metric::ALL {
            sort_by.insert(metric.name().to_string(), metric == Metric::Variance);
        }
        Self {
            sort_by,
            reverse_sort: false,
        }
    }
}

impl SortOptions {
    /// Options with nothing enabled.
    pub fn none() -> Self {
        Self {
            sort_by: BTreeMap::new(),
            reverse_sort: false,
        }
    }

    /// Options enabling exactly one metric.
    pub fn by(metric: Metric) -> Self {
        Self::none().with_metric(metric, true)
    }

    /// Sets a metric flag.
    pub fn with_metric(mut self, metric: Metric, enabled: bool) -> Self {
        self.sort_by.insert(metric.name().to_string(), enabled);
        self
    }

    /// Sets a flag by raw key, as received from a caller.
    pub fn with_flag(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.sort_by.insert(key.into(), enabled);
        self
    }

    /// Sets the direction.
    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse_sort = reverse;
        self
    }

    /// Resolves the enabled flags to metrics, in registry order.
    ///
    /// Fails with [`PlannerError::InvalidOption`] on an enabled key that is
    /// not a registered metric.
    pub fn enabled_metrics(&self) -> Result<Vec<Metric>> {
        let mut metrics = Vec::new();
        for (key, &enabled) in &self.sort_by {
            if !enabled {
                continue;
            }
            let metric: Metric = key
                .parse()
                .map_err(|_| PlannerError::InvalidOption(key.clone()))?;
            metrics.push(metric);
        }
        metrics.sort();
        Ok(metrics)
    }
}

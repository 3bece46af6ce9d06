//! Outcome-linked process analysis.
//!
//! Joins traces with one numeric outcome metric per case. When a case carries
//! several records for the same metric, the first record in input order is
//! used and the rest are dropped with a warning.

mod path;
mod segment;

use std::collections::{HashMap, hash_map::Entry};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ProcmineError, Result, common::stats, model::OutcomeRecord};

pub use path::{OutcomeEdge, OutcomeGraph, OutcomeSummary, TopPath, analyze_path_outcome, path_outcome_with};
pub use segment::{
    Segment, SegmentDifference, SegmentMode, SegmentReport, SegmentSummary, analyze_segment_comparison, segment_comparison_with,
};

/// Descriptive statistics of outcome values, zero-filled when there are none.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct OutcomeStats {
    pub avg: f64,
    pub median: f64,
    pub total: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl OutcomeStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            avg: stats::mean(values).unwrap_or_default(),
            median: stats::median(values).unwrap_or_default(),
            total: stats::sum(values),
            min: stats::min(values).unwrap_or_default(),
            max: stats::max(values).unwrap_or_default(),
            count: values.len(),
        }
    }
}

/// Outcome value per case for one metric.
#[derive(Debug, Default)]
pub(crate) struct OutcomeIndex<'a> {
    by_case: HashMap<&'a str, f64>,
    /// first-seen order of cases
    ordered: Vec<(&'a str, f64)>,
}

impl<'a> OutcomeIndex<'a> {
    pub(crate) fn build(
        records: &'a [OutcomeRecord],
        metric_name: &str,
    ) -> Result<Self> {
        if metric_name.is_empty() {
            return Err(ProcmineError::InvalidArgument("metric_name is required".to_string()));
        }

        let mut index = Self::default();
        for record in records.iter().filter(|r| r.metric_name == metric_name) {
            if !record.metric_value.is_finite() {
                return Err(ProcmineError::InconsistentData(format!(
                    "outcome '{}' of case '{}' is not a finite number",
                    metric_name, record.case_id
                )));
            }
            match index.by_case.entry(record.case_id.as_str()) {
                Entry::Occupied(_) => {
                    warn!("outcome: dropping duplicate '{}' record for case '{}'", metric_name, record.case_id);
                }
                Entry::Vacant(slot) => {
                    slot.insert(record.metric_value);
                    index.ordered.push((record.case_id.as_str(), record.metric_value));
                }
            }
        }
        Ok(index)
    }

    pub(crate) fn get(
        &self,
        case_id: &str,
    ) -> Option<f64> {
        self.by_case.get(case_id).copied()
    }

    pub(crate) fn values(&self) -> Vec<f64> {
        self.ordered.iter().map(|(_, v)| *v).collect()
    }

    pub(crate) fn cases(&self) -> &[(&'a str, f64)] {
        &self.ordered
    }

    pub(crate) fn len(&self) -> usize {
        self.ordered.len()
    }
}

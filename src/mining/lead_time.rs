//! Case lead times and the happy path.
//!
//! Only cases with at least two events have a measurable lead time; single
//! event cases are reported in `single_event_case_count` and left out of the
//! overall statistics. Every case competes for the happy path, a single event
//! case with a lead time of zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    common::{group_traces, stats},
    model::Event,
};

/// Minimum, maximum and median of a set of durations in hours.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DurationStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

impl DurationStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        Self {
            min: stats::min(samples),
            max: stats::max(samples),
            median: stats::median(samples),
        }
    }
}

/// The most frequent complete activity sequence.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HappyPath {
    pub case_count: usize,
    pub lead_time_hours: DurationStats,
    pub path: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LeadTimeReport {
    /// cases with a measurable lead time
    pub case_count: usize,
    #[serde(default)]
    pub single_event_case_count: usize,
    pub lead_time_hours: DurationStats,
    pub happy_path: HappyPath,
}

/// Computes lead-time statistics over all cases and over the happy path.
///
/// Ties between equally frequent sequences go to the lexicographically
/// smallest sequence.
pub fn compute_lead_time_stats(events: &[Event]) -> LeadTimeReport {
    trace!("lead_time::compute({} events)", events.len());
    let traces = group_traces(events);

    let mut lead_times = Vec::with_capacity(traces.len());
    let mut paths: HashMap<Vec<&str>, Vec<f64>> = HashMap::new();
    let mut single_event_case_count = 0;
    for t in traces.iter() {
        let hours = match t.lead_time_hours() {
            Some(hours) => {
                lead_times.push(hours);
                hours
            }
            None => {
                single_event_case_count += 1;
                0.0
            }
        };
        paths.entry(t.activities()).or_default().push(hours);
    }

    let happy_path = paths
        .iter()
        .max_by(|(a_path, a_times), (b_path, b_times)| a_times.len().cmp(&b_times.len()).then_with(|| b_path.cmp(a_path)))
        .map(|(path, times)| HappyPath {
            case_count: times.len(),
            lead_time_hours: DurationStats::from_samples(times),
            path: path.iter().map(|a| a.to_string()).collect(),
        })
        .unwrap_or_default();

    debug!(
        "lead_time: {} measured cases, {} single-event cases, {} distinct paths",
        lead_times.len(),
        single_event_case_count,
        paths.len()
    );

    LeadTimeReport {
        case_count: lead_times.len(),
        single_event_case_count,
        lead_time_hours: DurationStats::from_samples(&lead_times),
        happy_path,
    }
}

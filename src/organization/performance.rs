use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    common::{Trace, group_traces, stats},
    model::Event,
    organization::{AggregationLevel, ResourceLabels},
    utils::time::hours_between,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PerformanceItem {
    pub resource_id: String,
    pub resource_name: String,
    pub avg_duration_hours: f64,
    pub median_duration_hours: f64,
    pub total_duration_hours: f64,
    /// steps with a measured duration
    pub activity_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub performance: Vec<PerformanceItem>,
    pub aggregation_level: AggregationLevel,
}

pub(crate) fn performance_from_traces(
    traces: &[Trace<'_>],
    level: AggregationLevel,
    labels: &ResourceLabels<'_>,
) -> PerformanceReport {
    let mut durations: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in traces.iter() {
        for (current, next) in t.pairs() {
            // the step belongs to whoever performed the earlier event
            let Some(id) = level.resource_id(current) else {
                continue;
            };
            durations.entry(id).or_default().push(hours_between(&current.timestamp, &next.timestamp));
        }
    }

    let mut performance: Vec<PerformanceItem> = durations
        .into_iter()
        .map(|(id, samples)| PerformanceItem {
            resource_id: id.to_string(),
            resource_name: labels.label(id),
            avg_duration_hours: stats::mean(&samples).unwrap_or_default(),
            median_duration_hours: stats::median(&samples).unwrap_or_default(),
            total_duration_hours: stats::sum(&samples),
            activity_count: samples.len() as u64,
        })
        .collect();
    performance.sort_by(|a, b| b.avg_duration_hours.total_cmp(&a.avg_duration_hours));

    PerformanceReport {
        performance,
        aggregation_level: level,
    }
}

/// Duration of each step attributed to the resource that performed it, slowest first.
pub fn analyze_performance(
    events: &[Event],
    level: AggregationLevel,
) -> PerformanceReport {
    trace!("performance::analyze({} events, {})", events.len(), level);
    let traces = group_traces(events);
    let labels = ResourceLabels::collect(&traces, level);
    performance_from_traces(&traces, level, &labels)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    #[test]
    fn test_duration_attributed_to_earlier_event() {
        let events = vec![
            Event::new("C1", "A", at(0)).with_actor("E1", Some("Alice")),
            Event::new("C1", "B", at(2)).with_actor("E2", Some("Bob")),
            Event::new("C1", "C", at(3)).with_actor("E1", Some("Alice")),
            Event::new("C2", "A", at(0)).with_actor("E1", Some("Alice")),
            Event::new("C2", "B", at(6)).with_actor("E2", Some("Bob")),
        ];

        let report = analyze_performance(&events, AggregationLevel::Employee);
        assert_eq!(report.performance.len(), 2);

        let alice = &report.performance[0];
        assert_eq!(alice.resource_id, "E1");
        assert_eq!(alice.activity_count, 2);
        assert_eq!(alice.avg_duration_hours, 4.0);
        assert_eq!(alice.median_duration_hours, 4.0);
        assert_eq!(alice.total_duration_hours, 8.0);

        let bob = &report.performance[1];
        assert_eq!(bob.resource_name, "Bob");
        assert_eq!(bob.activity_count, 1);
        assert_eq!(bob.avg_duration_hours, 1.0);
    }

    #[test]
    fn test_single_event_case_has_no_duration() {
        let events = vec![Event::new("C1", "A", at(0)).with_actor("E1", None)];

        let report = analyze_performance(&events, AggregationLevel::Employee);
        assert!(report.performance.is_empty());
    }

    #[test]
    fn test_steps_of_unresolved_resources_are_skipped() {
        let events = vec![
            Event::new("C1", "A", at(0)),
            Event::new("C1", "B", at(5)).with_actor("E1", None),
            Event::new("C1", "C", at(6)),
        ];

        let report = analyze_performance(&events, AggregationLevel::Employee);
        assert_eq!(report.performance.len(), 1);
        assert_eq!(report.performance[0].total_duration_hours, 1.0);
    }
}

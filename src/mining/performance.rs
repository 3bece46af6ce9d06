use std::collections::HashMap;

use tracing::trace;

use crate::{
    common::{Trace, group_traces, stats},
    mining::Dfg,
    model::Event,
    utils::time::hours_between,
};

/// Waiting hours of every adjacent activity pair, keyed by `(source, target)`.
pub(crate) fn waiting_times<'a>(traces: &[Trace<'a>]) -> HashMap<(&'a str, &'a str), Vec<f64>> {
    let mut samples: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for t in traces.iter() {
        for (source, target) in t.pairs() {
            samples
                .entry((source.activity.as_str(), target.activity.as_str()))
                .or_default()
                .push(hours_between(&source.timestamp, &target.timestamp));
        }
    }
    samples
}

/// Sets the mean waiting time, in hours rounded to 2 decimals, on every edge of `dfg`.
pub(crate) fn annotate_traces(
    traces: &[Trace<'_>],
    mut dfg: Dfg,
) -> Dfg {
    for ((source, target), samples) in waiting_times(traces) {
        let Some(edge) = dfg.edge_mut(source, target) else {
            continue;
        };
        edge.avg_waiting_time_hours = stats::mean(&samples).map(|avg| stats::round_to(avg, 2));
    }
    dfg
}

/// Annotates a discovered graph with average waiting times observed in `events`.
pub fn annotate_performance(
    events: &[Event],
    dfg: Dfg,
) -> Dfg {
    trace!("performance::annotate({} events, {} edges)", events.len(), dfg.edge_count());
    let traces = group_traces(events);
    annotate_traces(&traces, dfg)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::mining::discover_dfg;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    #[test]
    fn test_average_waiting_time() {
        let events = vec![
            Event::new("C1", "A", at(0)),
            Event::new("C1", "B", at(120)),
            Event::new("C2", "A", at(0)),
            Event::new("C2", "B", at(240)),
        ];

        let dfg = annotate_performance(&events, discover_dfg(&events));
        assert_eq!(dfg.node("A").unwrap().frequency, 2);
        assert_eq!(dfg.node("B").unwrap().frequency, 2);
        assert_eq!(dfg.edge_count(), 1);

        let edge = dfg.edge("A", "B").unwrap();
        assert_eq!(edge.frequency, 2);
        assert_eq!(edge.avg_waiting_time_hours, Some(3.0));
    }

    #[test]
    fn test_waiting_time_is_rounded() {
        let events = vec![
            Event::new("C1", "A", at(0)),
            Event::new("C1", "B", at(20)),
            Event::new("C2", "A", at(0)),
            Event::new("C2", "B", at(30)),
            Event::new("C3", "A", at(0)),
            Event::new("C3", "B", at(30)),
        ];

        let dfg = annotate_performance(&events, discover_dfg(&events));
        // (1/3 + 1/2 + 1/2) / 3 = 0.4444...
        assert_eq!(dfg.edge("A", "B").unwrap().avg_waiting_time_hours, Some(0.44));
    }

    #[test]
    fn test_pairs_missing_from_graph_are_ignored() {
        let events = vec![Event::new("C1", "A", at(0)), Event::new("C1", "B", at(60))];

        let dfg = annotate_performance(&events, Dfg::new());
        assert!(dfg.is_empty());
    }

    #[test]
    fn test_waiting_time_never_negative_for_unsorted_input() {
        let events = vec![
            Event::new("C1", "C", at(180)),
            Event::new("C1", "A", at(0)),
            Event::new("C1", "B", at(60)),
        ];

        let dfg = annotate_performance(&events, discover_dfg(&events));
        for edge in dfg.edges() {
            assert!(edge.avg_waiting_time_hours.unwrap() >= 0.0);
        }
        assert_eq!(dfg.edge("B", "C").unwrap().avg_waiting_time_hours, Some(2.0));
    }
}

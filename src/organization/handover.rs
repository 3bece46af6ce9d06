use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    common::{Trace, group_traces},
    model::Event,
    organization::{AggregationLevel, ResourceLabels},
    utils::time::hours_between,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandoverNode {
    pub id: String,
    pub label: String,
    /// events performed by this resource, self-transitions included
    pub activity_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandoverEdge {
    pub source: String,
    pub target: String,
    pub handover_count: u64,
    pub avg_waiting_time_hours: f64,
}

/// Social network of work handed between resources.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandoverNetwork {
    pub nodes: Vec<HandoverNode>,
    pub edges: Vec<HandoverEdge>,
    pub aggregation_level: AggregationLevel,
}

pub(crate) fn handover_from_traces(
    traces: &[Trace<'_>],
    level: AggregationLevel,
    labels: &ResourceLabels<'_>,
) -> HandoverNetwork {
    let mut activity_count: BTreeMap<&str, u64> = BTreeMap::new();
    // (from, to) -> (count, total waiting hours)
    let mut handovers: BTreeMap<(&str, &str), (u64, f64)> = BTreeMap::new();

    for t in traces.iter() {
        for event in t.events.iter() {
            if let Some(id) = level.resource_id(event) {
                *activity_count.entry(id).or_default() += 1;
            }
        }
        for (current, next) in t.pairs() {
            let (Some(from), Some(to)) = (level.resource_id(current), level.resource_id(next)) else {
                continue;
            };
            if from == to {
                continue;
            }
            let entry = handovers.entry((from, to)).or_default();
            entry.0 += 1;
            entry.1 += hours_between(&current.timestamp, &next.timestamp);
        }
    }

    let nodes = activity_count
        .into_iter()
        .map(|(id, count)| HandoverNode {
            id: id.to_string(),
            label: labels.label(id),
            activity_count: count,
        })
        .collect();

    let edges = handovers
        .into_iter()
        .map(|((source, target), (count, total_hours))| HandoverEdge {
            source: source.to_string(),
            target: target.to_string(),
            handover_count: count,
            avg_waiting_time_hours: total_hours / count as f64,
        })
        .collect();

    HandoverNetwork {
        nodes,
        edges,
        aggregation_level: level,
    }
}

/// Counts handovers between distinct resources on adjacent events of a case.
pub fn analyze_handover(
    events: &[Event],
    level: AggregationLevel,
) -> HandoverNetwork {
    trace!("handover::analyze({} events, {})", events.len(), level);
    let traces = group_traces(events);
    let labels = ResourceLabels::collect(&traces, level);
    handover_from_traces(&traces, level, &labels)
}

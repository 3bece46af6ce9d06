use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    common::{Trace, group_traces},
    model::Event,
    organization::{AggregationLevel, ResourceLabels},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkloadItem {
    pub resource_id: String,
    pub resource_name: String,
    pub activity_count: u64,
    pub case_count: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkloadReport {
    pub workload: Vec<WorkloadItem>,
    pub aggregation_level: AggregationLevel,
}

pub(crate) fn workload_from_traces(
    traces: &[Trace<'_>],
    level: AggregationLevel,
    labels: &ResourceLabels<'_>,
) -> WorkloadReport {
    let mut counts: BTreeMap<&str, (u64, BTreeSet<&str>)> = BTreeMap::new();
    for t in traces.iter() {
        for event in t.events.iter() {
            let Some(id) = level.resource_id(event) else {
                continue;
            };
            let entry = counts.entry(id).or_default();
            entry.0 += 1;
            entry.1.insert(t.case_id);
        }
    }

    let mut workload: Vec<WorkloadItem> = counts
        .into_iter()
        .map(|(id, (activity_count, cases))| WorkloadItem {
            resource_id: id.to_string(),
            resource_name: labels.label(id),
            activity_count,
            case_count: cases.len() as u64,
        })
        .collect();
    // stable: equal counts stay in resource id order
    workload.sort_by(|a, b| b.activity_count.cmp(&a.activity_count));

    WorkloadReport {
        workload,
        aggregation_level: level,
    }
}

/// Events performed and distinct cases touched per resource, busiest first.
pub fn analyze_workload(
    events: &[Event],
    level: AggregationLevel,
) -> WorkloadReport {
    trace!("workload::analyze({} events, {})", events.len(), level);
    let traces = group_traces(events);
    let labels = ResourceLabels::collect(&traces, level);
    workload_from_traces(&traces, level, &labels)
}

//! Organizational mining: who hands work to whom, who carries the load, and
//! how long each resource holds a case.
//!
//! All three views resolve events to a resource through one
//! [`AggregationLevel`]. Events whose resource id is missing are skipped, they
//! are never folded into a placeholder group.

mod handover;
mod performance;
mod workload;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    common::{Trace, group_traces},
    model::Event,
};

pub use handover::{HandoverEdge, HandoverNetwork, HandoverNode, analyze_handover};
pub use performance::{PerformanceItem, PerformanceReport, analyze_performance};
pub use workload::{WorkloadItem, WorkloadReport, analyze_workload};

/// Which resource columns an organizational analysis groups by.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregationLevel {
    #[default]
    Employee,
    Department,
}

impl AggregationLevel {
    /// Resource id of an event at this level.
    pub(crate) fn resource_id<'a>(
        &self,
        event: &'a Event,
    ) -> Option<&'a str> {
        match self {
            AggregationLevel::Employee => event.actor_id.as_deref(),
            AggregationLevel::Department => event.department_id.as_deref(),
        }
    }

    /// Resource display name of an event at this level.
    pub(crate) fn resource_name<'a>(
        &self,
        event: &'a Event,
    ) -> Option<&'a str> {
        match self {
            AggregationLevel::Employee => event.actor_name.as_deref(),
            AggregationLevel::Department => event.department_name.as_deref(),
        }
    }
}

/// Display labels of every resolved resource, the first non-empty name wins.
pub(crate) struct ResourceLabels<'a> {
    names: BTreeMap<&'a str, Option<&'a str>>,
}

impl<'a> ResourceLabels<'a> {
    pub(crate) fn collect(
        traces: &[Trace<'a>],
        level: AggregationLevel,
    ) -> Self {
        let mut names: BTreeMap<&'a str, Option<&'a str>> = BTreeMap::new();
        for event in traces.iter().flat_map(|t| t.events.iter().copied()) {
            let Some(id) = level.resource_id(event) else {
                continue;
            };
            let name = names.entry(id).or_default();
            if name.is_none() {
                *name = level.resource_name(event);
            }
        }
        Self {
            names,
        }
    }

    /// Label of `id`, falling back to the id itself.
    pub(crate) fn label(
        &self,
        id: &str,
    ) -> String {
        self.names.get(id).copied().flatten().unwrap_or(id).to_string()
    }
}

/// The three organizational views computed over the same input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrganizationReport {
    pub aggregation_level: AggregationLevel,
    pub handover: HandoverNetwork,
    pub workload: WorkloadReport,
    pub performance: PerformanceReport,
}

/// Runs handover, workload and performance analysis over a single grouping pass.
pub fn analyze_organization(
    events: &[Event],
    level: AggregationLevel,
) -> OrganizationReport {
    trace!("organization::analyze({} events, {})", events.len(), level);
    let traces = group_traces(events);
    let labels = ResourceLabels::collect(&traces, level);

    OrganizationReport {
        aggregation_level: level,
        handover: handover::handover_from_traces(&traces, level, &labels),
        workload: workload::workload_from_traces(&traces, level, &labels),
        performance: performance::performance_from_traces(&traces, level, &labels),
    }
}

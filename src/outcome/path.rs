use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    Result,
    common::group_traces,
    config::OutcomeConfig,
    mining::{Dfg, annotate_traces},
    model::{Event, NodeModel, OutcomeRecord},
    outcome::{OutcomeIndex, OutcomeStats},
};

/// Directly-follows edge carrying the outcomes of the cases that traversed it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutcomeEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub frequency: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_waiting_time_hours: Option<f64>,
    pub outcome_stats: OutcomeStats,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TopPath {
    pub source: String,
    pub target: String,
    pub avg_outcome: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutcomeSummary {
    /// distinct cases in the event log
    pub total_cases: usize,
    pub metric_name: String,
    pub overall_stats: OutcomeStats,
    pub top_paths: Vec<TopPath>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutcomeGraph {
    pub nodes: Vec<NodeModel>,
    pub edges: Vec<OutcomeEdge>,
    pub summary: OutcomeSummary,
}

/// Path-outcome analysis with the default thresholds.
pub fn analyze_path_outcome(
    events: &[Event],
    outcomes: &[OutcomeRecord],
    metric_name: &str,
) -> Result<OutcomeGraph> {
    path_outcome_with(events, outcomes, metric_name, &OutcomeConfig::default())
}

/// Builds an annotated DFG whose edges carry outcome statistics and ranks the
/// edges whose average outcome stands out against the overall average.
///
/// An edge collects the case outcome once per traversal, so a case looping
/// over the same edge weighs in once for every pass.
pub fn path_outcome_with(
    events: &[Event],
    outcomes: &[OutcomeRecord],
    metric_name: &str,
    config: &OutcomeConfig,
) -> Result<OutcomeGraph> {
    trace!("outcome::path({} events, {} outcomes, {})", events.len(), outcomes.len(), metric_name);
    let index = OutcomeIndex::build(outcomes, metric_name)?;
    let traces = group_traces(events);
    let dfg = annotate_traces(&traces, Dfg::from_traces(&traces));

    let mut edge_values: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for t in traces.iter() {
        let Some(value) = index.get(t.case_id) else {
            continue;
        };
        for (source, target) in t.pairs() {
            edge_values.entry((source.activity.as_str(), target.activity.as_str())).or_default().push(value);
        }
    }

    let edges: Vec<OutcomeEdge> = dfg
        .edges()
        .map(|e| OutcomeEdge {
            id: e.id.clone(),
            source: e.source.clone(),
            target: e.target.clone(),
            frequency: e.frequency,
            avg_waiting_time_hours: e.avg_waiting_time_hours,
            outcome_stats: edge_values
                .get(&(e.source.as_str(), e.target.as_str()))
                .map(|values| OutcomeStats::from_values(values))
                .unwrap_or_default(),
        })
        .collect();

    let overall_stats = OutcomeStats::from_values(&index.values());
    let cutoff = overall_stats.avg * config.top_path_ratio;
    let mut top_paths: Vec<TopPath> = edges
        .iter()
        .filter(|e| e.outcome_stats.count > 0 && e.outcome_stats.avg >= cutoff)
        .map(|e| TopPath {
            source: e.source.clone(),
            target: e.target.clone(),
            avg_outcome: e.outcome_stats.avg,
        })
        .collect();
    // edges are already in (source, target) order, the stable sort keeps it for ties
    top_paths.sort_by(|a, b| b.avg_outcome.total_cmp(&a.avg_outcome));
    top_paths.truncate(config.top_path_limit);

    debug!("outcome::path: {} edges, {} cases with metric, {} top paths", edges.len(), index.len(), top_paths.len());

    Ok(OutcomeGraph {
        nodes: dfg.nodes().cloned().collect(),
        edges,
        summary: OutcomeSummary {
            total_cases: traces.len(),
            metric_name: metric_name.to_string(),
            overall_stats,
            top_paths,
        },
    })
}

//! Directly-follows graph discovery.
//!
//! The graph is stored in a petgraph `DiGraph` whose node weights are
//! activities and edge weights are observed direct successions. Nodes are
//! inserted in activity order and edges in `(source, target)` order, so the
//! exported result is identical for identical input.

use std::collections::{BTreeMap, HashMap};

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::{debug, trace};

use crate::{
    common::{Trace, group_traces},
    model::{AnalysisResult, EdgeModel, Event, NodeModel},
};

/// Directly-follows graph over activities.
#[derive(Debug, Clone, Default)]
pub struct Dfg {
    graph: DiGraph<NodeModel, EdgeModel>,
    index: HashMap<String, NodeIndex>,
}

impl Dfg {
    /// create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts activity occurrences and adjacent successions over the given traces.
    pub(crate) fn from_traces(traces: &[Trace<'_>]) -> Self {
        let mut activity_frequency: BTreeMap<&str, u64> = BTreeMap::new();
        let mut edge_frequency: BTreeMap<(&str, &str), u64> = BTreeMap::new();

        for t in traces.iter() {
            for event in t.events.iter() {
                *activity_frequency.entry(event.activity.as_str()).or_default() += 1;
            }
            for (source, target) in t.pairs() {
                *edge_frequency.entry((source.activity.as_str(), target.activity.as_str())).or_default() += 1;
            }
        }

        let mut dfg = Self::new();
        for (activity, frequency) in activity_frequency {
            dfg.add_node(NodeModel {
                id: activity.to_string(),
                frequency,
            });
        }
        for (idx, ((source, target), frequency)) in edge_frequency.into_iter().enumerate() {
            dfg.add_edge(EdgeModel {
                id: format!("edge-{}", idx + 1),
                source: source.to_string(),
                target: target.to_string(),
                frequency,
                avg_waiting_time_hours: None,
            });
        }
        dfg
    }

    /// add node to graph, replacing the weight of an existing activity
    pub fn add_node(
        &mut self,
        node: NodeModel,
    ) -> NodeIndex {
        if let Some(idx) = self.index.get(&node.id).copied() {
            self.graph[idx] = node;
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    /// add edge between two activities, creating missing endpoints with frequency 0
    pub fn add_edge(
        &mut self,
        edge: EdgeModel,
    ) {
        let from = self.node_index_or_insert(&edge.source);
        let to = self.node_index_or_insert(&edge.target);
        self.graph.update_edge(from, to, edge);
    }

    fn node_index_or_insert(
        &mut self,
        activity: &str,
    ) -> NodeIndex {
        if let Some(idx) = self.index.get(activity).copied() {
            return idx;
        }
        self.add_node(NodeModel {
            id: activity.to_string(),
            frequency: 0,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// get node by activity name
    pub fn node(
        &self,
        activity: &str,
    ) -> Option<&NodeModel> {
        self.index.get(activity).map(|idx| &self.graph[*idx])
    }

    /// get edge by its endpoints
    pub fn edge(
        &self,
        source: &str,
        target: &str,
    ) -> Option<&EdgeModel> {
        let from = self.index.get(source)?;
        let to = self.index.get(target)?;
        self.graph.find_edge(*from, *to).map(|idx| &self.graph[idx])
    }

    pub(crate) fn edge_mut(
        &mut self,
        source: &str,
        target: &str,
    ) -> Option<&mut EdgeModel> {
        let from = self.index.get(source)?;
        let to = self.index.get(target)?;
        let idx = self.graph.find_edge(*from, *to)?;
        self.graph.edge_weight_mut(idx)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeModel> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeModel> {
        self.graph.edge_weights()
    }

    /// Activities directly following `activity`, in edge insertion order.
    pub fn successors(
        &self,
        activity: &str,
    ) -> Vec<&str> {
        let Some(idx) = self.index.get(activity) else {
            return Vec::new();
        };
        let mut successors: Vec<(usize, &str)> = self
            .graph
            .edges_directed(*idx, Direction::Outgoing)
            .map(|e| (e.id().index(), self.graph[e.target()].id.as_str()))
            .collect();
        successors.sort_by_key(|(edge_idx, _)| *edge_idx);
        successors.into_iter().map(|(_, id)| id).collect()
    }

    /// Output a human-readable representation of the graph
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Directly-Follows Graph ===".to_string());
        lines.push(format!("Nodes: {}, Edges: {}", self.node_count(), self.edge_count()));
        lines.push(String::new());

        lines.push("--- Nodes ---".to_string());
        for node in self.nodes() {
            lines.push(format!("[{}] frequency: {}", node.id, node.frequency));
        }
        lines.push(String::new());

        lines.push("--- Edges ---".to_string());
        for edge in self.edges() {
            let waiting = match edge.avg_waiting_time_hours {
                Some(h) => format!("{}h", h),
                None => "-".to_string(),
            };
            lines.push(format!(
                "{} --> {} (id: {}, frequency: {}, avg wait: {})",
                edge.source, edge.target, edge.id, edge.frequency, waiting
            ));
        }

        lines.join("\n")
    }

    /// Exports nodes and edges in insertion order.
    pub fn to_result(&self) -> AnalysisResult {
        AnalysisResult {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
            lead_time_stats: None,
        }
    }
}

impl From<&AnalysisResult> for Dfg {
    fn from(result: &AnalysisResult) -> Self {
        let mut dfg = Dfg::new();
        for node in result.nodes.iter() {
            dfg.add_node(node.clone());
        }
        for edge in result.edges.iter() {
            dfg.add_edge(edge.clone());
        }
        dfg
    }
}

/// Discovers the directly-follows graph of an event log.
pub fn discover_dfg(events: &[Event]) -> Dfg {
    trace!("dfg::discover({} events)", events.len());
    let traces = group_traces(events);
    let dfg = Dfg::from_traces(&traces);
    debug!("dfg: {} cases, {} nodes, {} edges", traces.len(), dfg.node_count(), dfg.edge_count());
    dfg
}

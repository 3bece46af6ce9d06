use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    common::stats,
    config::CompareConfig,
    model::AnalysisResult,
};

/// Classification of a node or edge between two snapshots.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Improved,
    Degraded,
    Unchanged,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DiffNode {
    pub id: String,
    pub frequency: u64,
    pub diff_status: DiffStatus,
    /// percent, present for nodes found in both snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_change_rate: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DiffEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub frequency: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_waiting_time_hours: Option<f64>,
    pub diff_status: DiffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_change_rate: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DiffGraph {
    pub nodes: Vec<DiffNode>,
    pub edges: Vec<DiffEdge>,
}

/// Relative frequency change in percent, unrounded.
fn change_rate(
    before: u64,
    after: u64,
) -> f64 {
    if before == 0 {
        return if after == 0 { 0.0 } else { 100.0 };
    }
    (after as f64 - before as f64) / before as f64 * 100.0
}

fn classify(
    rate: f64,
    unchanged_threshold: f64,
) -> DiffStatus {
    if rate.abs() < unchanged_threshold {
        DiffStatus::Unchanged
    } else if rate > 0.0 {
        DiffStatus::Improved
    } else {
        DiffStatus::Degraded
    }
}

/// One classified element: its status, reported change rate and the snapshot it is reported from.
///
/// The status is decided on the unrounded rate, only the reported rate is rounded to 2 decimals.
struct Classified<'a, T> {
    status: DiffStatus,
    rate: Option<f64>,
    item: &'a T,
}

/// Classifies keyed items of two snapshots.
///
/// Emission order: added (after order), removed (before order), then common
/// (after order). Within one snapshot the first item of a key wins.
fn diff_keyed<'a, T, K, F>(
    before: &'a [T],
    after: &'a [T],
    key: F,
    frequency: fn(&T) -> u64,
    unchanged_threshold: f64,
) -> Vec<Classified<'a, T>>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let mut before_map: HashMap<K, &T> = HashMap::new();
    for item in before.iter() {
        before_map.entry(key(item)).or_insert(item);
    }
    let mut after_map: HashMap<K, &T> = HashMap::new();
    for item in after.iter() {
        after_map.entry(key(item)).or_insert(item);
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for item in after.iter() {
        let k = key(item);
        if !before_map.contains_key(&k) && seen.insert(k) {
            out.push(Classified {
                status: DiffStatus::Added,
                rate: None,
                item,
            });
        }
    }

    let mut seen = HashSet::new();
    for item in before.iter() {
        let k = key(item);
        if !after_map.contains_key(&k) && seen.insert(k) {
            out.push(Classified {
                status: DiffStatus::Removed,
                rate: None,
                item,
            });
        }
    }

    let mut seen = HashSet::new();
    for item in after.iter() {
        let k = key(item);
        let Some(prev) = before_map.get(&k) else {
            continue;
        };
        if !seen.insert(k) {
            continue;
        }
        let rate = change_rate(frequency(*prev), frequency(item));
        out.push(Classified {
            status: classify(rate, unchanged_threshold),
            rate: Some(stats::round_to(rate, 2)),
            item,
        });
    }
    out
}

/// Compares two snapshots with the default unchanged threshold.
pub fn diff_graphs(
    before: &AnalysisResult,
    after: &AnalysisResult,
) -> DiffGraph {
    diff_graphs_with(before, after, &CompareConfig::default())
}

/// Classifies every node and edge of two snapshots as added, removed,
/// improved, degraded or unchanged by relative frequency change. Edges are
/// renumbered `edge-1`, `edge-2`, ... in emission order.
pub fn diff_graphs_with(
    before: &AnalysisResult,
    after: &AnalysisResult,
    config: &CompareConfig,
) -> DiffGraph {
    trace!(
        "diff::graphs(before: {}/{}, after: {}/{})",
        before.nodes.len(),
        before.edges.len(),
        after.nodes.len(),
        after.edges.len()
    );

    let nodes: Vec<DiffNode> = diff_keyed(&before.nodes, &after.nodes, |n| n.id.as_str(), |n| n.frequency, config.unchanged_threshold)
        .into_iter()
        .map(|c| DiffNode {
            id: c.item.id.clone(),
            frequency: c.item.frequency,
            diff_status: c.status,
            frequency_change_rate: c.rate,
        })
        .collect();

    let edges: Vec<DiffEdge> = diff_keyed(
        &before.edges,
        &after.edges,
        |e| (e.source.as_str(), e.target.as_str()),
        |e| e.frequency,
        config.unchanged_threshold,
    )
    .into_iter()
    .enumerate()
    .map(|(idx, c)| DiffEdge {
        id: format!("edge-{}", idx + 1),
        source: c.item.source.clone(),
        target: c.item.target.clone(),
        frequency: c.item.frequency,
        avg_waiting_time_hours: c.item.avg_waiting_time_hours,
        diff_status: c.status,
        frequency_change_rate: c.rate,
    })
    .collect();

    debug!("diff: {} nodes, {} edges", nodes.len(), edges.len());
    DiffGraph {
        nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeModel, NodeModel};

    fn node(
        id: &str,
        frequency: u64,
    ) -> NodeModel {
        NodeModel {
            id: id.to_string(),
            frequency,
        }
    }

    fn edge(
        id: &str,
        source: &str,
        target: &str,
        frequency: u64,
    ) -> EdgeModel {
        EdgeModel {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            frequency,
            avg_waiting_time_hours: Some(1.5),
        }
    }

    fn snapshot(
        nodes: Vec<NodeModel>,
        edges: Vec<EdgeModel>,
    ) -> AnalysisResult {
        AnalysisResult {
            nodes,
            edges,
            lead_time_stats: None,
        }
    }

    #[test]
    fn test_change_rate() {
        assert_eq!(change_rate(100, 150), 50.0);
        assert_eq!(stats::round_to(change_rate(3, 2), 2), -33.33);
        assert_eq!(change_rate(0, 0), 0.0);
        assert_eq!(change_rate(0, 7), 100.0);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(4.99, 5.0), DiffStatus::Unchanged);
        assert_eq!(classify(-4.99, 5.0), DiffStatus::Unchanged);
        assert_eq!(classify(5.0, 5.0), DiffStatus::Improved);
        assert_eq!(classify(-5.0, 5.0), DiffStatus::Degraded);
    }

    #[test]
    fn test_status_uses_unrounded_rate() {
        let before = snapshot(vec![node("A", 100_003)], vec![edge("edge-1", "A", "A", 100_003)]);
        let after = snapshot(vec![node("A", 105_003)], vec![edge("edge-1", "A", "A", 105_003)]);

        let diff = diff_graphs(&before, &after);
        assert_eq!(diff.nodes[0].diff_status, DiffStatus::Unchanged);
        assert_eq!(diff.nodes[0].frequency_change_rate, Some(5.0));
        assert_eq!(diff.edges[0].diff_status, DiffStatus::Unchanged);
        assert_eq!(diff.edges[0].frequency_change_rate, Some(5.0));
    }

    #[test]
    fn test_diff_with_itself_is_unchanged() {
        let x = snapshot(
            vec![node("A", 10), node("B", 8), node("C", 0)],
            vec![edge("edge-1", "A", "B", 8), edge("edge-2", "B", "C", 0)],
        );

        let diff = diff_graphs(&x, &x);
        assert_eq!(diff.nodes.len(), 3);
        assert_eq!(diff.edges.len(), 2);
        for n in diff.nodes.iter() {
            assert_eq!(n.diff_status, DiffStatus::Unchanged);
            assert_eq!(n.frequency_change_rate, Some(0.0));
        }
        for e in diff.edges.iter() {
            assert_eq!(e.diff_status, DiffStatus::Unchanged);
            assert_eq!(e.frequency_change_rate, Some(0.0));
        }
    }

    #[test]
    fn test_diff_classification_and_order() {
        let before = snapshot(
            vec![node("A", 100), node("B", 100), node("Old", 5), node("C", 100)],
            vec![edge("edge-1", "A", "B", 100), edge("edge-2", "B", "Old", 5), edge("edge-3", "B", "C", 100)],
        );
        let after = snapshot(
            vec![node("New", 3), node("C", 80), node("A", 102), node("B", 130)],
            vec![edge("edge-1", "B", "C", 80), edge("edge-2", "A", "B", 130), edge("edge-3", "B", "New", 3)],
        );

        let diff = diff_graphs(&before, &after);

        let nodes: Vec<(&str, DiffStatus, Option<f64>)> = diff.nodes.iter().map(|n| (n.id.as_str(), n.diff_status, n.frequency_change_rate)).collect();
        assert_eq!(
            nodes,
            vec![
                ("New", DiffStatus::Added, None),
                ("Old", DiffStatus::Removed, None),
                ("C", DiffStatus::Degraded, Some(-20.0)),
                ("A", DiffStatus::Unchanged, Some(2.0)),
                ("B", DiffStatus::Improved, Some(30.0)),
            ]
        );
        assert_eq!(diff.nodes[1].frequency, 5);

        let edges: Vec<(&str, &str, &str, DiffStatus)> =
            diff.edges.iter().map(|e| (e.id.as_str(), e.source.as_str(), e.target.as_str(), e.diff_status)).collect();
        assert_eq!(
            edges,
            vec![
                ("edge-1", "B", "New", DiffStatus::Added),
                ("edge-2", "B", "Old", DiffStatus::Removed),
                ("edge-3", "B", "C", DiffStatus::Degraded),
                ("edge-4", "A", "B", DiffStatus::Improved),
            ]
        );
        assert_eq!(diff.edges[3].frequency, 130);
        assert_eq!(diff.edges[3].avg_waiting_time_hours, Some(1.5));
    }

    #[test]
    fn test_diff_against_empty_snapshot() {
        let x = snapshot(vec![node("A", 1)], vec![edge("edge-1", "A", "A", 1)]);
        let empty = AnalysisResult::default();

        let added = diff_graphs(&empty, &x);
        assert!(added.nodes.iter().all(|n| n.diff_status == DiffStatus::Added));
        assert_eq!(added.edges[0].diff_status, DiffStatus::Added);

        let removed = diff_graphs(&x, &empty);
        assert!(removed.nodes.iter().all(|n| n.diff_status == DiffStatus::Removed));
        assert_eq!(removed.edges[0].diff_status, DiffStatus::Removed);

        assert_eq!(diff_graphs(&empty, &empty), DiffGraph::default());
    }

    #[test]
    fn test_custom_threshold() {
        let before = snapshot(vec![node("A", 100)], vec![]);
        let after = snapshot(vec![node("A", 108)], vec![]);
        let config = CompareConfig {
            unchanged_threshold: 10.0,
        };

        assert_eq!(diff_graphs(&before, &after).nodes[0].diff_status, DiffStatus::Improved);
        assert_eq!(diff_graphs_with(&before, &after, &config).nodes[0].diff_status, DiffStatus::Unchanged);
    }
}

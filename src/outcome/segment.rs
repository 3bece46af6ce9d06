//! High/low outcome segment comparison.
//!
//! Cases carrying the metric are split at a cut value: `high` holds the
//! values at or above the cut, `low` the remainder. `top25` cuts at the 75th
//! percentile. `bottom25` cuts at the 25th percentile, so its `low` segment is
//! the bottom quarter and `high` is everything else. `threshold` cuts at a
//! caller-given value.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    ProcmineError, Result,
    common::{Trace, group_traces, stats},
    config::OutcomeConfig,
    mining::{Dfg, annotate_traces},
    model::{EdgeModel, Event, NodeModel, OutcomeRecord},
    outcome::{OutcomeIndex, OutcomeStats},
};

/// Segmentation policy.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SegmentMode {
    Top25,
    Bottom25,
    Threshold,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Segment {
    pub nodes: Vec<NodeModel>,
    pub edges: Vec<EdgeModel>,
    pub case_count: usize,
    pub outcome_stats: OutcomeStats,
}

/// Edge traversal rates of both segments, in percent rounded to 1 decimal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentDifference {
    pub source: String,
    pub target: String,
    pub high_rate: f64,
    pub low_rate: f64,
    pub diff_rate: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub metric_name: String,
    pub segment_mode: SegmentMode,
    pub threshold_value: f64,
    /// cases carrying the metric
    pub total_cases: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub high_segment: Segment,
    pub low_segment: Segment,
    pub differences: Vec<SegmentDifference>,
    pub summary: SegmentSummary,
}

/// Segment comparison with the default thresholds.
pub fn analyze_segment_comparison(
    events: &[Event],
    outcomes: &[OutcomeRecord],
    metric_name: &str,
    mode: SegmentMode,
    threshold: Option<f64>,
) -> Result<SegmentReport> {
    segment_comparison_with(events, outcomes, metric_name, mode, threshold, &OutcomeConfig::default())
}

fn cut_value(
    values: &[f64],
    mode: SegmentMode,
    threshold: Option<f64>,
) -> Result<f64> {
    match mode {
        SegmentMode::Top25 => Ok(stats::quantile(values, 0.75).unwrap_or_default()),
        SegmentMode::Bottom25 => Ok(stats::quantile(values, 0.25).unwrap_or_default()),
        SegmentMode::Threshold => match threshold {
            Some(t) if t.is_finite() => Ok(t),
            Some(t) => Err(ProcmineError::InvalidArgument(format!("threshold {} is not a finite number", t))),
            None => Err(ProcmineError::InvalidArgument("threshold is required for segment mode 'threshold'".to_string())),
        },
    }
}

struct SegmentGraph {
    segment: Segment,
    dfg: Dfg,
}

fn build_segment<'a>(
    traces: &[Trace<'a>],
    cases: &[(&'a str, f64)],
) -> SegmentGraph {
    let members: HashSet<&str> = cases.iter().map(|(case_id, _)| *case_id).collect();
    let segment_traces: Vec<Trace<'a>> = traces.iter().filter(|t| members.contains(t.case_id)).cloned().collect();
    let dfg = annotate_traces(&segment_traces, Dfg::from_traces(&segment_traces));
    let values: Vec<f64> = cases.iter().map(|(_, v)| *v).collect();

    SegmentGraph {
        segment: Segment {
            nodes: dfg.nodes().cloned().collect(),
            edges: dfg.edges().cloned().collect(),
            case_count: cases.len(),
            outcome_stats: OutcomeStats::from_values(&values),
        },
        dfg,
    }
}

fn traversal_rate(
    dfg: &Dfg,
    source: &str,
    target: &str,
    case_count: usize,
) -> f64 {
    if case_count == 0 {
        return 0.0;
    }
    dfg.edge(source, target).map(|e| e.frequency as f64 / case_count as f64).unwrap_or_default()
}

/// Splits the cases into a high and a low outcome segment, discovers a DFG
/// per segment and ranks the edges whose traversal rate differs the most.
///
/// The rate of an edge is its frequency divided by the segment's case count.
/// Differences are ranked by the reported (rounded) `|diff_rate|`; edges with
/// the same reported value stay in `(source, target)` order.
pub fn segment_comparison_with(
    events: &[Event],
    outcomes: &[OutcomeRecord],
    metric_name: &str,
    mode: SegmentMode,
    threshold: Option<f64>,
    config: &OutcomeConfig,
) -> Result<SegmentReport> {
    trace!("outcome::segment({} events, {} outcomes, {}, {})", events.len(), outcomes.len(), metric_name, mode);
    let index = OutcomeIndex::build(outcomes, metric_name)?;
    let cut = cut_value(&index.values(), mode, threshold)?;

    let (high_cases, low_cases): (Vec<(&str, f64)>, Vec<(&str, f64)>) = index.cases().iter().copied().partition(|(_, value)| *value >= cut);

    let traces = group_traces(events);
    let high = build_segment(&traces, &high_cases);
    let low = build_segment(&traces, &low_cases);

    let keys: BTreeSet<(&str, &str)> = high
        .dfg
        .edges()
        .chain(low.dfg.edges())
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();

    let mut differences: Vec<SegmentDifference> = Vec::new();
    for (source, target) in keys {
        let high_rate = traversal_rate(&high.dfg, source, target, high.segment.case_count);
        let low_rate = traversal_rate(&low.dfg, source, target, low.segment.case_count);
        let diff = high_rate - low_rate;
        if diff.abs() <= config.segment_min_diff {
            continue;
        }
        differences.push(SegmentDifference {
            source: source.to_string(),
            target: target.to_string(),
            high_rate: stats::round_to(high_rate * 100.0, 1),
            low_rate: stats::round_to(low_rate * 100.0, 1),
            diff_rate: stats::round_to(diff * 100.0, 1),
        });
    }
    // stable: equal reported rates keep (source, target) order
    differences.sort_by(|a, b| b.diff_rate.abs().total_cmp(&a.diff_rate.abs()));
    differences.truncate(config.segment_diff_limit);

    debug!(
        "outcome::segment: cut {} -> {} high / {} low cases, {} differences",
        cut,
        high.segment.case_count,
        low.segment.case_count,
        differences.len()
    );

    Ok(SegmentReport {
        high_segment: high.segment,
        low_segment: low.segment,
        differences,
        summary: SegmentSummary {
            metric_name: metric_name.to_string(),
            segment_mode: mode,
            threshold_value: cut,
            total_cases: index.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn case(
        id: &str,
        activities: &[&str],
    ) -> Vec<Event> {
        activities.iter().enumerate().map(|(i, a)| Event::new(id, *a, at(i as i64))).collect()
    }

    /// Four cases: the two best go through "Express", the two worst through "Standard".
    fn fixture() -> (Vec<Event>, Vec<OutcomeRecord>) {
        let mut events = case("C1", &["Order", "Express", "Ship"]);
        events.extend(case("C2", &["Order", "Standard", "Ship"]));
        events.extend(case("C3", &["Order", "Express", "Ship"]));
        events.extend(case("C4", &["Order", "Standard", "Ship"]));
        let outcomes = vec![
            OutcomeRecord::new("C1", "satisfaction", 400.0),
            OutcomeRecord::new("C2", "satisfaction", 100.0),
            OutcomeRecord::new("C3", "satisfaction", 300.0),
            OutcomeRecord::new("C4", "satisfaction", 200.0),
        ];
        (events, outcomes)
    }

    #[test]
    fn test_segment_mode_parse() {
        assert_eq!(SegmentMode::from_str("top25").unwrap(), SegmentMode::Top25);
        assert_eq!(SegmentMode::from_str("bottom25").unwrap(), SegmentMode::Bottom25);
        assert_eq!(SegmentMode::from_str("threshold").unwrap(), SegmentMode::Threshold);
        assert!(SegmentMode::from_str("top10").is_err());
        assert_eq!(serde_json::to_string(&SegmentMode::Bottom25).unwrap(), "\"bottom25\"");
    }

    #[test]
    fn test_top25() {
        let (events, outcomes) = fixture();

        let report = analyze_segment_comparison(&events, &outcomes, "satisfaction", SegmentMode::Top25, None).unwrap();
        assert_eq!(report.summary.threshold_value, 325.0);
        assert_eq!(report.high_segment.case_count, 1);
        assert_eq!(report.low_segment.case_count, 3);
        assert_eq!(report.high_segment.case_count + report.low_segment.case_count, report.summary.total_cases);
        assert_eq!(report.high_segment.outcome_stats.avg, 400.0);
        assert_eq!(report.low_segment.outcome_stats.avg, 200.0);

        let express = report.differences.iter().find(|d| d.source == "Order" && d.target == "Express").unwrap();
        assert_eq!(express.high_rate, 100.0);
        assert_eq!(express.low_rate, 33.3);
        assert_eq!(express.diff_rate, 66.7);

        let standard = report.differences.iter().find(|d| d.source == "Order" && d.target == "Standard").unwrap();
        assert_eq!(standard.diff_rate, -66.7);

        // Order->Express, Express->Ship, Order->Standard, Standard->Ship all differ by 66.7 points
        assert_eq!(report.differences.len(), 4);
    }

    #[test]
    fn test_equal_differences_keep_edge_order() {
        let (events, outcomes) = fixture();

        let report = analyze_segment_comparison(&events, &outcomes, "satisfaction", SegmentMode::Top25, None).unwrap();
        let order: Vec<(&str, &str)> = report.differences.iter().map(|d| (d.source.as_str(), d.target.as_str())).collect();
        assert_eq!(
            order,
            vec![("Express", "Ship"), ("Order", "Express"), ("Order", "Standard"), ("Standard", "Ship")]
        );
    }

    #[test]
    fn test_bottom25_keeps_majority_in_high_segment() {
        let (events, outcomes) = fixture();

        let report = analyze_segment_comparison(&events, &outcomes, "satisfaction", SegmentMode::Bottom25, None).unwrap();
        assert_eq!(report.summary.threshold_value, 175.0);
        assert_eq!(report.high_segment.case_count, 3);
        assert_eq!(report.low_segment.case_count, 1);
        assert_eq!(report.low_segment.outcome_stats.max, 100.0);
        assert_eq!(report.high_segment.case_count + report.low_segment.case_count, report.summary.total_cases);
    }

    #[test]
    fn test_threshold() {
        let (events, outcomes) = fixture();

        let report = analyze_segment_comparison(&events, &outcomes, "satisfaction", SegmentMode::Threshold, Some(250.0)).unwrap();
        assert_eq!(report.high_segment.case_count, 2);
        assert_eq!(report.low_segment.case_count, 2);
        assert!(report.high_segment.nodes.iter().any(|n| n.id == "Express"));
        assert!(!report.high_segment.nodes.iter().any(|n| n.id == "Standard"));

        let first = &report.differences[0];
        assert_eq!(first.diff_rate.abs(), 100.0);
        assert!(report.differences.iter().all(|d| d.diff_rate.abs() > 10.0));
        assert!(report.differences.windows(2).all(|w| w[0].diff_rate.abs() >= w[1].diff_rate.abs()));
    }

    #[test]
    fn test_threshold_is_required() {
        let (events, outcomes) = fixture();

        let err = analyze_segment_comparison(&events, &outcomes, "satisfaction", SegmentMode::Threshold, None).unwrap_err();
        assert!(matches!(err, ProcmineError::InvalidArgument(_)));
        let err = analyze_segment_comparison(&events, &outcomes, "satisfaction", SegmentMode::Threshold, Some(f64::NAN)).unwrap_err();
        assert!(matches!(err, ProcmineError::InvalidArgument(_)));
    }

    #[test]
    fn test_no_outcome_rows() {
        let (events, _) = fixture();

        let report = analyze_segment_comparison(&events, &[], "satisfaction", SegmentMode::Top25, None).unwrap();
        assert_eq!(report.summary.total_cases, 0);
        assert_eq!(report.high_segment, Segment::default());
        assert_eq!(report.low_segment, Segment::default());
        assert!(report.differences.is_empty());
    }

    #[test]
    fn test_differences_truncated() {
        let mut events = Vec::new();
        let mut outcomes = Vec::new();
        for i in 0..5 {
            let high = format!("H{}", i);
            events.extend(case(&high, &["Start", format!("Fast{}", i).as_str()]));
            outcomes.push(OutcomeRecord::new(high, "score", 10.0));
        }
        let config = OutcomeConfig {
            segment_diff_limit: 3,
            ..OutcomeConfig::default()
        };

        let report = segment_comparison_with(&events, &outcomes, "score", SegmentMode::Threshold, Some(5.0), &config).unwrap();
        assert_eq!(report.low_segment.case_count, 0);
        assert_eq!(report.differences.len(), 3);
    }
}

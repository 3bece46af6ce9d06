//! Analysis engine - the main entry point for Procmine.
//!
//! The engine owns the configuration and the tokio runtime used to run
//! analyses off the caller's thread, under a wall-clock budget.

use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;
use tracing::{debug, trace, warn};

use crate::{
    Config, ProcmineError, Result,
    compare::{DiffGraph, diff_graphs_with},
    filter::{self, CaseFilter, Preview},
    mining::{LeadTimeReport, annotate_performance, compute_lead_time_stats, discover_dfg},
    model::{AnalysisResult, EventLog},
    organization::{AggregationLevel, OrganizationReport, analyze_organization},
    outcome::{OutcomeGraph, SegmentMode, SegmentReport, path_outcome_with, segment_comparison_with},
};

/// One analysis to run over an event log, tagged by `analysis_type`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "analysis_type", rename_all = "kebab-case")]
pub enum AnalysisRequest {
    /// Directly-follows graph with waiting times and lead-time statistics.
    ProcessMap {
        #[serde(default)]
        filter: CaseFilter,
    },
    LeadTime {
        #[serde(default)]
        filter: CaseFilter,
    },
    Organization {
        #[serde(default)]
        aggregation_level: AggregationLevel,
        #[serde(default)]
        filter: CaseFilter,
    },
    PathOutcome {
        metric_name: String,
        #[serde(default)]
        filter: CaseFilter,
    },
    SegmentComparison {
        metric_name: String,
        segment_mode: SegmentMode,
        #[serde(default)]
        threshold: Option<f64>,
        #[serde(default)]
        filter: CaseFilter,
    },
}

impl AnalysisRequest {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<AnalysisRequest>(s).map_err(|e| ProcmineError::InvalidArgument(format!("invalid analysis request: {}", e)))
    }

    pub fn analysis_type(&self) -> &'static str {
        match self {
            AnalysisRequest::ProcessMap { .. } => "process-map",
            AnalysisRequest::LeadTime { .. } => "lead-time",
            AnalysisRequest::Organization { .. } => "organization",
            AnalysisRequest::PathOutcome { .. } => "path-outcome",
            AnalysisRequest::SegmentComparison { .. } => "segment-comparison",
        }
    }

    pub fn filter(&self) -> &CaseFilter {
        match self {
            AnalysisRequest::ProcessMap { filter }
            | AnalysisRequest::LeadTime { filter }
            | AnalysisRequest::Organization { filter, .. }
            | AnalysisRequest::PathOutcome { filter, .. }
            | AnalysisRequest::SegmentComparison { filter, .. } => filter,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "analysis_type", content = "result", rename_all = "kebab-case")]
pub enum AnalysisOutput {
    ProcessMap(AnalysisResult),
    LeadTime(LeadTimeReport),
    Organization(OrganizationReport),
    PathOutcome(OutcomeGraph),
    SegmentComparison(SegmentReport),
}

impl AnalysisOutput {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn analyze_with(
    config: &Config,
    request: &AnalysisRequest,
    log: &EventLog,
) -> Result<AnalysisOutput> {
    trace!("engine::analyze({}, {} events)", request.analysis_type(), log.events.len());
    let events = request.filter().apply(&log.events)?;

    let output = match request {
        AnalysisRequest::ProcessMap { .. } => {
            let dfg = annotate_performance(&events, discover_dfg(&events));
            let mut result = dfg.to_result();
            result.lead_time_stats = Some(compute_lead_time_stats(&events));
            AnalysisOutput::ProcessMap(result)
        }
        AnalysisRequest::LeadTime { .. } => AnalysisOutput::LeadTime(compute_lead_time_stats(&events)),
        AnalysisRequest::Organization { aggregation_level, .. } => AnalysisOutput::Organization(analyze_organization(&events, *aggregation_level)),
        AnalysisRequest::PathOutcome { metric_name, .. } => {
            AnalysisOutput::PathOutcome(path_outcome_with(&events, &log.outcomes, metric_name, &config.outcome)?)
        }
        AnalysisRequest::SegmentComparison {
            metric_name,
            segment_mode,
            threshold,
            ..
        } => AnalysisOutput::SegmentComparison(segment_comparison_with(&events, &log.outcomes, metric_name, *segment_mode, *threshold, &config.outcome)?),
    };

    Ok(output)
}

/// The analysis engine.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new().build()?;
/// let log = Arc::new(EventLog::from_json(text)?);
///
/// let request = AnalysisRequest::from_json(r#"{"analysis_type": "process-map"}"#)?;
/// let output = engine.run_blocking(request, log)?;
/// ```
pub struct Engine {
    config: Arc<Config>,
    runtime: Arc<Runtime>,
}

impl Engine {
    pub(crate) fn new(
        config: Config,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            runtime,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs one analysis on the calling thread.
    pub fn analyze(
        &self,
        request: &AnalysisRequest,
        log: &EventLog,
    ) -> Result<AnalysisOutput> {
        analyze_with(&self.config, request, log)
    }

    /// Runs one analysis on the blocking pool, bounded by `analysis_timeout_ms`.
    ///
    /// An expired budget returns `Timeout`; the detached computation is left to finish on its own.
    pub async fn run(
        &self,
        request: AnalysisRequest,
        log: Arc<EventLog>,
    ) -> Result<AnalysisOutput> {
        let analysis_type = request.analysis_type();
        let budget = self.config.analysis_timeout_ms;
        let config = self.config.clone();
        let task = self.runtime.spawn_blocking(move || analyze_with(&config, &request, &log));

        let joined = if budget == 0 {
            task.await
        } else {
            match tokio::time::timeout(Duration::from_millis(budget), task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!("engine: {} analysis exceeded {}ms", analysis_type, budget);
                    return Err(ProcmineError::Timeout(format!("{} analysis exceeded {}ms", analysis_type, budget)));
                }
            }
        };

        joined.map_err(|e| ProcmineError::Engine(format!("{} analysis task failed: {}", analysis_type, e)))?
    }

    /// Blocks the calling thread on [`Engine::run`].
    ///
    /// Must not be called from within an async context.
    pub fn run_blocking(
        &self,
        request: AnalysisRequest,
        log: Arc<EventLog>,
    ) -> Result<AnalysisOutput> {
        self.runtime.block_on(self.run(request, log))
    }

    /// Runs independent analyses concurrently over the same log, results in request order.
    pub async fn run_batch(
        &self,
        requests: Vec<AnalysisRequest>,
        log: Arc<EventLog>,
    ) -> Vec<Result<AnalysisOutput>> {
        debug!("engine: running batch of {} analyses", requests.len());
        join_all(requests.into_iter().map(|request| self.run(request, log.clone()))).await
    }

    /// Diffs two process-map snapshots.
    pub fn compare(
        &self,
        before: &AnalysisResult,
        after: &AnalysisResult,
    ) -> DiffGraph {
        diff_graphs_with(before, after, &self.config.compare)
    }

    /// Reports what a filter would select, without running an analysis.
    pub fn preview(
        &self,
        log: &EventLog,
        case_filter: &CaseFilter,
    ) -> Result<Preview> {
        filter::preview(&log.events, case_filter)
    }
}

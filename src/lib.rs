//! # Procmine
//!
//! Procmine is a lightweight process-mining analytics engine written in Rust.
//! It turns a case-oriented event log into process maps and related analyses.
//!
//! ## Core Features
//!
//! - **Process Discovery**: Directly-follows graph with activity and transition frequencies
//! - **Performance**: Waiting times per transition, lead-time statistics and the happy path
//! - **Organization**: Handover network, workload and performance per employee or department
//! - **Outcome Analysis**: Outcome metrics per transition and high/low segment comparison
//! - **Snapshot Diff**: Structural comparison of two process maps
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use procmine::{AnalysisRequest, EngineBuilder, EventLog};
//!
//! let engine = EngineBuilder::new().build()?;
//! let log = EventLog::from_json(json_str)?;
//!
//! let request = AnalysisRequest::from_json(r#"{"analysis_type": "process-map"}"#)?;
//! let output = engine.analyze(&request, &log)?;
//! println!("{}", output.to_json()?);
//! ```

mod builder;
mod common;
mod config;
mod engine;
mod error;
mod utils;

pub mod compare;
pub mod filter;
pub mod mining;
pub mod model;
pub mod organization;
pub mod outcome;

pub use builder::EngineBuilder;
pub use compare::{DiffGraph, DiffStatus, diff_graphs};
pub use config::{CompareConfig, Config, OutcomeConfig};
pub use engine::{AnalysisOutput, AnalysisRequest, Engine};
pub use error::ProcmineError;
pub use filter::{CaseFilter, FilterMode, Preview, preview};
pub use mining::{Dfg, LeadTimeReport, annotate_performance, compute_lead_time_stats, discover_dfg};
pub use model::*;
pub use organization::{AggregationLevel, OrganizationReport, analyze_handover, analyze_organization, analyze_performance, analyze_workload};
pub use outcome::{OutcomeGraph, SegmentMode, SegmentReport, analyze_path_outcome, analyze_segment_comparison};

/// Result type alias for Procmine operations.
pub type Result<T> = std::result::Result<T, ProcmineError>;

//! Control-flow discovery: directly-follows graph, waiting times and lead times.

mod dfg;
mod lead_time;
mod performance;

pub use dfg::{Dfg, discover_dfg};
pub use lead_time::{DurationStats, HappyPath, LeadTimeReport, compute_lead_time_stats};
pub use performance::annotate_performance;

pub(crate) use performance::annotate_traces;

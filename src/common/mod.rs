pub mod stats;
mod trace;

pub use trace::{Trace, group_traces};

mod analysis;
mod edge;
mod event;
mod node;

pub use analysis::AnalysisResult;
pub use edge::EdgeModel;
pub use event::{Event, EventLog, MetricInfo, OutcomeRecord};
pub use node::NodeModel;

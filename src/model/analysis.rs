use serde::{Deserialize, Serialize};

use crate::{
    Result,
    mining::LeadTimeReport,
    model::{EdgeModel, NodeModel},
};

/// Output bundle of a process-map analysis, the unit handed to persistence and to the graph differ.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub nodes: Vec<NodeModel>,
    pub edges: Vec<EdgeModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_stats: Option<LeadTimeReport>,
}

impl AnalysisResult {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str::<AnalysisResult>(s)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

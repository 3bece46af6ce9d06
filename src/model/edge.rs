use serde::{Deserialize, Serialize};

/// Directly-follows edge of a result graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeModel {
    pub id: String,
    pub source: String,
    pub target: String,
    pub frequency: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_waiting_time_hours: Option<f64>,
}

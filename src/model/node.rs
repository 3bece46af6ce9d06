use serde::{Deserialize, Serialize};

/// Activity node of a result graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeModel {
    pub id: String,
    pub frequency: u64,
}

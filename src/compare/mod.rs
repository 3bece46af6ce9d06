//! Structural comparison of two analysis snapshots.

mod diff;

pub use diff::{DiffEdge, DiffGraph, DiffNode, DiffStatus, diff_graphs, diff_graphs_with};

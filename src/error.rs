use thiserror::Error;

use crate::tree::NodeId;

/// Fatal tree construction and layout-validation failures. There is no
/// partial layout: any of these aborts the render before geometry is
/// produced.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("failed to parse newick: {0}")]
    Parse(String),

    #[error("tree has no root node")]
    Empty,

    #[error("negative branch length {length} on node {node}")]
    NegativeBranchLength { node: NodeId, length: f64 },
}

/// Errors from edge-geometry queries on a computed layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Interpolation was requested on a node with no incoming edge (the
    /// root). Raised rather than swallowed: it indicates a caller bug.
    #[error("node {0} has no parent edge to interpolate along")]
    EdgeNotFound(NodeId),
}

//! Error types for network consolidation

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ConsolidateError>;

/// Everything that can abort a consolidation run.
///
/// Dangling link endpoints are deliberately absent: those links are dropped
/// during rebuilding and only counted.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// A raw node has no cluster assignment
    #[error("node {node_id} has no cluster assignment")]
    UnassignedNode { node_id: String },

    /// Connectivity reduction over a graph without vertices
    #[error("cannot reduce an empty graph to its largest component")]
    EmptyGraph,

    /// A pass-through attribute required by the output is absent
    #[error("missing required global attribute: {0}")]
    MissingGlobalAttribute(&'static str),

    /// Clustering threshold is negative or not finite
    #[error("invalid clustering distance: {0}")]
    InvalidEps(f64),

    /// Structurally broken input record
    #[error("malformed network input: {0}")]
    MalformedInput(String),

    #[error("failed to parse network XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to write XML: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

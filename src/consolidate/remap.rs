//! Raw node id → canonical node resolution

use crate::cluster::{canonical_id, ClusterSet};
use crate::error::{ConsolidateError, Result};
use crate::network::RawNode;

/// Read-only view of a clustering used to rename raw node ids
pub struct NodeRemapper<'a> {
    clusters: &'a ClusterSet,
}

impl<'a> NodeRemapper<'a> {
    pub fn new(clusters: &'a ClusterSet) -> Self {
        Self { clusters }
    }

    /// Cluster label of a raw node, or `None` for ids the clustering never saw
    pub fn lookup(&self, raw_id: &str) -> Option<usize> {
        self.clusters.label_of(raw_id)
    }

    /// Cluster label of a raw node that must have been clustered
    pub fn label(&self, raw_id: &str) -> Result<usize> {
        self.lookup(raw_id)
            .ok_or_else(|| ConsolidateError::UnassignedNode {
                node_id: raw_id.to_string(),
            })
    }

    /// Canonical node id of a raw node that must have been clustered
    pub fn canonical_id(&self, raw_id: &str) -> Result<String> {
        self.label(raw_id).map(canonical_id)
    }

    /// Centroid of the cluster with the given label.
    ///
    /// `label` must come from this remapper; labels index the cluster arena.
    pub fn coordinate(&self, label: usize) -> (f64, f64) {
        let cluster = &self.clusters.clusters[label];
        (cluster.x, cluster.y)
    }

    /// Check that every raw node resolves to a cluster
    pub fn verify_total(&self, nodes: &[RawNode]) -> Result<()> {
        for node in nodes {
            self.label(&node.id)?;
        }
        Ok(())
    }
}

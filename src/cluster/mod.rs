//! Spatial clustering of raw nodes into canonical nodes

pub mod detection;
pub mod metrics;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::network::CanonicalNode;

/// A group of raw nodes that share one canonical representative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Label assigned by the clustering pass, also the index in [`ClusterSet::clusters`]
    pub label: usize,

    /// Members of this cluster (indices into the raw node list), ascending
    pub members: Vec<u32>,

    /// Mean x of the members
    pub x: f64,

    /// Mean y of the members
    pub y: f64,
}

impl Cluster {
    /// Size of the cluster
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Identifier of the canonical node standing in for this cluster
    pub fn canonical_id(&self) -> String {
        canonical_id(self.label)
    }
}

/// Canonical node id for a cluster label
pub fn canonical_id(label: usize) -> String {
    format!("c{}", label)
}

/// Arena of clusters indexed by label, plus the raw id → label table
#[derive(Debug, Clone, Default)]
pub struct ClusterSet {
    pub clusters: Vec<Cluster>,
    assignments: HashMap<String, usize>,
}

impl ClusterSet {
    pub(crate) fn new(clusters: Vec<Cluster>, assignments: HashMap<String, usize>) -> Self {
        Self {
            clusters,
            assignments,
        }
    }

    /// Label of the cluster containing the raw node `raw_id`
    pub fn label_of(&self, raw_id: &str) -> Option<usize> {
        self.assignments.get(raw_id).copied()
    }

    pub fn get(&self, label: usize) -> Option<&Cluster> {
        self.clusters.get(label)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of raw nodes with an assignment
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// One canonical node per cluster, in label order
    pub fn canonical_nodes(&self) -> Vec<CanonicalNode> {
        self.clusters
            .iter()
            .map(|cluster| CanonicalNode {
                label: cluster.label,
                id: cluster.canonical_id(),
                x: cluster.x,
                y: cluster.y,
            })
            .collect()
    }
}

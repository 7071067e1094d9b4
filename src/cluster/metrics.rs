//! Cluster statistics and metrics

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cluster::{Cluster, ClusterSet};
use crate::network::{euclidean, RawNode};

/// Summary of a clustering pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub cluster_count: usize,

    /// Clusters with more than one member
    pub merged_cluster_count: usize,

    /// Raw nodes that ended up sharing a canonical node with another raw node
    pub merged_node_count: usize,

    pub largest_cluster_size: usize,

    /// Greatest distance from any member to its cluster centroid
    pub max_spread: f64,
}

/// Calculate statistics over all clusters
pub fn calculate_cluster_stats(clusters: &ClusterSet, nodes: &[RawNode]) -> ClusterStats {
    let (merged_cluster_count, merged_node_count) = clusters
        .clusters
        .iter()
        .filter(|cluster| cluster.size() > 1)
        .fold((0, 0), |(count, members), cluster| {
            (count + 1, members + cluster.size())
        });

    let largest_cluster_size = clusters
        .clusters
        .iter()
        .map(Cluster::size)
        .max()
        .unwrap_or(0);

    let max_spread = clusters
        .clusters
        .iter()
        .map(|cluster| calculate_spread(cluster, nodes))
        .fold(0.0, f64::max);

    ClusterStats {
        cluster_count: clusters.len(),
        merged_cluster_count,
        merged_node_count,
        largest_cluster_size,
        max_spread,
    }
}

/// Greatest member distance from the centroid
pub fn calculate_spread(cluster: &Cluster, nodes: &[RawNode]) -> f64 {
    cluster
        .members
        .iter()
        .map(|&idx| {
            let node = &nodes[idx as usize];
            euclidean(cluster.x, cluster.y, node.x, node.y)
        })
        .fold(0.0, f64::max)
}

/// Cluster size histogram as (size, number of clusters), ascending by size
pub fn size_distribution(clusters: &ClusterSet) -> Vec<(usize, usize)> {
    clusters
        .clusters
        .iter()
        .map(Cluster::size)
        .counts()
        .into_iter()
        .sorted()
        .collect()
}

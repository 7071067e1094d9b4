//! Density-based node clustering
//!
//! With a minimum cluster size of one every node is a core point, so the
//! clusters are exactly the connected components of the "within `eps`" graph.
//! Neighbourhoods come from an R-tree and are merged with union-find.

use std::collections::HashMap;

use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::cluster::{Cluster, ClusterSet};
use crate::error::{ConsolidateError, Result};
use crate::network::RawNode;

type IndexedPoint = GeomWithData<[f64; 2], u32>;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x, halving the path on the way up
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach the smaller tree under the root of the larger one
        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
    }
}

/// Cluster nodes by transitive proximity within `eps`.
///
/// Labels follow first appearance in `nodes`: the cluster holding `nodes[0]`
/// is label 0, the next cluster first touched in input order is label 1, and
/// so on. Membership and labels are independent of thread scheduling.
pub fn cluster_nodes(nodes: &[RawNode], eps: f64) -> Result<ClusterSet> {
    if !eps.is_finite() || eps < 0.0 {
        return Err(ConsolidateError::InvalidEps(eps));
    }
    if let Some(node) = nodes.iter().find(|node| !node.x.is_finite() || !node.y.is_finite()) {
        return Err(ConsolidateError::MalformedInput(format!(
            "node {} has non-finite coordinate ({}, {})",
            node.id, node.x, node.y
        )));
    }

    log::info!("Clustering {} nodes with eps = {}", nodes.len(), eps);

    let points: Vec<IndexedPoint> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| GeomWithData::new([node.x, node.y], i as u32))
        .collect();
    let tree = RTree::bulk_load(points);

    // Neighbour queries are independent; only pairs (i, j > i) are kept
    let squared_eps = eps * eps;
    let neighbour_pairs: Vec<(u32, u32)> = nodes
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, node)| {
            let src = i as u32;
            tree.locate_within_distance([node.x, node.y], squared_eps)
                .map(|point| point.data)
                .filter(move |&dst| dst > src)
                .map(move |dst| (src, dst))
                .collect::<Vec<_>>()
        })
        .collect();

    log::debug!("Found {} node pairs within eps", neighbour_pairs.len());

    let mut sets = DisjointSets::new(nodes.len());
    for (src, dst) in neighbour_pairs {
        sets.union(src, dst);
    }

    // Assign labels in order of first appearance
    let mut root_labels: HashMap<u32, usize> = HashMap::new();
    let mut members: Vec<Vec<u32>> = Vec::new();
    let mut assignments: HashMap<String, usize> = HashMap::with_capacity(nodes.len());

    for (i, node) in nodes.iter().enumerate() {
        let root = sets.find(i as u32);
        let label = *root_labels.entry(root).or_insert_with(|| {
            members.push(Vec::new());
            members.len() - 1
        });
        members[label].push(i as u32);
        assignments.insert(node.id.clone(), label);
    }

    let clusters: Vec<Cluster> = members
        .into_iter()
        .enumerate()
        .map(|(label, members)| {
            let (x, y) = centroid(nodes, &members);
            Cluster {
                label,
                members,
                x,
                y,
            }
        })
        .collect();

    log::info!(
        "Grouped {} nodes into {} clusters",
        nodes.len(),
        clusters.len()
    );

    Ok(ClusterSet::new(clusters, assignments))
}

/// Arithmetic mean of the member coordinates, summed in member order
fn centroid(nodes: &[RawNode], members: &[u32]) -> (f64, f64) {
    let (sum_x, sum_y) = members.iter().fold((0.0, 0.0), |(sx, sy), &idx| {
        let node = &nodes[idx as usize];
        (sx + node.x, sy + node.y)
    });
    let n = members.len() as f64;
    (sum_x / n, sum_y / n)
}

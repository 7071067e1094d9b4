//! Graph construction module

use crate::graph::CompressedGraph;

/// Builder for incrementally constructing a CompressedGraph over a fixed
/// vertex set
pub struct GraphBuilder {
    /// Adjacency lists for each node
    adjacency_lists: Vec<Vec<u32>>,
}

impl GraphBuilder {
    /// Create a builder with `node_count` vertices and no edges
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency_lists: vec![Vec::new(); node_count],
        }
    }

    /// Add an edge from one node to another
    pub fn add_edge(&mut self, src: u32, dst: u32) {
        self.adjacency_lists[src as usize].push(dst);
    }

    /// Build the compressed graph; parallel edges collapse into one
    pub fn build(mut self) -> CompressedGraph {
        let node_count = self.adjacency_lists.len();

        for list in &mut self.adjacency_lists {
            // Sorted adjacency keeps traversal order deterministic
            list.sort_unstable();
            list.dedup();
        }

        let edge_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();
        let mut graph = CompressedGraph::with_capacity(node_count, edge_count);

        graph.offsets.push(0);
        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            graph.offsets.push(offset);
            graph.edges.extend_from_slice(list);
        }

        graph
    }
}

//! Reduction to the largest strongly connected component

use crate::consolidate::links::RebuiltLink;
use crate::error::{ConsolidateError, Result};
use crate::graph::algorithms::{count_largest_ties, largest_component, strongly_connected_components};
use crate::graph::GraphBuilder;

/// Nodes and links of the selected component
#[derive(Debug, Clone)]
pub struct ReducedNetwork {
    /// Canonical labels in the component, ascending
    pub nodes: Vec<usize>,

    /// Links with both endpoints in the component, in input order
    pub links: Vec<RebuiltLink>,

    /// Number of strongly connected components found
    pub component_count: usize,
}

/// Keep only the largest strongly connected component.
///
/// Every canonical label in `0..node_count` is a vertex, including those
/// without links. When several components share the maximum size the one
/// completed first by the traversal (rooted at the lowest label) wins.
pub fn reduce_to_largest_component(
    node_count: usize,
    links: Vec<RebuiltLink>,
) -> Result<ReducedNetwork> {
    if node_count == 0 {
        return Err(ConsolidateError::EmptyGraph);
    }

    let mut builder = GraphBuilder::new(node_count);
    for link in &links {
        builder.add_edge(link.source as u32, link.destination as u32);
    }
    let graph = builder.build();

    log::debug!(
        "Connectivity graph: {} nodes, {} edges, ~{} bytes",
        graph.node_count,
        graph.edge_count(),
        graph.memory_usage()
    );

    let components = strongly_connected_components(&graph);
    let Some(selected) = largest_component(&components) else {
        return Err(ConsolidateError::EmptyGraph);
    };

    let ties = count_largest_ties(&components);
    if ties > 1 {
        log::warn!(
            "{} strongly connected components share the largest size {}; keeping the first found",
            ties,
            components[selected].len()
        );
    }

    let mut in_component = vec![false; node_count];
    for &node in &components[selected] {
        in_component[node as usize] = true;
    }

    let nodes: Vec<usize> = components[selected].iter().map(|&n| n as usize).collect();
    let links: Vec<RebuiltLink> = links
        .into_iter()
        .filter(|link| in_component[link.source] && in_component[link.destination])
        .collect();

    log::info!(
        "Found {} strongly connected components; largest has {} nodes and {} links",
        components.len(),
        nodes.len(),
        links.len()
    );

    Ok(ReducedNetwork {
        nodes,
        links,
        component_count: components.len(),
    })
}

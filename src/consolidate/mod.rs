//! Network consolidation pipeline
//!
//! Cluster nodes → remap ids → rebuild links → deduplicate → reduce to the
//! largest strongly connected component → assemble. Each stage fully
//! materializes its output before the next one starts.

pub mod assemble;
pub mod connectivity;
pub mod links;
pub mod remap;

use serde::{Deserialize, Serialize};

use crate::cluster::detection::cluster_nodes;
use crate::cluster::metrics::{calculate_cluster_stats, size_distribution, ClusterStats};
use crate::config::Config;
use crate::error::Result;
use crate::network::{ConsolidatedGraph, Network};

use self::assemble::assemble;
use self::connectivity::reduce_to_largest_component;
use self::links::{deduplicate_links, rebuild_links};
use self::remap::NodeRemapper;

/// Counts collected along the pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub raw_node_count: usize,
    pub raw_link_count: usize,
    pub clusters: ClusterStats,
    pub self_loops_dropped: usize,
    pub dangling_links_dropped: usize,
    pub duplicates_dropped: usize,
    pub component_count: usize,
    pub final_node_count: usize,
    pub final_link_count: usize,
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub graph: ConsolidatedGraph,
    pub report: ConsolidationReport,
}

/// Consolidate a raw network into a deduplicated, strongly connected graph
pub fn consolidate_network(network: &Network, config: &Config) -> Result<Consolidation> {
    log::info!(
        "Consolidating network with {} nodes and {} links",
        network.nodes.len(),
        network.links.len()
    );

    let clusters = cluster_nodes(&network.nodes, config.eps)?;
    let cluster_stats = calculate_cluster_stats(&clusters, &network.nodes);
    log::info!(
        "{} raw nodes merged into {} multi-node clusters (largest {}, max spread {:.3})",
        cluster_stats.merged_node_count,
        cluster_stats.merged_cluster_count,
        cluster_stats.largest_cluster_size,
        cluster_stats.max_spread
    );
    log::debug!("Cluster sizes (size, count): {:?}", size_distribution(&clusters));

    let remapper = NodeRemapper::new(&clusters);
    remapper.verify_total(&network.nodes)?;

    let rebuilt = rebuild_links(&network.links, &remapper);
    let (deduped, duplicates_dropped) = deduplicate_links(rebuilt.links);

    let reduced = reduce_to_largest_component(clusters.len(), deduped)?;
    let component_count = reduced.component_count;

    let graph = assemble(&clusters, reduced, &network.metadata)?;

    let report = ConsolidationReport {
        raw_node_count: network.nodes.len(),
        raw_link_count: network.links.len(),
        clusters: cluster_stats,
        self_loops_dropped: rebuilt.self_loops,
        dangling_links_dropped: rebuilt.dangling,
        duplicates_dropped,
        component_count,
        final_node_count: graph.nodes.len(),
        final_link_count: graph.links.len(),
    };

    log::info!(
        "Consolidated graph has {} nodes and {} links",
        report.final_node_count,
        report.final_link_count
    );

    Ok(Consolidation { graph, report })
}

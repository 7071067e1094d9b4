//! Run summary persistence

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use serde_json::{json, to_string_pretty};

use crate::consolidate::ConsolidationReport;

/// Build the JSON summary of a consolidation run
pub fn summary_json(report: &ConsolidationReport) -> serde_json::Value {
    let clusters = &report.clusters;
    let retained_node_share = if clusters.cluster_count == 0 {
        0.0
    } else {
        report.final_node_count as f64 / clusters.cluster_count as f64
    };

    json!({
        "input": {
            "node_count": report.raw_node_count,
            "link_count": report.raw_link_count,
        },
        "clustering": {
            "cluster_count": clusters.cluster_count,
            "merged_cluster_count": clusters.merged_cluster_count,
            "merged_node_count": clusters.merged_node_count,
            "largest_cluster_size": clusters.largest_cluster_size,
            "max_spread": clusters.max_spread,
        },
        "links": {
            "self_loops_dropped": report.self_loops_dropped,
            "dangling_links_dropped": report.dangling_links_dropped,
            "duplicates_dropped": report.duplicates_dropped,
        },
        "connectivity": {
            "component_count": report.component_count,
            "retained_node_share": retained_node_share,
        },
        "output": {
            "node_count": report.final_node_count,
            "link_count": report.final_link_count,
        }
    })
}

/// Save the run summary to `path`
pub fn save_summary(report: &ConsolidationReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!("Saving run summary to {}", path.display());

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&summary_json(report))?.as_bytes())?;

    Ok(())
}

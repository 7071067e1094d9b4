//! Packaging of the reduced network into the output graph

use crate::cluster::ClusterSet;
use crate::consolidate::connectivity::ReducedNetwork;
use crate::error::{ConsolidateError, Result};
use crate::network::{
    ConsolidatedGraph, ConsolidatedLink, GlobalAttributes, NetworkMetadata,
    CAPACITY_PERIOD_ATTRIBUTE, CRS_ATTRIBUTE, EFFECTIVE_CELL_SIZE_ATTRIBUTE,
    EFFECTIVE_LANE_WIDTH_ATTRIBUTE,
};

impl GlobalAttributes {
    /// Take the pass-through attributes from an input snapshot; all are required
    pub fn from_metadata(metadata: &NetworkMetadata) -> Result<Self> {
        fn required(value: &Option<String>, name: &'static str) -> Result<String> {
            value
                .clone()
                .ok_or(ConsolidateError::MissingGlobalAttribute(name))
        }

        Ok(Self {
            crs: required(&metadata.crs, CRS_ATTRIBUTE)?,
            capacity_period: required(&metadata.capacity_period, CAPACITY_PERIOD_ATTRIBUTE)?,
            effective_cell_size: required(
                &metadata.effective_cell_size,
                EFFECTIVE_CELL_SIZE_ATTRIBUTE,
            )?,
            effective_lane_width: required(
                &metadata.effective_lane_width,
                EFFECTIVE_LANE_WIDTH_ATTRIBUTE,
            )?,
        })
    }
}

/// Build the final graph from the reduced component
pub fn assemble(
    clusters: &ClusterSet,
    reduced: ReducedNetwork,
    metadata: &NetworkMetadata,
) -> Result<ConsolidatedGraph> {
    let attributes = GlobalAttributes::from_metadata(metadata)?;

    let canonical = clusters.canonical_nodes();
    let nodes = reduced
        .nodes
        .iter()
        .map(|&label| canonical[label].clone())
        .collect();

    let links = reduced
        .links
        .into_iter()
        .map(|link| ConsolidatedLink {
            from: canonical[link.source].id.clone(),
            to: canonical[link.destination].id.clone(),
            id: link.id,
            length: link.length,
            attributes: link.attributes,
        })
        .collect();

    Ok(ConsolidatedGraph {
        nodes,
        links,
        attributes,
    })
}

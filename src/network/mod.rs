//! Network snapshot data model
//!
//! Raw snapshots are read from MATSim-style XML (see [`xml`]); consolidated
//! snapshots are produced by [`crate::consolidate`] and converted back to a
//! [`Network`] for writing.

pub mod xml;

use serde::{Deserialize, Serialize};

/// Name of the global attribute holding the coordinate reference system
pub const CRS_ATTRIBUTE: &str = "coordinateReferenceSystem";
pub const CAPACITY_PERIOD_ATTRIBUTE: &str = "capperiod";
pub const EFFECTIVE_CELL_SIZE_ATTRIBUTE: &str = "effectivecellsize";
pub const EFFECTIVE_LANE_WIDTH_ATTRIBUTE: &str = "effectivelanewidth";

/// A node as read from the input, in planar coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

impl RawNode {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }
}

/// Named extended attribute of a link (`<attribute name class>value</attribute>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedAttribute {
    pub name: String,
    pub class: String,
    pub value: String,
}

/// Opaque per-link attributes, carried through consolidation unchanged.
///
/// Values are kept as the strings found in the input so they are written back
/// exactly as read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkAttributes {
    pub freespeed: Option<String>,
    pub capacity: Option<String>,
    pub permlanes: Option<String>,
    pub oneway: Option<String>,
    pub modes: Option<String>,

    /// Extended attributes in first-seen order, unique by name
    pub extended: Vec<ExtendedAttribute>,
}

impl LinkAttributes {
    /// Insert or replace an extended attribute, keeping the position of the
    /// first occurrence of `name`
    pub fn set_extended(&mut self, name: &str, class: &str, value: &str) {
        match self.extended.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => {
                existing.class = class.to_string();
                existing.value = value.to_string();
            }
            None => self.extended.push(ExtendedAttribute {
                name: name.to_string(),
                class: class.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn extended(&self, name: &str) -> Option<&ExtendedAttribute> {
        self.extended.iter().find(|attr| attr.name == name)
    }
}

/// A directed link between two nodes, referenced by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    pub id: String,
    pub from: String,
    pub to: String,

    /// Length as written in the source; recomputed during consolidation
    pub length: Option<String>,

    pub attributes: LinkAttributes,
}

/// Snapshot-level attributes that are passed through verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetadata {
    pub crs: Option<String>,
    pub capacity_period: Option<String>,
    pub effective_cell_size: Option<String>,
    pub effective_lane_width: Option<String>,
}

/// A complete network snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Nodes in document order, unique by id
    pub nodes: Vec<RawNode>,

    /// Links in document order
    pub links: Vec<RawLink>,

    pub metadata: NetworkMetadata,
}

/// Representative node standing in for one cluster of raw nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalNode {
    /// Cluster label this node represents
    pub label: usize,
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Link of the consolidated graph, expressed over canonical node ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedLink {
    pub id: String,
    pub from: String,
    pub to: String,
    pub length: f64,
    pub attributes: LinkAttributes,
}

/// Global attributes every consolidated graph must carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAttributes {
    pub crs: String,
    pub capacity_period: String,
    pub effective_cell_size: String,
    pub effective_lane_width: String,
}

/// Final deduplicated, strongly connected graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedGraph {
    /// Canonical nodes in ascending label order
    pub nodes: Vec<CanonicalNode>,

    /// Links in deduplication order
    pub links: Vec<ConsolidatedLink>,

    pub attributes: GlobalAttributes,
}

impl ConsolidatedGraph {
    /// Convert into a plain snapshot with the same shape as the input
    pub fn to_network(&self) -> Network {
        Network {
            nodes: self
                .nodes
                .iter()
                .map(|node| RawNode::new(node.id.clone(), node.x, node.y))
                .collect(),
            links: self
                .links
                .iter()
                .map(|link| RawLink {
                    id: link.id.clone(),
                    from: link.from.clone(),
                    to: link.to.clone(),
                    length: Some(link.length.to_string()),
                    attributes: link.attributes.clone(),
                })
                .collect(),
            metadata: NetworkMetadata {
                crs: Some(self.attributes.crs.clone()),
                capacity_period: Some(self.attributes.capacity_period.clone()),
                effective_cell_size: Some(self.attributes.effective_cell_size.clone()),
                effective_lane_width: Some(self.attributes.effective_lane_width.clone()),
            },
        }
    }
}

/// Planar Euclidean distance
pub fn euclidean(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    (x2 - x1).hypot(y2 - y1)
}

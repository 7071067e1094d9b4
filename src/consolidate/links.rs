//! Link rebuilding over canonical nodes and deduplication

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consolidate::remap::NodeRemapper;
use crate::network::{euclidean, LinkAttributes, RawLink};

/// A raw link re-expressed between two distinct canonical nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebuiltLink {
    pub id: String,

    /// Canonical source label
    pub source: usize,

    /// Canonical destination label, never equal to `source`
    pub destination: usize,

    /// Euclidean distance between the two centroids
    pub length: f64,

    pub attributes: LinkAttributes,
}

impl RebuiltLink {
    /// Deduplication key; direction matters
    pub fn key(&self) -> (usize, usize) {
        (self.source, self.destination)
    }
}

/// Result of rebuilding, with counts of what was discarded
#[derive(Debug, Clone, Default)]
pub struct RebuildOutcome {
    /// Surviving links in input order
    pub links: Vec<RebuiltLink>,
    pub self_loops: usize,
    pub dangling: usize,
}

enum Rebuilt {
    Link(RebuiltLink),
    SelfLoop,
    Dangling,
}

/// Rebuild every raw link over canonical nodes.
///
/// Links with an endpoint the clustering does not know are dropped, as are
/// links whose endpoints collapse into the same cluster. Output order is input
/// order.
pub fn rebuild_links(links: &[RawLink], remapper: &NodeRemapper) -> RebuildOutcome {
    let rebuilt: Vec<Rebuilt> = links
        .par_iter()
        .map(|link| rebuild_link(link, remapper))
        .collect();

    let mut outcome = RebuildOutcome {
        links: Vec::with_capacity(rebuilt.len()),
        ..Default::default()
    };
    for item in rebuilt {
        match item {
            Rebuilt::Link(link) => outcome.links.push(link),
            Rebuilt::SelfLoop => outcome.self_loops += 1,
            Rebuilt::Dangling => outcome.dangling += 1,
        }
    }

    log::info!(
        "Rebuilt {} links ({} self-loops and {} dangling links dropped)",
        outcome.links.len(),
        outcome.self_loops,
        outcome.dangling
    );

    outcome
}

fn rebuild_link(link: &RawLink, remapper: &NodeRemapper) -> Rebuilt {
    let (Some(source), Some(destination)) = (remapper.lookup(&link.from), remapper.lookup(&link.to))
    else {
        log::debug!("Dropping link {} with unknown endpoint", link.id);
        return Rebuilt::Dangling;
    };

    if source == destination {
        return Rebuilt::SelfLoop;
    }

    let (x1, y1) = remapper.coordinate(source);
    let (x2, y2) = remapper.coordinate(destination);

    Rebuilt::Link(RebuiltLink {
        id: link.id.clone(),
        source,
        destination,
        length: euclidean(x1, y1, x2, y2),
        attributes: link.attributes.clone(),
    })
}

/// Keep the first link for each ordered (source, destination) pair.
///
/// Returns the survivors in their original order and the number dropped.
pub fn deduplicate_links(links: Vec<RebuiltLink>) -> (Vec<RebuiltLink>, usize) {
    let before = links.len();
    let unique: Vec<RebuiltLink> = links.into_iter().unique_by(RebuiltLink::key).collect();
    let dropped = before - unique.len();

    log::info!(
        "Deduplicated links: {} kept, {} duplicates dropped",
        unique.len(),
        dropped
    );

    (unique, dropped)
}

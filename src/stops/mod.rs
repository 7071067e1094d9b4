//! Stop placement on the nearest link of a network
//!
//! Points are expected in the network's planar coordinate system.

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::network::xml::write_atomically;
use crate::network::{euclidean, Network, RawNode};

const TRANSIT_SCHEDULE_DOCTYPE: &str =
    r#"transitSchedule SYSTEM "http://www.matsim.org/files/dtd/transitSchedule_v1.dtd""#;

/// A planar point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl FromStr for Point {
    type Err = String;

    /// Parse `x,y`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got {:?}", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid coordinate {:?}: {}", v, e))
        };
        Ok(Self::new(parse(x)?, parse(y)?))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A stop facility attached to a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopFacility {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub link_ref_id: String,
    pub is_blocking: bool,
}

/// Distance from `p` to the segment `a`-`b`; the foot of the perpendicular is
/// clamped to the segment's endpoints
pub fn point_to_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return euclidean(p.x, p.y, a.x, a.y);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    euclidean(p.x, p.y, a.x + t * dx, a.y + t * dy)
}

/// Link segments with resolvable endpoints, in link order
pub struct LinkSegments<'a> {
    segments: Vec<(&'a str, Point, Point)>,
}

impl<'a> LinkSegments<'a> {
    pub fn new(network: &'a Network) -> Self {
        let nodes: HashMap<&str, &RawNode> = network
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node))
            .collect();

        let segments = network
            .links
            .iter()
            .filter_map(|link| {
                let from = nodes.get(link.from.as_str())?;
                let to = nodes.get(link.to.as_str())?;
                Some((
                    link.id.as_str(),
                    Point::new(from.x, from.y),
                    Point::new(to.x, to.y),
                ))
            })
            .collect();

        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Id of the closest link and its distance; the first link wins ties
    pub fn nearest(&self, point: Point) -> Option<(&'a str, f64)> {
        let mut best: Option<(&'a str, f64)> = None;
        for &(id, a, b) in &self.segments {
            let dist = point_to_segment_distance(point, a, b);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((id, dist));
            }
        }
        best
    }
}

/// Id of the link closest to `point`, if the network has any resolvable link
pub fn find_nearest_link(point: Point, network: &Network) -> Option<String> {
    LinkSegments::new(network)
        .nearest(point)
        .map(|(id, _)| id.to_string())
}

/// Attach each point to its nearest link; stop ids follow the point order
pub fn place_stops(points: &[Point], network: &Network) -> Vec<StopFacility> {
    let segments = LinkSegments::new(network);
    log::info!(
        "Placing {} stops on {} link segments",
        points.len(),
        segments.len()
    );

    points
        .iter()
        .enumerate()
        .filter_map(|(i, &point)| match segments.nearest(point) {
            Some((link_id, dist)) => {
                log::debug!("stop_{} at {} -> link {} ({:.2})", i, point, link_id, dist);
                Some(StopFacility {
                    id: format!("stop_{}", i),
                    x: point.x,
                    y: point.y,
                    link_ref_id: link_id.to_string(),
                    is_blocking: false,
                })
            }
            None => {
                log::warn!("No link found for stop_{} at {}, skipping", i, point);
                None
            }
        })
        .collect()
}

/// Write stops as a MATSim transit schedule file
pub fn write_transit_schedule_file(stops: &[StopFacility], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!("Writing {} stops to {}", stops.len(), path.display());

    write_atomically(path, |out| write_transit_schedule(stops, out))
}

/// Serialize stops as `<transitSchedule><transitStops>...`
pub fn write_transit_schedule<W: Write>(stops: &[StopFacility], inner: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(inner, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(TRANSIT_SCHEDULE_DOCTYPE)))?;
    writer.write_event(Event::Start(BytesStart::new("transitSchedule")))?;
    writer.write_event(Event::Start(BytesStart::new("transitStops")))?;

    for stop in stops {
        let x = stop.x.to_string();
        let y = stop.y.to_string();
        let elem = BytesStart::new("stopFacility").with_attributes([
            ("id", stop.id.as_str()),
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("linkRefId", stop.link_ref_id.as_str()),
            ("isBlocking", if stop.is_blocking { "true" } else { "false" }),
        ]);
        writer.write_event(Event::Empty(elem))?;
    }

    writer.write_event(Event::End(BytesEnd::new("transitStops")))?;
    writer.write_event(Event::End(BytesEnd::new("transitSchedule")))?;
    writer.get_mut().write_all(b"\n")?;

    Ok(())
}

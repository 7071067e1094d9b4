//! MATSim network XML reading and writing

use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{ConsolidateError, Result};
use crate::network::{
    LinkAttributes, Network, RawLink, RawNode, CAPACITY_PERIOD_ATTRIBUTE, CRS_ATTRIBUTE,
    EFFECTIVE_CELL_SIZE_ATTRIBUTE, EFFECTIVE_LANE_WIDTH_ATTRIBUTE,
};

const STRING_CLASS: &str = "java.lang.String";

/// Load a network snapshot from an XML file
pub fn read_network_file(path: impl AsRef<Path>) -> Result<Network> {
    let path = path.as_ref();
    log::info!("Reading network file: {}", path.display());

    let text = fs::read_to_string(path)?;
    let network = parse_network(&text)?;

    log::info!(
        "Loaded network with {} nodes and {} links",
        network.nodes.len(),
        network.links.len()
    );

    Ok(network)
}

/// Parse a network snapshot from XML text
pub fn parse_network(text: &str) -> Result<Network> {
    // MATSim files usually carry a DOCTYPE pointing at the network DTD
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)?;
    let root = doc.root_element();

    let mut network = Network::default();

    // Only the snapshot-level <attributes> block carries the CRS
    network.metadata.crs = child_elements(root, "attributes")
        .flat_map(|attrs| child_elements(attrs, "attribute"))
        .find(|attr| attr.attribute("name") == Some(CRS_ATTRIBUTE))
        .map(|attr| attr.text().unwrap_or_default().to_string());

    // Later duplicates overwrite the coordinate but keep the first position
    let mut positions: HashMap<String, usize> = HashMap::new();
    for elem in child_elements(root, "nodes").flat_map(|nodes| child_elements(nodes, "node")) {
        let id = elem
            .attribute("id")
            .ok_or_else(|| ConsolidateError::MalformedInput("node without id".to_string()))?;
        let x = parse_coordinate(elem, id, "x")?;
        let y = parse_coordinate(elem, id, "y")?;

        match positions.get(id) {
            Some(&pos) => {
                log::debug!("Duplicate node id {}, keeping the later coordinate", id);
                network.nodes[pos] = RawNode::new(id, x, y);
            }
            None => {
                positions.insert(id.to_string(), network.nodes.len());
                network.nodes.push(RawNode::new(id, x, y));
            }
        }
    }

    if let Some(links) = child_elements(root, "links").next() {
        let owned = |name: &str| links.attribute(name).map(str::to_string);
        network.metadata.capacity_period = owned(CAPACITY_PERIOD_ATTRIBUTE);
        network.metadata.effective_cell_size = owned(EFFECTIVE_CELL_SIZE_ATTRIBUTE);
        network.metadata.effective_lane_width = owned(EFFECTIVE_LANE_WIDTH_ATTRIBUTE);
    }

    for elem in child_elements(root, "links").flat_map(|links| child_elements(links, "link")) {
        network.links.push(parse_link(elem)?);
    }

    Ok(network)
}

fn child_elements<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |child| child.is_element() && child.has_tag_name(tag))
}

fn parse_coordinate(elem: roxmltree::Node, id: &str, axis: &str) -> Result<f64> {
    let raw = elem.attribute(axis).ok_or_else(|| {
        ConsolidateError::MalformedInput(format!("node {} has no {} coordinate", id, axis))
    })?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConsolidateError::MalformedInput(format!(
            "node {} has non-numeric {} coordinate {:?}",
            id, axis, raw
        ))),
    }
}

fn parse_link(elem: roxmltree::Node) -> Result<RawLink> {
    let required = |name: &str| {
        elem.attribute(name).map(str::to_string).ok_or_else(|| {
            ConsolidateError::MalformedInput(format!("link without {} attribute", name))
        })
    };
    let optional = |name: &str| elem.attribute(name).map(str::to_string);

    let mut attributes = LinkAttributes {
        freespeed: optional("freespeed"),
        capacity: optional("capacity"),
        permlanes: optional("permlanes"),
        oneway: optional("oneway"),
        modes: optional("modes"),
        extended: Vec::new(),
    };

    for attr in child_elements(elem, "attributes").flat_map(|attrs| child_elements(attrs, "attribute")) {
        let Some(name) = attr.attribute("name") else {
            continue;
        };
        attributes.set_extended(
            name,
            attr.attribute("class").unwrap_or_default(),
            attr.text().unwrap_or_default(),
        );
    }

    Ok(RawLink {
        id: required("id")?,
        from: required("from")?,
        to: required("to")?,
        length: optional("length"),
        attributes,
    })
}

/// Write a network snapshot to an XML file
pub fn write_network_file(network: &Network, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::info!(
        "Writing network with {} nodes and {} links to {}",
        network.nodes.len(),
        network.links.len(),
        path.display()
    );

    write_atomically(path, |out| write_network(network, out))
}

/// Write through a temporary sibling file that replaces `path` only once the
/// whole document is written; on failure `path` is left untouched
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut out = BufWriter::new(tmp.as_file());
        write(&mut out)?;
        out.flush()?;
    }
    tmp.persist(path).map_err(|err| err.error)?;

    Ok(())
}

/// Serialize a network snapshot as MATSim network XML
pub fn write_network<W: Write>(network: &Network, inner: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(inner, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("network")))?;

    if let Some(crs) = &network.metadata.crs {
        writer.write_event(Event::Start(BytesStart::new("attributes")))?;
        write_named_attribute(&mut writer, CRS_ATTRIBUTE, STRING_CLASS, crs)?;
        writer.write_event(Event::End(BytesEnd::new("attributes")))?;
    }

    writer.write_event(Event::Start(BytesStart::new("nodes")))?;
    for node in &network.nodes {
        let x = node.x.to_string();
        let y = node.y.to_string();
        let elem = BytesStart::new("node").with_attributes([
            ("id", node.id.as_str()),
            ("x", x.as_str()),
            ("y", y.as_str()),
        ]);
        writer.write_event(Event::Empty(elem))?;
    }
    writer.write_event(Event::End(BytesEnd::new("nodes")))?;

    let mut links = BytesStart::new("links");
    let metadata = &network.metadata;
    for (name, value) in [
        (CAPACITY_PERIOD_ATTRIBUTE, &metadata.capacity_period),
        (EFFECTIVE_CELL_SIZE_ATTRIBUTE, &metadata.effective_cell_size),
        (EFFECTIVE_LANE_WIDTH_ATTRIBUTE, &metadata.effective_lane_width),
    ] {
        if let Some(value) = value {
            links.push_attribute((name, value.as_str()));
        }
    }
    writer.write_event(Event::Start(links))?;
    for link in &network.links {
        write_link(&mut writer, link)?;
    }
    writer.write_event(Event::End(BytesEnd::new("links")))?;

    writer.write_event(Event::End(BytesEnd::new("network")))?;
    writer.get_mut().write_all(b"\n")?;

    Ok(())
}

fn write_link<W: Write>(writer: &mut Writer<W>, link: &RawLink) -> Result<()> {
    let attrs = &link.attributes;

    let mut elem = BytesStart::new("link").with_attributes([
        ("id", link.id.as_str()),
        ("from", link.from.as_str()),
        ("to", link.to.as_str()),
    ]);
    for (name, value) in [
        ("length", &link.length),
        ("freespeed", &attrs.freespeed),
        ("capacity", &attrs.capacity),
        ("permlanes", &attrs.permlanes),
        ("oneway", &attrs.oneway),
        ("modes", &attrs.modes),
    ] {
        if let Some(value) = value {
            elem.push_attribute((name, value.as_str()));
        }
    }

    if attrs.extended.is_empty() {
        writer.write_event(Event::Empty(elem))?;
        return Ok(());
    }

    writer.write_event(Event::Start(elem))?;
    writer.write_event(Event::Start(BytesStart::new("attributes")))?;
    for attr in &attrs.extended {
        write_named_attribute(writer, &attr.name, &attr.class, &attr.value)?;
    }
    writer.write_event(Event::End(BytesEnd::new("attributes")))?;
    writer.write_event(Event::End(BytesEnd::new("link")))?;

    Ok(())
}

fn write_named_attribute<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    class: &str,
    value: &str,
) -> Result<()> {
    let elem = BytesStart::new("attribute").with_attributes([("name", name), ("class", class)]);
    writer.write_event(Event::Start(elem))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new("attribute")))?;
    Ok(())
}

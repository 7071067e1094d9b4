use std::collections::{HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::DiGraph;

use network_consolidator::cluster::detection::cluster_nodes;
use network_consolidator::consolidate::links::{deduplicate_links, rebuild_links};
use network_consolidator::consolidate::remap::NodeRemapper;
use network_consolidator::network::xml::{parse_network, read_network_file, write_network_file};
use network_consolidator::network::{LinkAttributes, NetworkMetadata, RawLink, RawNode};
use network_consolidator::stops::{place_stops, Point};
use network_consolidator::{consolidate_network, ConsolidateError, ConsolidatedGraph, Config, Network};

const NETWORK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE network SYSTEM "http://www.matsim.org/files/dtd/network_v2.dtd">
<network>
  <attributes>
    <attribute name="coordinateReferenceSystem" class="java.lang.String">EPSG:32649</attribute>
  </attributes>
  <nodes>
    <node id="A" x="0.0" y="0.0"/>
    <node id="A'" x="0.5" y="0.0"/>
    <node id="B" x="100.0" y="0.0"/>
    <node id="C" x="100.0" y="100.0"/>
    <node id="D" x="500.0" y="500.0"/>
  </nodes>
  <links capperiod="01:00:00" effectivecellsize="7.5" effectivelanewidth="3.75">
    <link id="loop" from="A" to="A'" length="0.5" freespeed="8.33" capacity="300.0" permlanes="1.0" oneway="1" modes="car"/>
    <link id="ab" from="A'" to="B" length="99.5" freespeed="13.89" capacity="600.0" permlanes="1.0" oneway="1" modes="car">
      <attributes>
        <attribute name="osm:way:highway" class="java.lang.String">primary</attribute>
        <attribute name="osm:way:id" class="java.lang.Long">123</attribute>
      </attributes>
    </link>
    <link id="ab" from="A" to="B" length="100.0" freespeed="22.22" capacity="900.0" permlanes="2.0" oneway="1" modes="car"/>
    <link id="bc" from="B" to="C" length="100.0" freespeed="13.89" capacity="600.0" permlanes="1.0" oneway="1" modes="car,bus"/>
    <link id="ca" from="C" to="A" length="141.4" freespeed="13.89" capacity="600.0" permlanes="1.0" oneway="1" modes="car"/>
    <link id="cx" from="C" to="X" length="10.0" freespeed="13.89" capacity="600.0" permlanes="1.0" oneway="1" modes="car"/>
  </links>
</network>
"#;

fn metadata() -> NetworkMetadata {
    NetworkMetadata {
        crs: Some("EPSG:32649".to_string()),
        capacity_period: Some("01:00:00".to_string()),
        effective_cell_size: Some("7.5".to_string()),
        effective_lane_width: Some("3.75".to_string()),
    }
}

/// Deterministic pseudo-random source for generated networks
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }

    fn unit(&mut self) -> f64 {
        self.next(1_000_000) as f64 / 1_000_000.0
    }
}

/// Grid intersections 50 apart, some duplicated with a small jitter, joined
/// by random one-way links
fn generated_network(seed: u64) -> Network {
    let mut rng = Lcg(seed);
    let mut nodes = Vec::new();
    for row in 0..12 {
        for col in 0..12 {
            let (x, y) = (col as f64 * 50.0, row as f64 * 50.0);
            nodes.push(RawNode::new(format!("n{}_{}", row, col), x, y));
            if rng.next(4) == 0 {
                nodes.push(RawNode::new(
                    format!("n{}_{}_dup", row, col),
                    x + rng.unit() * 0.6,
                    y - rng.unit() * 0.6,
                ));
            }
        }
    }

    let mut links = Vec::new();
    for i in 0..nodes.len() * 3 {
        let from = &nodes[rng.next(nodes.len() as u64) as usize];
        let to = &nodes[rng.next(nodes.len() as u64) as usize];
        links.push(RawLink {
            id: format!("l{}", i),
            from: from.id.clone(),
            to: to.id.clone(),
            length: None,
            attributes: LinkAttributes {
                freespeed: Some(format!("{}", i)),
                ..Default::default()
            },
        });
    }

    Network {
        nodes,
        links,
        metadata: metadata(),
    }
}

fn reachable(graph: &ConsolidatedGraph, start: &str, reverse: bool) -> HashSet<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in &graph.links {
        let (a, b) = if reverse {
            (link.to.as_str(), link.from.as_str())
        } else {
            (link.from.as_str(), link.to.as_str())
        };
        adjacency.entry(a).or_default().push(b);
    }

    let mut seen = HashSet::from([start.to_string()]);
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for &next in adjacency.get(node).into_iter().flatten() {
            if seen.insert(next.to_string()) {
                stack.push(next);
            }
        }
    }
    seen
}

#[test]
fn consolidates_sample_network_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("network.xml");
    let output = dir.path().join("processed_network.xml");
    std::fs::write(&input, NETWORK_XML).unwrap();

    let network = read_network_file(&input).unwrap();
    let consolidation = consolidate_network(&network, &Config::default()).unwrap();
    write_network_file(&consolidation.graph.to_network(), &output).unwrap();

    let written = read_network_file(&output).unwrap();

    let node_ids: Vec<&str> = written.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(node_ids, vec!["c0", "c1", "c2"]);
    assert_eq!((written.nodes[0].x, written.nodes[0].y), (0.25, 0.0));

    let link_ids: Vec<&str> = written.links.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(link_ids, vec!["ab", "bc", "ca"]);

    // the first "ab" wins, with its extended attributes intact
    let ab = &written.links[0];
    assert_eq!(ab.from, "c0");
    assert_eq!(ab.to, "c1");
    assert_eq!(ab.length.as_deref(), Some("99.75"));
    assert_eq!(ab.attributes.freespeed.as_deref(), Some("13.89"));
    assert_eq!(ab.attributes.extended.len(), 2);
    assert_eq!(ab.attributes.extended[1].class, "java.lang.Long");
    assert_eq!(written.links[1].attributes.modes.as_deref(), Some("car,bus"));

    assert_eq!(written.metadata, metadata());

    let report = &consolidation.report;
    assert_eq!(report.self_loops_dropped, 1);
    assert_eq!(report.dangling_links_dropped, 1);
    assert_eq!(report.duplicates_dropped, 1);
    assert_eq!(report.component_count, 2);
}

#[test]
fn three_node_clustering_scenario() {
    let network = Network {
        nodes: vec![
            RawNode::new("p", 0.0, 0.0),
            RawNode::new("q", 0.5, 0.0),
            RawNode::new("r", 100.0, 100.0),
        ],
        links: vec![RawLink {
            id: "pq".to_string(),
            from: "p".to_string(),
            to: "q".to_string(),
            length: None,
            attributes: LinkAttributes::default(),
        }],
        metadata: metadata(),
    };

    let clusters = cluster_nodes(&network.nodes, 1.0).unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!((clusters.clusters[0].x, clusters.clusters[0].y), (0.25, 0.0));
    assert_eq!((clusters.clusters[1].x, clusters.clusters[1].y), (100.0, 100.0));

    let remapper = NodeRemapper::new(&clusters);
    let outcome = rebuild_links(&network.links, &remapper);
    assert!(outcome.links.is_empty());
    assert_eq!(outcome.self_loops, 1);

    // no links left: the result is a single canonical node
    let consolidation = consolidate_network(&network, &Config::default()).unwrap();
    assert_eq!(consolidation.graph.nodes.len(), 1);
    assert!(consolidation.graph.links.is_empty());
}

#[test]
fn generated_networks_are_strongly_connected_and_maximal() {
    for seed in [1u64, 7, 42, 1234] {
        let network = generated_network(seed);
        let config = Config::default();
        let graph = consolidate_network(&network, &config).unwrap().graph;

        // no self-loops, one link per ordered pair
        let mut pairs = HashSet::new();
        for link in &graph.links {
            assert_ne!(link.from, link.to);
            assert!(pairs.insert((link.from.clone(), link.to.clone())));
        }

        // strong connectivity within the result
        let node_ids: HashSet<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
        let start = &graph.nodes[0].id;
        assert_eq!(reachable(&graph, start, false), node_ids, "seed {}", seed);
        assert_eq!(reachable(&graph, start, true), node_ids, "seed {}", seed);

        // maximality: matches the largest component of an independent SCC pass
        let clusters = cluster_nodes(&network.nodes, config.eps).unwrap();
        let remapper = NodeRemapper::new(&clusters);
        let (deduped, _) = deduplicate_links(rebuild_links(&network.links, &remapper).links);

        let mut reference = DiGraph::<(), ()>::new();
        let indices: Vec<_> = (0..clusters.len()).map(|_| reference.add_node(())).collect();
        for link in &deduped {
            reference.add_edge(indices[link.source], indices[link.destination], ());
        }
        let largest = kosaraju_scc(&reference)
            .iter()
            .map(Vec::len)
            .max()
            .unwrap();
        assert_eq!(graph.nodes.len(), largest, "seed {}", seed);
    }
}

#[test]
fn first_duplicate_is_earliest_in_input_order() {
    let network = generated_network(99);
    let clusters = cluster_nodes(&network.nodes, 1.0).unwrap();
    let remapper = NodeRemapper::new(&clusters);
    let rebuilt = rebuild_links(&network.links, &remapper).links;

    let order: HashMap<&str, usize> = network
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| (link.id.as_str(), i))
        .collect();

    let mut earliest: HashMap<(usize, usize), usize> = HashMap::new();
    for link in &rebuilt {
        let pos = order[link.id.as_str()];
        earliest
            .entry(link.key())
            .and_modify(|p| *p = (*p).min(pos))
            .or_insert(pos);
    }

    let (deduped, _) = deduplicate_links(rebuilt);
    assert_eq!(deduped.len(), earliest.len());
    for link in &deduped {
        assert_eq!(order[link.id.as_str()], earliest[&link.key()]);
    }
}

#[test]
fn isolated_node_is_dropped() {
    let link = |id: &str, from: &str, to: &str| RawLink {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        length: None,
        attributes: LinkAttributes::default(),
    };
    let network = Network {
        nodes: vec![
            RawNode::new("A", 0.0, 0.0),
            RawNode::new("B", 10.0, 0.0),
            RawNode::new("C", 10.0, 10.0),
            RawNode::new("D", 50.0, 50.0),
        ],
        links: vec![link("ab", "A", "B"), link("bc", "B", "C"), link("ca", "C", "A")],
        metadata: metadata(),
    };

    let graph = consolidate_network(&network, &Config::default()).unwrap().graph;
    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["c0", "c1", "c2"]);
}

#[test]
fn missing_link_metadata_aborts() {
    let xml = NETWORK_XML.replace(r#" effectivelanewidth="3.75""#, "");
    let network = parse_network(&xml).unwrap();

    match consolidate_network(&network, &Config::default()) {
        Err(ConsolidateError::MissingGlobalAttribute(name)) => {
            assert_eq!(name, "effectivelanewidth")
        }
        other => panic!("unexpected result: {:?}", other.map(|c| c.report)),
    }
}

#[test]
fn stops_land_on_consolidated_links() {
    let network = parse_network(NETWORK_XML).unwrap();
    let consolidated = consolidate_network(&network, &Config::default())
        .unwrap()
        .graph
        .to_network();

    let stops = place_stops(&[Point::new(50.0, -2.0), Point::new(103.0, 60.0)], &consolidated);
    let links: Vec<&str> = stops.iter().map(|s| s.link_ref_id.as_str()).collect();
    assert_eq!(links, vec!["ab", "bc"]);
}

#[test]
fn non_finite_coordinates_abort_with_malformed_input() {
    let nodes: String = (0..20)
        .map(|i| {
            let x = if i == 7 { "NaN".to_string() } else { format!("{}", i * 10) };
            format!(r#"<node id="n{}" x="{}" y="0"/>"#, i, x)
        })
        .collect();
    let xml = format!("<network><nodes>{}</nodes><links/></network>", nodes);
    assert!(matches!(
        parse_network(&xml),
        Err(ConsolidateError::MalformedInput(_))
    ));

    // snapshots built in code bypass the reader
    let mut network = generated_network(5);
    network.nodes[7].x = f64::NAN;
    assert!(matches!(
        consolidate_network(&network, &Config::default()),
        Err(ConsolidateError::MalformedInput(_))
    ));
}

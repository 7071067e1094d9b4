//! Graph algorithms for connectivity analysis

use crate::graph::CompressedGraph;

const UNVISITED: u32 = u32::MAX;

/// Strongly connected components, using Tarjan's algorithm with an explicit
/// call stack so deep networks cannot overflow the thread stack.
///
/// Roots are tried in ascending vertex order and components are returned in
/// the order Tarjan completes them (reverse topological order of the
/// condensation). Members of each component are sorted ascending.
pub fn strongly_connected_components(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let node_count = graph.node_count;

    let mut index = vec![UNVISITED; node_count];
    let mut lowlink = vec![0u32; node_count];
    let mut on_stack = vec![false; node_count];
    let mut stack: Vec<u32> = Vec::new();
    let mut next_index = 0u32;

    // (vertex, position of the next outgoing edge to examine)
    let mut call_stack: Vec<(usize, usize)> = Vec::new();
    let mut components = Vec::new();

    for root in 0..node_count {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root as u32);
        on_stack[root] = true;
        call_stack.push((root, 0));

        while let Some(frame) = call_stack.last_mut() {
            let v = frame.0;
            let edges = graph.outgoing_edges(v);

            if frame.1 < edges.len() {
                let w = edges[frame.1] as usize;
                frame.1 += 1;

                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w as u32);
                    on_stack[w] = true;
                    call_stack.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            // All edges of v examined
            call_stack.pop();
            if let Some(&(parent, _)) = call_stack.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if lowlink[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w as usize] = false;
                    component.push(w);
                    if w as usize == v {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components
}

/// Index of the component with the most members.
///
/// Ties keep the earliest component in `components`.
pub fn largest_component(components: &[Vec<u32>]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, component) in components.iter().enumerate() {
        match best {
            Some(b) if components[b].len() >= component.len() => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Number of components sharing the maximum size
pub fn count_largest_ties(components: &[Vec<u32>]) -> usize {
    let max = components.iter().map(Vec::len).max().unwrap_or(0);
    components.iter().filter(|c| c.len() == max).count()
}

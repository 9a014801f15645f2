//! Reading and writing the sgf text format.
//!
//! ```text
//! c <comment>
//! t <name> <nodes> <edges> <layers>
//! n <id> <layer> <position>
//! e <source_id> <target_id>
//! ```
//!
//! The reader is one-shot: it consumes the whole text and returns a fully
//! populated graph or the first fatal error. Header counts are advisory;
//! disagreements with the body are reported as warnings, not errors.

use crate::error::{Error, Result};
use crate::graph::LayeredGraph;
use indexmap::IndexMap;

#[derive(Debug)]
pub struct SgfRead {
    pub graph: LayeredGraph,
    pub warnings: Vec<String>,
}

struct NodeLine {
    id: usize,
    layer: usize,
    position: usize,
    line: usize,
}

struct EdgeLine {
    source: usize,
    target: usize,
    line: usize,
}

struct Header {
    name: String,
    nodes: usize,
    edges: usize,
    layers: usize,
}

pub fn read_sgf(input: &str) -> Result<SgfRead> {
    let mut comments: Vec<String> = Vec::new();
    let mut header: Option<Header> = None;
    let mut nodes: Vec<NodeLine> = Vec::new();
    let mut edges: Vec<EdgeLine> = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let mut parts = text.split_whitespace();
        let tag = parts.next().unwrap();
        match tag {
            "c" => {
                comments.push(text[1..].trim_start().to_string());
            }
            "t" => {
                if header.is_some() {
                    return Err(Error::parse(line, "second 't' header line"));
                }
                let name = parts
                    .next()
                    .ok_or_else(|| Error::parse(line, "header is missing the graph name"))?;
                let counts = parse_fields::<3>(&mut parts, line, "header")?;
                header = Some(Header {
                    name: name.to_string(),
                    nodes: counts[0],
                    edges: counts[1],
                    layers: counts[2],
                });
            }
            "n" => {
                let fields = parse_fields::<3>(&mut parts, line, "node record")?;
                nodes.push(NodeLine {
                    id: fields[0],
                    layer: fields[1],
                    position: fields[2],
                    line,
                });
            }
            "e" => {
                let fields = parse_fields::<2>(&mut parts, line, "edge record")?;
                edges.push(EdgeLine {
                    source: fields[0],
                    target: fields[1],
                    line,
                });
            }
            _ => {
                return Err(Error::parse(line, format!("unrecognized line '{text}'")));
            }
        }
    }

    let header = header.ok_or_else(|| Error::parse(1, "missing 't' header line"))?;

    let mut warnings = Vec::new();
    if nodes.len() != header.nodes {
        warnings.push(format!(
            "header says {} nodes, file has {}",
            header.nodes,
            nodes.len()
        ));
    }
    if edges.len() != header.edges {
        warnings.push(format!(
            "header says {} edges, file has {}",
            header.edges,
            edges.len()
        ));
    }
    let actual_layers = nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0);
    if actual_layers != header.layers {
        warnings.push(format!(
            "header says {} layers, file has {actual_layers}",
            header.layers
        ));
    }

    let mut graph = LayeredGraph::new(header.name);
    graph.comments = comments;

    // nodes keep file order in the master list; the id table resolves edges
    let mut by_id: IndexMap<usize, usize> = IndexMap::with_capacity(nodes.len());
    for record in &nodes {
        let ix = graph.add_node(record.id.to_string(), record.id, record.layer);
        if by_id.insert(record.id, ix).is_some() {
            return Err(Error::DuplicateNode {
                line: record.line,
                name: record.id.to_string(),
            });
        }
    }

    // order every layer by the stated positions, then renumber 0..n-1
    for layer in 0..graph.number_of_layers() {
        let mut members: Vec<(usize, usize, usize)> = graph.layers[layer]
            .nodes
            .iter()
            .map(|&ix| (nodes[ix].position, ix, nodes[ix].line))
            .collect();
        members.sort_by_key(|&(position, _, _)| position);
        for pair in members.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::DuplicatePosition {
                    line: pair[1].2,
                    layer,
                    position: pair[1].0,
                });
            }
        }
        for (p, &(_, ix, _)) in members.iter().enumerate() {
            graph.layers[layer].nodes[p] = ix;
            graph.nodes[ix].position = p;
        }
    }

    for record in &edges {
        let source = resolve(&by_id, record.source, record.line)?;
        let target = resolve(&by_id, record.target, record.line)?;
        let (down, up) = orient(&graph, source, target, record.line)?;
        graph.add_edge(down, up);
    }

    Ok(SgfRead { graph, warnings })
}

fn parse_fields<const N: usize>(
    parts: &mut std::str::SplitWhitespace<'_>,
    line: usize,
    what: &str,
) -> Result<[usize; N]> {
    let mut out = [0; N];
    for slot in &mut out {
        let field = parts
            .next()
            .ok_or_else(|| Error::parse(line, format!("truncated {what}")))?;
        *slot = field
            .parse()
            .map_err(|_| Error::parse(line, format!("bad number '{field}' in {what}")))?;
    }
    Ok(out)
}

fn resolve(by_id: &IndexMap<usize, usize>, id: usize, line: usize) -> Result<usize> {
    by_id
        .get(&id)
        .copied()
        .ok_or_else(|| Error::DanglingEndpoint {
            line,
            name: id.to_string(),
        })
}

/// Sorts an edge's endpoints into (down, up) or reports why it cannot be.
pub(crate) fn orient(
    graph: &LayeredGraph,
    source: usize,
    target: usize,
    line: usize,
) -> Result<(usize, usize)> {
    let source_layer = graph.nodes[source].layer;
    let target_layer = graph.nodes[target].layer;
    if source_layer == target_layer {
        return Err(Error::SameLayerEdge {
            line,
            source_node: graph.nodes[source].name.clone(),
            target: graph.nodes[target].name.clone(),
            layer: source_layer,
        });
    }
    let (down, up) = if source_layer < target_layer {
        (source, target)
    } else {
        (target, source)
    };
    if graph.nodes[down].layer + 1 != graph.nodes[up].layer {
        return Err(Error::NonAdjacentEdge {
            line,
            source_node: graph.nodes[source].name.clone(),
            target: graph.nodes[target].name.clone(),
            source_layer,
            target_layer,
        });
    }
    Ok((down, up))
}

/// Renders `graph` in sgf form; the output parses back to an identical
/// graph.
pub fn write_sgf(graph: &LayeredGraph) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for comment in &graph.comments {
        if comment.is_empty() {
            out.push_str("c\n");
        } else {
            let _ = writeln!(out, "c {comment}");
        }
    }
    let _ = writeln!(
        out,
        "t {} {} {} {}",
        graph.name,
        graph.number_of_nodes(),
        graph.number_of_edges(),
        graph.number_of_layers(),
    );
    for (l, layer) in graph.layers.iter().enumerate() {
        for (p, &ix) in layer.nodes.iter().enumerate() {
            let _ = writeln!(out, "n {} {l} {p}", graph.nodes[ix].id);
        }
    }
    for edge in &graph.edges {
        let _ = writeln!(
            out,
            "e {} {}",
            graph.nodes[edge.down].id, graph.nodes[edge.up].id,
        );
    }
    out
}

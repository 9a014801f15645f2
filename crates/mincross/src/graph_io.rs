//! Building a [`LayeredGraph`] from the paired dot + ord inputs.
//!
//! The ord file defines the layers and the initial ordering; the dot file
//! supplies the graph name and the edges. Node ids are assigned in ord
//! appearance order. An edge endpoint that the ord file never mentions is
//! fatal; an ord node the dot file never touches is merely isolated.

use crate::dot;
use crate::error::{Error, Result};
use crate::graph::LayeredGraph;
use crate::ord;
use crate::sgf;
use rustc_hash::FxHashMap;

pub fn read_dot_and_ord(dot_input: &str, ord_input: &str) -> Result<LayeredGraph> {
    let ord_file = ord::read_ord(ord_input)?;
    let dot_file = dot::read_dot(dot_input)?;

    let mut graph = LayeredGraph::new(dot_file.name);
    let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
    let mut id = 0;
    for (layer, names) in ord_file.layers.iter().enumerate() {
        for name in names {
            let ix = graph.add_node(name.clone(), id, layer);
            by_name.insert(name.as_str(), ix);
            id += 1;
        }
    }

    for edge in &dot_file.edges {
        let source = *by_name
            .get(edge.source.as_str())
            .ok_or_else(|| Error::DanglingEndpoint {
                line: edge.line,
                name: edge.source.clone(),
            })?;
        let target = *by_name
            .get(edge.target.as_str())
            .ok_or_else(|| Error::DanglingEndpoint {
                line: edge.line,
                name: edge.target.clone(),
            })?;
        let (down, up) = sgf::orient(&graph, source, target, edge.line)?;
        graph.add_edge(down, up);
    }

    Ok(graph)
}

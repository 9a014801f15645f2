//! Reading and writing ord files: per-layer ordered lists of node names.
//!
//! ```text
//! # Ordering for graph g
//! 0 {
//!   a b c
//! }
//! 1 {
//!   d e
//! }
//! ```
//!
//! Layers must appear in ascending order starting at 0; `#` starts a
//! comment that runs to the end of the line.

use crate::error::{Error, Result};
use crate::graph::LayeredGraph;
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct OrdRead {
    /// Last word of the first comment line, the conventional spot for the
    /// graph name.
    pub graph_name: Option<String>,
    pub layers: Vec<Vec<String>>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Open,
    Close,
}

pub fn read_ord(input: &str) -> Result<OrdRead> {
    let mut graph_name = None;
    let mut tokens: Vec<(Token, usize)> = Vec::new();
    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = match raw.find('#') {
            Some(at) => {
                if graph_name.is_none() && raw[at + 1..].split_whitespace().next().is_some() {
                    graph_name = raw[at + 1..]
                        .split_whitespace()
                        .last()
                        .map(|w| w.to_string());
                }
                &raw[..at]
            }
            None => raw,
        };
        for word in text.split_whitespace() {
            // braces may abut a name, e.g. "0 {" vs "0{"
            let mut rest = word;
            while !rest.is_empty() {
                if let Some(tail) = rest.strip_prefix('{') {
                    tokens.push((Token::Open, line));
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix('}') {
                    tokens.push((Token::Close, line));
                    rest = tail;
                } else {
                    let end = rest.find(['{', '}']).unwrap_or(rest.len());
                    tokens.push((Token::Word(rest[..end].to_string()), line));
                    rest = &rest[end..];
                }
            }
        }
    }

    let mut layers: Vec<Vec<String>> = Vec::new();
    let mut seen: FxHashMap<String, usize> = FxHashMap::default();
    let mut cursor = tokens.iter();
    while let Some((token, line)) = cursor.next() {
        let Token::Word(number) = token else {
            return Err(Error::parse(*line, "expected a layer number"));
        };
        let layer: usize = number
            .parse()
            .map_err(|_| Error::parse(*line, format!("bad layer number '{number}'")))?;
        if layer != layers.len() {
            return Err(Error::parse(
                *line,
                format!("expected layer {}, found layer {layer}", layers.len()),
            ));
        }
        match cursor.next() {
            Some((Token::Open, _)) => {}
            _ => return Err(Error::parse(*line, "expected '{' after the layer number")),
        }
        let mut names = Vec::new();
        loop {
            match cursor.next() {
                Some((Token::Word(name), line)) => {
                    if seen.insert(name.clone(), *line).is_some() {
                        return Err(Error::DuplicateNode {
                            line: *line,
                            name: name.clone(),
                        });
                    }
                    names.push(name.clone());
                }
                Some((Token::Close, _)) => break,
                Some((Token::Open, line)) => {
                    return Err(Error::parse(*line, "unexpected '{' inside a layer"));
                }
                None => {
                    return Err(Error::parse(*line, "layer is missing its closing '}'"));
                }
            }
        }
        layers.push(names);
    }

    Ok(OrdRead { graph_name, layers })
}

/// Renders the current ordering of `graph`; round-trips through
/// [`read_ord`] together with the original dot file.
pub fn write_ord(graph: &LayeredGraph) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "# Ordering for graph {}", graph.name);
    for comment in &graph.comments {
        let _ = writeln!(out, "# {comment}");
    }
    for (l, layer) in graph.layers.iter().enumerate() {
        let _ = writeln!(out, "{l} {{");
        let names: Vec<&str> = layer
            .nodes
            .iter()
            .map(|&ix| graph.nodes[ix].name.as_str())
            .collect();
        let _ = writeln!(out, "  {}", names.join(" "));
        let _ = writeln!(out, "}}");
    }
    out
}

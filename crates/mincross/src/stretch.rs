//! Edge stretch: the distance between an edge's endpoints after each
//! layer's positions are normalized to the unit interval.

use crate::graph::LayeredGraph;

/// `|pos(down)/(|L|-1) - pos(up)/(|L+1|-1)|`, or zero when either layer has
/// fewer than two nodes.
pub fn edge_stretch(g: &LayeredGraph, e: usize) -> f64 {
    let edge = &g.edges[e];
    let down = &g.nodes[edge.down];
    let up = &g.nodes[edge.up];
    let down_len = g.layers[down.layer].len();
    let up_len = g.layers[up.layer].len();
    if down_len < 2 || up_len < 2 {
        return 0.0;
    }
    let a = down.position as f64 / (down_len - 1) as f64;
    let b = up.position as f64 / (up_len - 1) as f64;
    (a - b).abs()
}

pub fn total_stretch(g: &LayeredGraph) -> f64 {
    (0..g.number_of_edges()).map(|e| edge_stretch(g, e)).sum()
}

pub fn bottleneck_stretch(g: &LayeredGraph) -> f64 {
    (0..g.number_of_edges())
        .map(|e| edge_stretch(g, e))
        .fold(0.0, f64::max)
}

/// The unfixed edge with the largest stretch, smallest index on ties.
pub fn max_stretch_edge(g: &LayeredGraph) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for e in 0..g.number_of_edges() {
        if g.edges[e].fixed {
            continue;
        }
        let s = edge_stretch(g, e);
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((e, s));
        }
    }
    best.map(|(e, _)| e)
}

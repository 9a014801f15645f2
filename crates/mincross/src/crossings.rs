//! Crossing bookkeeping: per-channel totals, per-edge counts, and the
//! incremental deltas that let a swap or a sift be priced without a full
//! recount.
//!
//! A *channel* `c` is the set of edges between layers `c` and `c + 1`.
//! Counting walks the channel's edge endpoints in down-layer order and
//! counts inversions of the up-layer positions with an insertion sort, so a
//! recount costs the channel size plus the number of crossings found. Each
//! inversion is charged to both participating edges, which keeps
//! `sum(e.crossings) == 2 * total` at all times.

use crate::graph::LayeredGraph;

#[derive(Debug, Clone)]
pub struct CrossingCounter {
    /// `channels[c]` is the crossing count between layers `c` and `c + 1`.
    channels: Vec<u64>,
}

impl CrossingCounter {
    /// Builds a counter for `g` and performs the initial full recount.
    pub fn new(g: &mut LayeredGraph) -> Self {
        let mut counter = Self {
            channels: vec![0; g.number_of_layers().saturating_sub(1)],
        };
        counter.full_recount(g);
        counter
    }

    pub fn channel(&self, c: usize) -> u64 {
        self.channels[c]
    }

    /// Total crossings of the whole graph under the current ordering.
    pub fn total(&self) -> u64 {
        self.channels.iter().sum()
    }

    /// The bottleneck value: the largest count borne by any single edge.
    pub fn max_edge_crossings(&self, g: &LayeredGraph) -> u64 {
        g.edges.iter().map(|e| e.crossings).max().unwrap_or(0)
    }

    /// Recomputes every channel, every edge count, and the per-node sums.
    pub fn full_recount(&mut self, g: &mut LayeredGraph) {
        for edge in &mut g.edges {
            edge.crossings = 0;
        }
        for c in 0..self.channels.len() {
            self.channels[c] = count_channel(g, c);
        }
        for ix in 0..g.nodes.len() {
            refresh_node_sums(g, ix);
        }
    }

    /// Recomputes the channel between layers `c` and `c + 1` only, along
    /// with the affected per-node sums.
    pub fn recount_channel(&mut self, g: &mut LayeredGraph, c: usize) {
        for p in 0..g.layers[c].len() {
            let ix = g.node_at(c, p);
            for i in 0..g.nodes[ix].up_edges.len() {
                let e = g.nodes[ix].up_edges[i];
                g.edges[e].crossings = 0;
            }
        }
        self.channels[c] = count_channel(g, c);
        for p in 0..g.layers[c].len() {
            let ix = g.node_at(c, p);
            let sum = g.nodes[ix]
                .up_edges
                .iter()
                .map(|&e| g.edges[e].crossings)
                .sum();
            g.nodes[ix].up_crossings = sum;
        }
        for p in 0..g.layers[c + 1].len() {
            let ix = g.node_at(c + 1, p);
            let sum = g.nodes[ix]
                .down_edges
                .iter()
                .map(|&e| g.edges[e].crossings)
                .sum();
            g.nodes[ix].down_crossings = sum;
        }
    }

    /// Refreshes the channels on both sides of `layer` after its order
    /// changed.
    pub fn recount_around_layer(&mut self, g: &mut LayeredGraph, layer: usize) {
        if layer > 0 {
            self.recount_channel(g, layer - 1);
        }
        if layer + 1 < g.number_of_layers() {
            self.recount_channel(g, layer);
        }
    }

    /// Total crossings the graph would have if the adjacent nodes `n1` and
    /// `n2` exchanged positions. Pure: nothing is mutated.
    pub fn crossings_if_swapped(&self, g: &LayeredGraph, n1: usize, n2: usize) -> u64 {
        assert_eq!(g.nodes[n1].layer, g.nodes[n2].layer);
        let (left, right) = if g.nodes[n1].position < g.nodes[n2].position {
            (n1, n2)
        } else {
            (n2, n1)
        };
        assert_eq!(
            g.nodes[left].position + 1,
            g.nodes[right].position,
            "crossings_if_swapped needs adjacent nodes",
        );
        self.total() + node_crossings(g, right, left) - node_crossings(g, left, right)
    }

    /// The unfixed edge with the most crossings, smallest index on ties.
    pub fn max_crossings_edge(&self, g: &LayeredGraph) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (e, edge) in g.edges.iter().enumerate() {
            if edge.fixed {
                continue;
            }
            if best.map_or(true, |(_, c)| edge.crossings > c) {
                best = Some((e, edge.crossings));
            }
        }
        best.map(|(e, _)| e)
    }

    /// The unfixed node with the most incident crossings, smallest index on
    /// ties.
    pub fn max_crossings_node(&self, g: &LayeredGraph) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for (ix, node) in g.nodes.iter().enumerate() {
            if node.fixed {
                continue;
            }
            if best.map_or(true, |(_, c)| node.crossings() > c) {
                best = Some((ix, node.crossings()));
            }
        }
        best.map(|(ix, _)| ix)
    }

    /// The unfixed layer whose incident channels carry the most crossings,
    /// smallest index on ties.
    pub fn max_crossings_layer(&self, g: &LayeredGraph) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for l in 0..g.number_of_layers() {
            if g.layers[l].fixed {
                continue;
            }
            let mut score = 0;
            if l > 0 {
                score += self.channels[l - 1];
            }
            if l < self.channels.len() {
                score += self.channels[l];
            }
            if best.map_or(true, |(_, c)| score > c) {
                best = Some((l, score));
            }
        }
        best.map(|(l, _)| l)
    }
}

/// Crossings between the edges of `left` and the edges of `right`, with
/// `left` taken to be immediately left of `right` on their shared layer.
/// Independent of the two nodes' actual positions, so it can price both
/// orientations of a swap.
pub fn node_crossings(g: &LayeredGraph, left: usize, right: usize) -> u64 {
    let mut total = 0;
    for &e1 in &g.nodes[left].up_edges {
        let p1 = g.nodes[g.edges[e1].up].position;
        for &e2 in &g.nodes[right].up_edges {
            if p1 > g.nodes[g.edges[e2].up].position {
                total += 1;
            }
        }
    }
    for &e1 in &g.nodes[left].down_edges {
        let p1 = g.nodes[g.edges[e1].down].position;
        for &e2 in &g.nodes[right].down_edges {
            if p1 > g.nodes[g.edges[e2].down].position {
                total += 1;
            }
        }
    }
    total
}

/// For every candidate position `p` in `left..=right` on `node`'s layer,
/// the change in total crossings if `node` were inserted at `p`
/// (`delta[p - left]`, zero at the current position).
///
/// One pairwise pre-pass against the other nodes of the layer, then two
/// prefix-sum walks; candidates are never re-evaluated from scratch.
pub fn crossings_around(g: &LayeredGraph, node: usize, left: usize, right: usize) -> Vec<i64> {
    let layer = g.nodes[node].layer;
    let cur = g.nodes[node].position;
    assert!(left <= cur && cur <= right && right < g.layers[layer].len());

    let width = right - left + 1;
    // diff[q] = cost of being left of the node at position q minus the cost
    // of being right of it.
    let mut diff = vec![0i64; width];
    for q in left..=right {
        if q == cur {
            continue;
        }
        let y = g.node_at(layer, q);
        diff[q - left] =
            node_crossings(g, node, y) as i64 - node_crossings(g, y, node) as i64;
    }

    let mut deltas = vec![0i64; width];
    let mut acc = 0;
    for p in (left..cur).rev() {
        acc += diff[p - left];
        deltas[p - left] = acc;
    }
    acc = 0;
    for p in (cur + 1)..=right {
        acc -= diff[p - left];
        deltas[p - left] = acc;
    }
    deltas
}

/// Like [`crossings_around`], but tracks the bottleneck among the edges
/// incident on `node`: for every candidate position the result holds the
/// maximum crossings any such edge would bear, plus the total-crossings
/// delta as a tie-breaker. `edge` anchors the call and must be incident on
/// `node`. Assumes the per-edge counts are fresh.
pub fn edge_crossings_around(
    g: &LayeredGraph,
    edge: usize,
    node: usize,
    left: usize,
    right: usize,
) -> Vec<(u64, i64)> {
    assert!(
        g.edges[edge].down == node || g.edges[edge].up == node,
        "edge {edge} is not incident on node '{}'",
        g.nodes[node].name,
    );
    let layer = g.nodes[node].layer;
    let cur = g.nodes[node].position;
    assert!(left <= cur && cur <= right && right < g.layers[layer].len());

    let incident: Vec<usize> = g.nodes[node]
        .down_edges
        .iter()
        .chain(g.nodes[node].up_edges.iter())
        .copied()
        .collect();
    let base: Vec<i64> = incident.iter().map(|&e| g.edges[e].crossings as i64).collect();

    let mut out = vec![(0u64, 0i64); right - left + 1];
    out[cur - left] = (base.iter().copied().max().unwrap_or(0) as u64, 0);

    let mut counts = base.clone();
    let mut total = 0i64;
    for p in (left..cur).rev() {
        // stepping left past the node that originally sits at position p
        let y = g.node_at(layer, p);
        for (slot, &e) in incident.iter().enumerate() {
            let step = pair_step(g, e, y, g.edges[e].down == node, true);
            counts[slot] += step;
            total += step;
        }
        let max = counts.iter().copied().max().unwrap_or(0).max(0) as u64;
        out[p - left] = (max, total);
    }

    counts = base.clone();
    total = 0;
    for p in (cur + 1)..=right {
        let y = g.node_at(layer, p);
        for (slot, &e) in incident.iter().enumerate() {
            let step = pair_step(g, e, y, g.edges[e].down == node, false);
            counts[slot] += step;
            total += step;
        }
        let max = counts.iter().copied().max().unwrap_or(0).max(0) as u64;
        out[p - left] = (max, total);
    }
    out
}

/// Net change in crossings between edge `e` of the sifted node and the
/// same-side edges of `y` when the node steps past `y`. `up_side` selects
/// the channel `e` lives in (true when `e` leaves the node upward).
fn pair_step(g: &LayeredGraph, e: usize, y: usize, up_side: bool, moving_left: bool) -> i64 {
    let pe = if up_side {
        g.nodes[g.edges[e].up].position
    } else {
        g.nodes[g.edges[e].down].position
    };
    let others = if up_side {
        &g.nodes[y].up_edges
    } else {
        &g.nodes[y].down_edges
    };
    let mut step = 0;
    for &f in others {
        let pf = if up_side {
            g.nodes[g.edges[f].up].position
        } else {
            g.nodes[g.edges[f].down].position
        };
        // after the step the pair is inverted iff the endpoint of the node
        // now on the left sits at the higher position
        let (gain, loss) = if moving_left {
            (pe > pf, pf > pe)
        } else {
            (pf > pe, pe > pf)
        };
        step += gain as i64 - loss as i64;
    }
    step
}

/// One channel's inversion count, charging each crossing to both edges.
fn count_channel(g: &mut LayeredGraph, c: usize) -> u64 {
    let mut seq: Vec<(usize, usize)> = Vec::new();
    for p in 0..g.layers[c].len() {
        let ix = g.node_at(c, p);
        for &e in &g.nodes[ix].up_edges {
            seq.push((e, g.nodes[g.edges[e].up].position));
        }
    }
    let mut count = 0;
    for i in 1..seq.len() {
        let mut j = i;
        while j > 0 && seq[j - 1].1 > seq[j].1 {
            g.edges[seq[j - 1].0].crossings += 1;
            g.edges[seq[j].0].crossings += 1;
            count += 1;
            seq.swap(j - 1, j);
            j -= 1;
        }
    }
    count
}

fn refresh_node_sums(g: &mut LayeredGraph, ix: usize) {
    let up: u64 = g.nodes[ix]
        .up_edges
        .iter()
        .map(|&e| g.edges[e].crossings)
        .sum();
    let down: u64 = g.nodes[ix]
        .down_edges
        .iter()
        .map(|&e| g.edges[e].crossings)
        .sum();
    g.nodes[ix].up_crossings = up;
    g.nodes[ix].down_crossings = down;
}

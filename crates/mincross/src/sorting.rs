//! Weight assignment and stable layer sorting: the machinery behind the
//! barycenter/median sweeps and the dfs/bfs/mds preprocessors.

use crate::graph::LayeredGraph;
use std::collections::VecDeque;

/// Which neighbors contribute to a node's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Upward,
    Downward,
    Both,
}

/// What to do with a node that has no neighbors in the chosen orientation.
///
/// `Left` (the default) hands the node its left neighbor's weight so it
/// travels with it through the sort; `Avg` averages the nearest weighted
/// neighbors on both sides; `None` pins the node to its current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightCarry {
    None,
    #[default]
    Left,
    Avg,
}

/// Stably sorts `layer` by ascending `weight` and renumbers positions.
/// Nodes of equal weight keep their relative order.
pub fn layer_sort(g: &mut LayeredGraph, layer: usize) {
    let mut order = g.layers[layer].nodes.clone();
    order.sort_by(|&a, &b| g.nodes[a].weight.total_cmp(&g.nodes[b].weight));
    for (p, &ix) in order.iter().enumerate() {
        g.nodes[ix].position = p;
    }
    g.layers[layer].nodes = order;
}

/// Assigns barycenter weights (mean neighbor position) on `layer`.
///
/// With `Orientation::Both`, `balanced` averages the two directed means;
/// otherwise every neighbor position is pooled and divided by the total
/// degree.
pub fn barycenter_weights(
    g: &mut LayeredGraph,
    layer: usize,
    orientation: Orientation,
    balanced: bool,
    carry: WeightCarry,
) {
    let raw: Vec<Option<f64>> = g.layers[layer]
        .nodes
        .iter()
        .map(|&ix| {
            let node = &g.nodes[ix];
            let up_sum: f64 = node
                .up_edges
                .iter()
                .map(|&e| g.nodes[g.edges[e].up].position as f64)
                .sum();
            let down_sum: f64 = node
                .down_edges
                .iter()
                .map(|&e| g.nodes[g.edges[e].down].position as f64)
                .sum();
            let up = (!node.up_edges.is_empty()).then(|| up_sum / node.up_degree() as f64);
            let down = (!node.down_edges.is_empty()).then(|| down_sum / node.down_degree() as f64);
            match orientation {
                Orientation::Upward => up,
                Orientation::Downward => down,
                Orientation::Both => match (up, down, balanced) {
                    (None, None, _) => None,
                    (_, _, true) => {
                        let values: Vec<f64> = [up, down].into_iter().flatten().collect();
                        Some(values.iter().sum::<f64>() / values.len() as f64)
                    }
                    (_, _, false) => {
                        Some((up_sum + down_sum) / node.degree() as f64)
                    }
                },
            }
        })
        .collect();
    apply_weights(g, layer, &raw, carry);
}

/// Assigns median weights on `layer`. An even neighbor count picks
/// whichever middle position lies closer to the node's current one, the
/// lower on an exact tie.
pub fn median_weights(
    g: &mut LayeredGraph,
    layer: usize,
    orientation: Orientation,
    carry: WeightCarry,
) {
    let raw: Vec<Option<f64>> = g.layers[layer]
        .nodes
        .iter()
        .map(|&ix| {
            let node = &g.nodes[ix];
            let mut positions: Vec<usize> = Vec::new();
            if orientation != Orientation::Downward {
                positions.extend(
                    node.up_edges
                        .iter()
                        .map(|&e| g.nodes[g.edges[e].up].position),
                );
            }
            if orientation != Orientation::Upward {
                positions.extend(
                    node.down_edges
                        .iter()
                        .map(|&e| g.nodes[g.edges[e].down].position),
                );
            }
            if positions.is_empty() {
                return None;
            }
            positions.sort_unstable();
            let n = positions.len();
            let value = if n % 2 == 1 {
                positions[n / 2]
            } else {
                let lo = positions[n / 2 - 1];
                let hi = positions[n / 2];
                let here = node.position;
                if lo.abs_diff(here) <= hi.abs_diff(here) {
                    lo
                } else {
                    hi
                }
            };
            Some(value as f64)
        })
        .collect();
    apply_weights(g, layer, &raw, carry);
}

/// Writes `raw` weights onto the layer, filling the gaps of weightless
/// nodes according to `carry`. Total and deterministic for every input.
fn apply_weights(g: &mut LayeredGraph, layer: usize, raw: &[Option<f64>], carry: WeightCarry) {
    let n = raw.len();
    match carry {
        WeightCarry::None => {
            for p in 0..n {
                let ix = g.node_at(layer, p);
                g.nodes[ix].weight = raw[p].unwrap_or(p as f64);
            }
        }
        WeightCarry::Left => {
            let mut carried: Option<f64> = None;
            for p in 0..n {
                let ix = g.node_at(layer, p);
                if let Some(w) = raw[p] {
                    carried = Some(w);
                }
                g.nodes[ix].weight = raw[p].or(carried).unwrap_or(p as f64);
            }
        }
        WeightCarry::Avg => {
            let mut left: Vec<Option<f64>> = vec![None; n];
            let mut carried = None;
            for p in 0..n {
                if raw[p].is_some() {
                    carried = raw[p];
                }
                left[p] = carried;
            }
            carried = None;
            for p in (0..n).rev() {
                if raw[p].is_some() {
                    carried = raw[p];
                }
                let ix = g.node_at(layer, p);
                g.nodes[ix].weight = match raw[p] {
                    Some(w) => w,
                    None => match (left[p], carried) {
                        (Some(a), Some(b)) => (a + b) / 2.0,
                        (Some(a), None) => a,
                        (None, Some(b)) => b,
                        (None, None) => p as f64,
                    },
                };
            }
        }
    }
}

/// Numbers every node in depth-first preorder, rooted at the layer-0 nodes
/// in ascending id order, and stores the number as the node's weight.
/// Unreached components are picked up afterwards in ascending id order.
pub fn assign_dfs_weights(g: &mut LayeredGraph) {
    for node in &mut g.nodes {
        node.marked = false;
        node.preorder_number = None;
    }
    let mut counter = 0;
    for root in traversal_roots(g) {
        if g.nodes[root].marked {
            continue;
        }
        let mut stack = vec![root];
        while let Some(ix) = stack.pop() {
            if g.nodes[ix].marked {
                continue;
            }
            g.nodes[ix].marked = true;
            g.nodes[ix].preorder_number = Some(counter);
            counter += 1;
            let mut neighbors: Vec<usize> = g.nodes[ix]
                .up_edges
                .iter()
                .map(|&e| g.edges[e].up)
                .chain(g.nodes[ix].down_edges.iter().map(|&e| g.edges[e].down))
                .filter(|&w| !g.nodes[w].marked)
                .collect();
            neighbors.reverse();
            stack.extend(neighbors);
        }
    }
    for node in &mut g.nodes {
        node.weight = node.preorder_number.unwrap_or(0) as f64;
    }
}

/// Breadth-first counterpart of [`assign_dfs_weights`].
pub fn assign_bfs_weights(g: &mut LayeredGraph) {
    for node in &mut g.nodes {
        node.marked = false;
        node.preorder_number = None;
    }
    let mut counter = 0;
    let mut queue = VecDeque::new();
    for root in traversal_roots(g) {
        if g.nodes[root].marked {
            continue;
        }
        g.nodes[root].marked = true;
        queue.push_back(root);
        while let Some(ix) = queue.pop_front() {
            g.nodes[ix].preorder_number = Some(counter);
            counter += 1;
            let neighbors: Vec<usize> = g.nodes[ix]
                .up_edges
                .iter()
                .map(|&e| g.edges[e].up)
                .chain(g.nodes[ix].down_edges.iter().map(|&e| g.edges[e].down))
                .collect();
            for w in neighbors {
                if !g.nodes[w].marked {
                    g.nodes[w].marked = true;
                    queue.push_back(w);
                }
            }
        }
    }
    for node in &mut g.nodes {
        node.weight = node.preorder_number.unwrap_or(0) as f64;
    }
}

/// Layer-0 nodes in ascending id order, then everything else in ascending
/// id order, so disconnected pieces always get numbered.
fn traversal_roots(g: &LayeredGraph) -> Vec<usize> {
    let mut roots: Vec<usize> = match g.layers.first() {
        Some(layer) => layer.nodes.clone(),
        None => Vec::new(),
    };
    roots.sort_by_key(|&ix| g.nodes[ix].id);
    let mut rest: Vec<usize> = (0..g.nodes.len())
        .filter(|ix| g.nodes[*ix].layer != 0)
        .collect();
    rest.sort_by_key(|&ix| g.nodes[ix].id);
    roots.extend(rest);
    roots
}

/// The `mds` preprocessor step for one layer: sort by degree, then
/// re-weight so the highest-degree node lands in the middle and degrees
/// fall off toward both rims.
pub fn middle_degree_sort(g: &mut LayeredGraph, layer: usize) {
    for p in 0..g.layers[layer].len() {
        let ix = g.node_at(layer, p);
        g.nodes[ix].weight = g.nodes[ix].degree() as f64;
    }
    layer_sort(g, layer);
    let n = g.layers[layer].len();
    for p in 0..n {
        let ix = g.node_at(layer, p);
        let from_last = n - p - 1;
        let half = (n / 2) as f64;
        g.nodes[ix].weight = if from_last % 2 == 0 {
            half - from_last as f64
        } else {
            half + from_last as f64
        };
    }
    layer_sort(g, layer);
}

/// Stable ascending degree sort of a working node list; ties keep their
/// existing order, which is what lets a shuffled list break them
/// differently.
pub fn sort_by_degree(g: &LayeredGraph, order: &mut [usize]) {
    order.sort_by_key(|&ix| g.nodes[ix].degree());
}

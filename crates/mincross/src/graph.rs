//! The layered-graph store: nodes, edges, layers, positions, adjacency.
//!
//! Nodes and edges live in flat arrays and refer to each other by index, so
//! adjacency lists are plain `Vec<usize>` and never invalidate. The readers
//! in [`crate::sgf`] and [`crate::graph_io`] are the only places elements are
//! created; the heuristics only permute positions and touch scratch fields.

/// A vertex of the layered graph.
///
/// `layer` and `position` locate the node; everything below `weight` is
/// scratch space for individual heuristics and carries no meaning between
/// passes.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub id: usize,
    pub layer: usize,
    pub position: usize,
    /// Edges to the layer above, in creation order.
    pub up_edges: Vec<usize>,
    /// Edges to the layer below, in creation order.
    pub down_edges: Vec<usize>,

    pub weight: f64,
    pub fixed: bool,
    pub marked: bool,
    pub preorder_number: Option<usize>,
    pub up_crossings: u64,
    pub down_crossings: u64,
}

impl Node {
    pub fn up_degree(&self) -> usize {
        self.up_edges.len()
    }

    pub fn down_degree(&self) -> usize {
        self.down_edges.len()
    }

    pub fn degree(&self) -> usize {
        self.up_edges.len() + self.down_edges.len()
    }

    pub fn crossings(&self) -> u64 {
        self.up_crossings + self.down_crossings
    }

    pub fn is_isolated(&self) -> bool {
        self.up_edges.is_empty() && self.down_edges.is_empty()
    }
}

/// An edge between adjacent layers; `up.layer == down.layer + 1` always.
#[derive(Debug, Clone)]
pub struct Edge {
    pub down: usize,
    pub up: usize,
    pub crossings: u64,
    pub fixed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Layer {
    /// Node indices sorted by `position`; `nodes[i].position == i` always.
    pub nodes: Vec<usize>,
    pub fixed: bool,
}

impl Layer {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A permutation of the whole graph: node indices in layer-major,
/// position-major order. Written and replayed by the objective tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSnapshot {
    order: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct LayeredGraph {
    pub name: String,
    /// Free-form comment lines, propagated verbatim to every output file.
    pub comments: Vec<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub layers: Vec<Layer>,
}

impl LayeredGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn number_of_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn number_of_isolated_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_isolated()).count()
    }

    /// Grows the layer list so `layer` is a valid index.
    pub fn ensure_layer(&mut self, layer: usize) {
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, Layer::default);
        }
    }

    /// Creates a node at the end of the given layer and returns its index.
    pub fn add_node(&mut self, name: impl Into<String>, id: usize, layer: usize) -> usize {
        self.ensure_layer(layer);
        let index = self.nodes.len();
        let position = self.layers[layer].nodes.len();
        self.nodes.push(Node {
            name: name.into(),
            id,
            layer,
            position,
            up_edges: Vec::new(),
            down_edges: Vec::new(),
            weight: 0.0,
            fixed: false,
            marked: false,
            preorder_number: None,
            up_crossings: 0,
            down_crossings: 0,
        });
        self.layers[layer].nodes.push(index);
        index
    }

    /// Creates an edge from `down` to `up` and wires both adjacency lists.
    ///
    /// Layer adjacency is the caller's (i.e. the parsers') responsibility;
    /// a violation here is a programming error.
    pub fn add_edge(&mut self, down: usize, up: usize) -> usize {
        assert_eq!(
            self.nodes[down].layer + 1,
            self.nodes[up].layer,
            "edge {} -> {} does not connect adjacent layers",
            self.nodes[down].name,
            self.nodes[up].name,
        );
        let index = self.edges.len();
        self.edges.push(Edge {
            down,
            up,
            crossings: 0,
            fixed: false,
        });
        self.nodes[down].up_edges.push(index);
        self.nodes[up].down_edges.push(index);
        index
    }

    /// The node at `position` on `layer`.
    pub fn node_at(&self, layer: usize, position: usize) -> usize {
        self.layers[layer].nodes[position]
    }

    /// Exchanges the nodes at positions `i` and `j` of `layer`.
    pub fn swap_positions(&mut self, layer: usize, i: usize, j: usize) {
        let layer_nodes = &mut self.layers[layer].nodes;
        layer_nodes.swap(i, j);
        let a = layer_nodes[i];
        let b = layer_nodes[j];
        self.nodes[a].position = i;
        self.nodes[b].position = j;
    }

    /// Moves `node` to `new_position` on its layer, shifting the nodes in
    /// between by one. Position/index identity holds again on return.
    pub fn reposition_node(&mut self, node: usize, new_position: usize) {
        let layer = self.nodes[node].layer;
        let current = self.nodes[node].position;
        assert!(
            new_position < self.layers[layer].len(),
            "position {new_position} out of range on layer {layer}",
        );
        if new_position == current {
            return;
        }
        let layer_nodes = &mut self.layers[layer].nodes;
        debug_assert_eq!(layer_nodes[current], node);
        layer_nodes.remove(current);
        layer_nodes.insert(new_position, node);
        let (lo, hi) = if current < new_position {
            (current, new_position)
        } else {
            (new_position, current)
        };
        for p in lo..=hi {
            let ix = self.layers[layer].nodes[p];
            self.nodes[ix].position = p;
        }
    }

    /// Captures the current permutation of every layer.
    pub fn save_order(&self) -> OrderSnapshot {
        let mut order = Vec::with_capacity(self.nodes.len());
        for layer in &self.layers {
            order.extend_from_slice(&layer.nodes);
        }
        OrderSnapshot { order }
    }

    /// Replays a snapshot taken on this graph, restoring every `position`
    /// and layer sequence exactly.
    pub fn restore_order(&mut self, snapshot: &OrderSnapshot) {
        assert_eq!(
            snapshot.order.len(),
            self.nodes.len(),
            "snapshot does not match this graph",
        );
        let mut cursor = 0;
        for l in 0..self.layers.len() {
            let len = self.layers[l].nodes.len();
            for p in 0..len {
                let ix = snapshot.order[cursor];
                cursor += 1;
                assert_eq!(
                    self.nodes[ix].layer, l,
                    "snapshot places node '{}' on the wrong layer",
                    self.nodes[ix].name,
                );
                self.layers[l].nodes[p] = ix;
                self.nodes[ix].position = p;
            }
        }
    }

    pub fn clear_fixed_nodes(&mut self) {
        for node in &mut self.nodes {
            node.fixed = false;
        }
    }

    pub fn clear_fixed_edges(&mut self) {
        for edge in &mut self.edges {
            edge.fixed = false;
        }
    }

    pub fn clear_fixed_layers(&mut self) {
        for layer in &mut self.layers {
            layer.fixed = false;
        }
    }

    pub fn all_nodes_fixed(&self) -> bool {
        self.nodes.iter().all(|n| n.fixed)
    }

    /// Checks the structural invariants; panics with a diagnostic on the
    /// first violation. Cheap enough to call from tests after every
    /// mutation.
    pub fn assert_consistent(&self) {
        for (l, layer) in self.layers.iter().enumerate() {
            for (p, &ix) in layer.nodes.iter().enumerate() {
                let node = &self.nodes[ix];
                assert_eq!(node.layer, l, "node '{}' on wrong layer list", node.name);
                assert_eq!(
                    node.position, p,
                    "node '{}' position disagrees with its index",
                    node.name,
                );
            }
        }
        for (e, edge) in self.edges.iter().enumerate() {
            assert_eq!(
                self.nodes[edge.down].layer + 1,
                self.nodes[edge.up].layer,
                "edge {e} does not connect adjacent layers",
            );
            let down_lists = self.nodes[edge.down]
                .up_edges
                .iter()
                .filter(|&&x| x == e)
                .count();
            let up_lists = self.nodes[edge.up]
                .down_edges
                .iter()
                .filter(|&&x| x == e)
                .count();
            assert_eq!(down_lists, 1, "edge {e} missing from down endpoint");
            assert_eq!(up_lists, 1, "edge {e} missing from up endpoint");
        }
    }
}

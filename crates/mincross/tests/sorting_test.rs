use mincross::graph::LayeredGraph;
use mincross::sgf::read_sgf;
use mincross::sorting::{
    self, assign_bfs_weights, assign_dfs_weights, barycenter_weights, layer_sort, median_weights,
    Orientation, WeightCarry,
};

fn graph(input: &str) -> LayeredGraph {
    read_sgf(input).expect("fixture parses").graph
}

/// Two layers of four; the edges form a perfect shuffle.
const SHUFFLE: &str = "\
t shuffle 8 4 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 0 3
n 5 1 0
n 6 1 1
n 7 1 2
n 8 1 3
e 1 8
e 2 7
e 3 6
e 4 5
";

fn weights_on_layer(g: &LayeredGraph, layer: usize) -> Vec<f64> {
    g.layers[layer]
        .nodes
        .iter()
        .map(|&ix| g.nodes[ix].weight)
        .collect()
}

fn names_on_layer(g: &LayeredGraph, layer: usize) -> Vec<String> {
    g.layers[layer]
        .nodes
        .iter()
        .map(|&ix| g.nodes[ix].name.clone())
        .collect()
}

#[test]
fn barycenter_weights_follow_downward_neighbors() {
    let mut g = graph(SHUFFLE);
    barycenter_weights(&mut g, 1, Orientation::Downward, false, WeightCarry::Left);
    assert_eq!(weights_on_layer(&g, 1), vec![3.0, 2.0, 1.0, 0.0]);
    layer_sort(&mut g, 1);
    assert_eq!(names_on_layer(&g, 1), vec!["8", "7", "6", "5"]);
    for (p, &ix) in g.layers[1].nodes.iter().enumerate() {
        assert_eq!(g.nodes[ix].position, p);
    }
}

#[test]
fn layer_sort_is_stable_for_equal_weights() {
    let mut g = graph(SHUFFLE);
    for &ix in &g.layers[0].nodes.clone() {
        g.nodes[ix].weight = 1.0;
    }
    layer_sort(&mut g, 0);
    assert_eq!(names_on_layer(&g, 0), vec!["1", "2", "3", "4"]);
}

/// A three-node upper layer where only the outer nodes have neighbors.
const GAP: &str = "\
t gap 5 2 2
n 1 0 0
n 2 0 1
n 10 1 0
n 11 1 1
n 12 1 2
e 1 10
e 2 12
";

#[test]
fn carry_left_hands_isolated_nodes_their_left_neighbors_weight() {
    let mut g = graph(GAP);
    barycenter_weights(&mut g, 1, Orientation::Downward, false, WeightCarry::Left);
    assert_eq!(weights_on_layer(&g, 1), vec![0.0, 0.0, 1.0]);
}

#[test]
fn carry_avg_averages_the_nearest_weighted_neighbors() {
    let mut g = graph(GAP);
    barycenter_weights(&mut g, 1, Orientation::Downward, false, WeightCarry::Avg);
    assert_eq!(weights_on_layer(&g, 1), vec![0.0, 0.5, 1.0]);
}

#[test]
fn carry_none_keeps_isolated_nodes_in_place() {
    let mut g = graph(GAP);
    barycenter_weights(&mut g, 1, Orientation::Downward, false, WeightCarry::None);
    assert_eq!(weights_on_layer(&g, 1), vec![0.0, 1.0, 1.0]);
}

/// One upper node over four lower nodes, neighbors at positions 0 and 3.
const EVEN_MEDIAN: &str = "\
t even 5 2 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 0 3
n 5 1 0
e 1 5
e 4 5
";

#[test]
fn even_median_prefers_the_closer_middle() {
    let mut g = graph(EVEN_MEDIAN);
    median_weights(&mut g, 1, Orientation::Downward, WeightCarry::Left);
    // node 5 sits at position 0; the lower middle (0) is closer than 3
    assert_eq!(weights_on_layer(&g, 1), vec![0.0]);
}

/// Path across five layers, one node per layer.
const PATH: &str = "\
t path 5 4 5
n 1 0 0
n 2 1 0
n 3 2 0
n 4 3 0
n 5 4 0
e 1 2
e 2 3
e 3 4
e 4 5
";

#[test]
fn dfs_preorder_numbers_follow_the_path() {
    let mut g = graph(PATH);
    assign_dfs_weights(&mut g);
    let weights: Vec<f64> = g.nodes.iter().map(|n| n.weight).collect();
    assert_eq!(weights, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn bfs_numbers_follow_the_path() {
    let mut g = graph(PATH);
    assign_bfs_weights(&mut g);
    let weights: Vec<f64> = g.nodes.iter().map(|n| n.weight).collect();
    assert_eq!(weights, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn middle_degree_sort_puts_the_heaviest_node_in_the_middle() {
    // node 2 has degree three, its layer mates degree one
    let input = "\
t star 6 5 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 1 0
n 5 1 1
n 6 1 2
e 1 4
e 2 4
e 2 5
e 2 6
e 3 6
";
    let mut g = graph(input);
    sorting::middle_degree_sort(&mut g, 0);
    assert_eq!(names_on_layer(&g, 0), vec!["1", "2", "3"]);
    let middle = g.node_at(0, 1);
    assert_eq!(g.nodes[middle].degree(), 3);
}

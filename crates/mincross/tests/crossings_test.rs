use mincross::crossings::{self, CrossingCounter};
use mincross::graph::LayeredGraph;
use mincross::sgf::read_sgf;

fn graph(input: &str) -> LayeredGraph {
    read_sgf(input).expect("fixture parses").graph
}

/// Two layers; edges a-y, b-x, b-y, c-x give three crossings.
const SMALL: &str = "\
t small 5 4 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 1 0
n 5 1 1
e 1 5
e 2 4
e 2 5
e 3 4
";

const K33: &str = "\
t k33 6 9 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 1 0
n 5 1 1
n 6 1 2
e 1 4
e 1 5
e 1 6
e 2 4
e 2 5
e 2 6
e 3 4
e 3 5
e 3 6
";

fn assert_counters_consistent(g: &LayeredGraph, counter: &CrossingCounter) {
    let per_edge: u64 = g.edges.iter().map(|e| e.crossings).sum();
    assert_eq!(per_edge, 2 * counter.total(), "per-edge counts sum to 2x total");
    let channels: u64 = (0..g.number_of_layers().saturating_sub(1))
        .map(|c| counter.channel(c))
        .sum();
    assert_eq!(channels, counter.total());
    for (ix, node) in g.nodes.iter().enumerate() {
        let up: u64 = node.up_edges.iter().map(|&e| g.edges[e].crossings).sum();
        let down: u64 = node.down_edges.iter().map(|&e| g.edges[e].crossings).sum();
        assert_eq!(node.up_crossings, up, "up sum of node {ix}");
        assert_eq!(node.down_crossings, down, "down sum of node {ix}");
    }
}

#[test]
fn counts_a_small_channel() {
    let mut g = graph(SMALL);
    let counter = CrossingCounter::new(&mut g);
    assert_eq!(counter.total(), 3);
    assert_eq!(counter.channel(0), 3);
    // a-y and c-x each cross two edges, b-x and b-y one each
    let per_edge: Vec<u64> = g.edges.iter().map(|e| e.crossings).collect();
    assert_eq!(per_edge, vec![2, 1, 1, 2]);
    assert_counters_consistent(&g, &counter);
}

#[test]
fn any_ordering_of_k33_has_nine_crossings() {
    let mut g = graph(K33);
    let mut counter = CrossingCounter::new(&mut g);
    assert_eq!(counter.total(), 9);
    g.swap_positions(0, 0, 2);
    g.swap_positions(1, 0, 1);
    counter.full_recount(&mut g);
    assert_eq!(counter.total(), 9);
}

#[test]
fn incremental_recount_matches_full_recount() {
    let mut g = graph(SMALL);
    let mut counter = CrossingCounter::new(&mut g);

    g.swap_positions(0, 0, 1);
    counter.recount_channel(&mut g, 0);
    let incremental = counter.total();
    let edge_counts: Vec<u64> = g.edges.iter().map(|e| e.crossings).collect();

    counter.full_recount(&mut g);
    assert_eq!(counter.total(), incremental);
    let full_counts: Vec<u64> = g.edges.iter().map(|e| e.crossings).collect();
    assert_eq!(edge_counts, full_counts);
    assert_counters_consistent(&g, &counter);

    g.reposition_node(2, 0);
    counter.recount_channel(&mut g, 0);
    let incremental = counter.total();
    counter.full_recount(&mut g);
    assert_eq!(counter.total(), incremental);
    assert_counters_consistent(&g, &counter);
}

#[test]
fn crossings_if_swapped_is_pure_and_correct() {
    let mut g = graph(SMALL);
    let mut counter = CrossingCounter::new(&mut g);

    let a = g.node_at(0, 0);
    let b = g.node_at(0, 1);
    let before = g.save_order();
    let predicted = counter.crossings_if_swapped(&g, a, b);
    assert_eq!(g.save_order(), before, "prediction must not mutate");

    g.swap_positions(0, 0, 1);
    counter.recount_channel(&mut g, 0);
    assert_eq!(counter.total(), predicted);
    assert_eq!(predicted, 2);
}

#[test]
fn crossings_around_prices_every_insertion_point() {
    let mut g = graph(SMALL);
    let counter = CrossingCounter::new(&mut g);
    let b = g.node_at(0, 1);

    let deltas = crossings::crossings_around(&g, b, 0, 2);
    assert_eq!(deltas[1], 0, "current position is the baseline");

    let baseline = counter.total() as i64;
    for target in 0..3 {
        let mut h = graph(SMALL);
        let mut hc = CrossingCounter::new(&mut h);
        h.reposition_node(b, target);
        hc.full_recount(&mut h);
        assert_eq!(
            hc.total() as i64,
            baseline + deltas[target],
            "delta at position {target}",
        );
    }
}

#[test]
fn edge_crossings_around_tracks_the_incident_bottleneck() {
    let mut g = graph(SMALL);
    let _counter = CrossingCounter::new(&mut g);
    let b = g.node_at(0, 1);
    let edge = g.nodes[b].up_edges[0];

    let options = crossings::edge_crossings_around(&g, edge, b, 0, 2);
    for (target, &(max, delta)) in options.iter().enumerate() {
        let mut h = graph(SMALL);
        let mut hc = CrossingCounter::new(&mut h);
        let baseline = hc.total() as i64;
        h.reposition_node(b, target);
        hc.full_recount(&mut h);
        let incident_max = h.nodes[b]
            .up_edges
            .iter()
            .chain(h.nodes[b].down_edges.iter())
            .map(|&e| h.edges[e].crossings)
            .max()
            .unwrap();
        assert_eq!(max, incident_max, "bottleneck at position {target}");
        assert_eq!(delta, hc.total() as i64 - baseline, "delta at {target}");
    }
}

#[test]
fn max_reporters_respect_fixed_flags_and_ties() {
    let mut g = graph(SMALL);
    let counter = CrossingCounter::new(&mut g);

    // a-y (edge 0) and c-x (edge 3) tie at two crossings
    assert_eq!(counter.max_crossings_edge(&g), Some(0));
    g.edges[0].fixed = true;
    assert_eq!(counter.max_crossings_edge(&g), Some(3));

    // x and y tie at three incident crossings; x has the smaller index
    assert_eq!(counter.max_crossings_node(&g), Some(3));
    g.nodes[3].fixed = true;
    assert_eq!(counter.max_crossings_node(&g), Some(4));

    assert_eq!(counter.max_crossings_layer(&g), Some(0));
    g.layers[0].fixed = true;
    assert_eq!(counter.max_crossings_layer(&g), Some(1));
    g.layers[1].fixed = true;
    assert_eq!(counter.max_crossings_layer(&g), None);
}

use mincross::graph::LayeredGraph;
use mincross::sgf::read_sgf;
use mincross::stretch::{bottleneck_stretch, edge_stretch, max_stretch_edge, total_stretch};

fn graph(input: &str) -> LayeredGraph {
    read_sgf(input).expect("fixture parses").graph
}

const WIDE: &str = "\
t wide 6 3 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 1 0
n 5 1 1
n 6 1 2
e 1 4
e 1 6
e 3 5
";

#[test]
fn stretch_is_the_normalized_position_distance() {
    let g = graph(WIDE);
    assert_eq!(edge_stretch(&g, 0), 0.0);
    assert!((edge_stretch(&g, 1) - 1.0).abs() < 1e-12);
    assert!((edge_stretch(&g, 2) - 0.5).abs() < 1e-12);
    assert!((total_stretch(&g) - 1.5).abs() < 1e-12);
    assert!((bottleneck_stretch(&g) - 1.0).abs() < 1e-12);
}

#[test]
fn max_stretch_edge_skips_fixed_edges() {
    let mut g = graph(WIDE);
    assert_eq!(max_stretch_edge(&g), Some(1));
    g.edges[1].fixed = true;
    assert_eq!(max_stretch_edge(&g), Some(2));
    g.edges[0].fixed = true;
    g.edges[2].fixed = true;
    assert_eq!(max_stretch_edge(&g), None);
}

#[test]
fn tiny_layers_have_zero_stretch() {
    let input = "\
t tiny 3 2 3
n 1 0 0
n 2 1 0
n 3 2 0
e 1 2
e 2 3
";
    let g = graph(input);
    assert_eq!(total_stretch(&g), 0.0);
    assert_eq!(bottleneck_stretch(&g), 0.0);
}

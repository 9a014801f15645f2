use mincross::dot::{read_dot, write_dot};
use mincross::error::Error;
use mincross::graph_io::read_dot_and_ord;
use mincross::ord::{read_ord, write_ord};

const DOT: &str = "\
/* hand-made fixture */
digraph tangle {
    a -> x;
    a -> y; // crosses b
    b -> x;
    c -> \"y\";
}
";

const ORD: &str = "\
# Ordering for graph tangle
0 {
  a b c
}
1 {
  x y
}
";

#[test]
fn reads_the_paired_inputs() {
    let g = read_dot_and_ord(DOT, ORD).expect("parses");
    assert_eq!(g.name, "tangle");
    assert_eq!(g.number_of_nodes(), 5);
    assert_eq!(g.number_of_edges(), 4);
    assert_eq!(g.number_of_layers(), 2);
    g.assert_consistent();

    // ord appearance order defines ids and positions
    let names: Vec<&str> = g.layers[0]
        .nodes
        .iter()
        .map(|&ix| g.nodes[ix].name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(g.nodes[0].id, 0);
}

#[test]
fn ord_round_trips_with_the_original_dot() {
    let g = read_dot_and_ord(DOT, ORD).expect("parses");
    let ord_text = write_ord(&g);
    let again = read_dot_and_ord(DOT, &ord_text).expect("reparses");
    assert_eq!(write_ord(&again), ord_text);
    assert_eq!(again.number_of_edges(), g.number_of_edges());
}

#[test]
fn dot_round_trips_through_the_writer() {
    let g = read_dot_and_ord(DOT, ORD).expect("parses");
    let dot_text = write_dot(&g);
    let reread = read_dot(&dot_text).expect("reparses");
    assert_eq!(reread.name, "tangle");
    assert_eq!(reread.edges.len(), 4);
    let again = read_dot_and_ord(&dot_text, ORD).expect("rebuilds");
    assert_eq!(again.number_of_edges(), g.number_of_edges());
}

#[test]
fn ord_reader_reports_the_graph_name_and_layers() {
    let read = read_ord(ORD).expect("parses");
    assert_eq!(read.graph_name.as_deref(), Some("tangle"));
    assert_eq!(read.layers.len(), 2);
    assert_eq!(read.layers[0], vec!["a", "b", "c"]);
}

#[test]
fn edge_endpoints_must_exist_in_the_ord_file() {
    let dot = "digraph g { a -> ghost; }";
    let ord = "0 {\n a\n}\n1 {\n b\n}\n";
    assert!(matches!(
        read_dot_and_ord(dot, ord),
        Err(Error::DanglingEndpoint { .. })
    ));
}

#[test]
fn same_layer_edges_are_fatal() {
    let dot = "digraph g { a -> b; }";
    let ord = "0 {\n a b\n}\n";
    assert!(matches!(
        read_dot_and_ord(dot, ord),
        Err(Error::SameLayerEdge { .. })
    ));
}

#[test]
fn layers_must_be_numbered_in_order() {
    let ord = "1 {\n a\n}\n0 {\n b\n}\n";
    assert!(matches!(read_ord(ord), Err(Error::Parse { .. })));
}

#[test]
fn duplicate_names_in_the_ord_file_are_fatal() {
    let ord = "0 {\n a a\n}\n";
    assert!(matches!(read_ord(ord), Err(Error::DuplicateNode { .. })));
}

#[test]
fn edge_chains_expand_to_pairs() {
    let dot = "digraph g { a -> b -> c; }";
    let read = read_dot(dot).expect("parses");
    let pairs: Vec<(&str, &str)> = read
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "b"), ("b", "c")]);
}

#[test]
fn attribute_blocks_are_skipped() {
    let dot = "digraph g { a -> b [label=\"x\", weight=2]; }";
    let read = read_dot(dot).expect("parses");
    assert_eq!(read.edges.len(), 1);
}

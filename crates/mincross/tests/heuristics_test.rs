use mincross::crossings::CrossingCounter;
use mincross::graph::LayeredGraph;
use mincross::sgf::{read_sgf, write_sgf};
use mincross::stats::RunReport;
use mincross::{CaptureSink, Engine, EngineConfig, Heuristic, Objective};
use std::cell::RefCell;
use std::rc::Rc;

fn graph(input: &str) -> LayeredGraph {
    read_sgf(input).expect("fixture parses").graph
}

fn run(input: &str, config: EngineConfig) -> (LayeredGraph, RunReport) {
    let mut g = graph(input);
    let report = {
        let mut engine = Engine::new(&mut g, config);
        engine.run().expect("run succeeds")
    };
    (g, report)
}

fn bounded(heuristic: Heuristic, max_iterations: usize) -> EngineConfig {
    EngineConfig {
        heuristic: Some(heuristic),
        max_iterations,
        standard_termination: false,
        ..Default::default()
    }
}

fn standard(heuristic: Heuristic) -> EngineConfig {
    EngineConfig {
        heuristic: Some(heuristic),
        ..Default::default()
    }
}

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

/// Three layers of three, complete bipartite between each adjacent pair.
const TRIPLE_K33: &str = "\
t triple 9 18 3
n 1 0 0
n 2 0 1
n 3 0 2
n 4 1 0
n 5 1 1
n 6 1 2
n 7 2 0
n 8 2 1
n 9 2 2
e 1 4
e 1 5
e 1 6
e 2 4
e 2 5
e 2 6
e 3 4
e 3 5
e 3 6
e 4 7
e 4 8
e 4 9
e 5 7
e 5 8
e 5 9
e 6 7
e 6 8
e 6 9
";

/// Two layers of five with eight crossings.
const EIGHT: &str = "\
t eight 10 5 2
n 1 0 0
n 2 0 1
n 3 0 2
n 4 0 3
n 5 0 4
n 6 1 0
n 7 1 1
n 8 1 2
n 9 1 3
n 10 1 4
e 1 9
e 2 8
e 3 7
e 4 6
e 5 7
";

#[test]
fn barycenter_cannot_beat_the_k33_floor() {
    // every ordering of K3,3 carries one crossing per 2x2 subgraph
    let (_, report) = run(K33, bounded(Heuristic::Barycenter, 1_000));
    assert_eq!(report.best_total_crossings.value, 9.0);
    assert_eq!(report.iterations, 1_001);
}

#[test]
fn every_heuristic_leaves_a_path_crossing_free() {
    for heuristic in [
        Heuristic::Median,
        Heuristic::Barycenter,
        Heuristic::ModBarycenter,
        Heuristic::MaxCrossingsNode,
        Heuristic::Sifting,
        Heuristic::MaxCrossingsEdge,
        Heuristic::MaxCrossingsEdgeWithSifting,
        Heuristic::MaxStretchEdge,
    ] {
        let (g, report) = run(PATH, standard(heuristic));
        assert_eq!(
            report.best_total_crossings.value, 0.0,
            "heuristic {heuristic:?}",
        );
        g.assert_consistent();
    }
}

#[test]
fn barycenter_untangles_the_perfect_shuffle() {
    let (_, report) = run(SHUFFLE, bounded(Heuristic::Barycenter, 1_000));
    assert_eq!(report.beginning.total_crossings, 6);
    assert_eq!(report.best_total_crossings.value, 0.0);
}

#[test]
fn mod_bary_cannot_beat_the_double_k33_floor() {
    let (g, report) = run(TRIPLE_K33, bounded(Heuristic::ModBarycenter, 1_000));
    assert_eq!(report.best_total_crossings.value, 18.0);
    g.assert_consistent();
}

#[test]
fn sifting_improves_the_eight_crossing_graph() {
    let (g, report) = run(EIGHT, standard(Heuristic::Sifting));
    assert_eq!(report.beginning.total_crossings, 8);
    assert!(
        report.best_total_crossings.value < 8.0,
        "best = {}",
        report.best_total_crossings.value,
    );
    g.assert_consistent();
}

#[test]
fn post_processing_never_hurts_mce() {
    let (_, plain) = run(EIGHT, standard(Heuristic::MaxCrossingsEdge));

    let config = EngineConfig {
        post_processing: true,
        ..standard(Heuristic::MaxCrossingsEdge)
    };
    let (g, post) = run(EIGHT, config);
    let after = post.after_post_processing.expect("post phase ran");
    assert!(after.total_crossings as f64 <= plain.best_total_crossings.value);
    g.assert_consistent();

    // the post phase re-counts from scratch; the graph must agree
    let mut g = g;
    let counter = CrossingCounter::new(&mut g);
    assert_eq!(counter.total(), after.total_crossings);
}

#[test]
fn identical_runs_produce_identical_output() {
    let render = || {
        let mut g = graph(EIGHT);
        let mut engine = Engine::new(&mut g, standard(Heuristic::Sifting));
        engine.run().expect("run succeeds");
        engine.restore_best(Objective::TotalCrossings);
        write_sgf(engine.graph())
    };
    assert_eq!(render(), render());
}

#[test]
fn restore_best_replays_the_best_total_order() {
    let mut g = graph(EIGHT);
    let mut engine = Engine::new(&mut g, standard(Heuristic::Sifting));
    let report = engine.run().expect("run succeeds");
    assert!(engine.restore_best(Objective::TotalCrossings));
    assert_eq!(
        engine.crossings().total() as f64,
        report.best_total_crossings.value,
    );
    engine.graph().assert_consistent();
}

#[test]
fn invariants_hold_after_every_heuristic() {
    for heuristic in [
        Heuristic::Median,
        Heuristic::Barycenter,
        Heuristic::ModBarycenter,
        Heuristic::MaxCrossingsNode,
        Heuristic::Sifting,
        Heuristic::MaxCrossingsEdge,
        Heuristic::MaxCrossingsEdgeWithSifting,
        Heuristic::MaxStretchEdge,
    ] {
        let (mut g, _) = run(EIGHT, bounded(heuristic, 200));
        g.assert_consistent();
        let counter = CrossingCounter::new(&mut g);
        let per_edge: u64 = g.edges.iter().map(|e| e.crossings).sum();
        assert_eq!(per_edge, 2 * counter.total(), "heuristic {heuristic:?}");
    }
}

struct Probe {
    captured: Rc<RefCell<Vec<usize>>>,
}

impl CaptureSink for Probe {
    fn capture(&mut self, graph: &LayeredGraph, iteration: usize) -> mincross::Result<()> {
        graph.assert_consistent();
        self.captured.borrow_mut().push(iteration);
        Ok(())
    }
}

#[test]
fn capture_fires_at_the_requested_iteration() {
    let captured = Rc::new(RefCell::new(Vec::new()));
    let mut g = graph(EIGHT);
    let config = EngineConfig {
        capture_iteration: Some(3),
        ..bounded(Heuristic::Barycenter, 50)
    };
    let mut engine = Engine::new(&mut g, config);
    engine.set_capture_sink(Box::new(Probe {
        captured: Rc::clone(&captured),
    }));
    engine.run().expect("run succeeds");
    assert_eq!(*captured.borrow(), vec![3]);
}

struct SharedWriter {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl std::io::Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn the_standard_termination_banner_appears_exactly_once() {
    let buffer = Rc::new(RefCell::new(Vec::new()));
    let mut g = graph(EIGHT);
    // iteration-bounded: the run continues past the natural stopping point
    let mut engine = Engine::new(&mut g, bounded(Heuristic::Barycenter, 300));
    engine.set_trace_writer(Box::new(SharedWriter {
        buffer: Rc::clone(&buffer),
    }));
    engine.run().expect("run succeeds");
    let text = String::from_utf8(buffer.borrow().clone()).unwrap();
    let banners = text.matches("standard termination here").count();
    assert_eq!(banners, 1);
}

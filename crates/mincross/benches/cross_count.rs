use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mincross::crossings::{self, CrossingCounter};
use mincross::graph::LayeredGraph;
use std::hint::black_box;

/// Deterministic layered graph: `layers` layers of `width` nodes, roughly
/// `fanout` edges per node into the next layer, scattered by a fixed
/// linear congruential sequence.
fn build_graph(layers: usize, width: usize, fanout: usize) -> LayeredGraph {
    let mut g = LayeredGraph::new("bench");
    let mut id = 0;
    for layer in 0..layers {
        for _ in 0..width {
            g.add_node(format!("n{id}"), id, layer);
            id += 1;
        }
    }
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (state >> 33) as usize
    };
    for layer in 0..layers - 1 {
        for p in 0..width {
            let down = g.node_at(layer, p);
            for _ in 0..fanout {
                let up = g.node_at(layer + 1, next() % width);
                g.add_edge(down, up);
            }
        }
    }
    g
}

fn bench_full_recount(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_recount");
    for &(layers, width) in &[(4usize, 64usize), (8, 128)] {
        let g = build_graph(layers, width, 3);
        group.bench_function(format!("{layers}x{width}"), |b| {
            b.iter_batched(
                || g.clone(),
                |mut g| {
                    let counter = CrossingCounter::new(&mut g);
                    black_box(counter.total())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_crossings_around(c: &mut Criterion) {
    let mut g = build_graph(4, 128, 3);
    let _counter = CrossingCounter::new(&mut g);
    let node = g.node_at(1, 64);
    let width = g.layers[1].len();
    c.bench_function("crossings_around_128", |b| {
        b.iter(|| black_box(crossings::crossings_around(&g, node, 0, width - 1)))
    });
}

criterion_group!(benches, bench_full_recount, bench_crossings_around);
criterion_main!(benches);

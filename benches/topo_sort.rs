//! Benchmarks for graph sorting and level computation
//!
//! Builds layered graphs shaped like a large module tree: every project
//! depends on a few projects of the layer below.

use buildseq::graph::DependencyGraph;
use buildseq::reference::VisualStudioProject;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Create a graph of `layers` layers with `width` projects each
fn create_layered_graph(layers: usize, width: usize, fan_out: usize) -> DependencyGraph {
    let mut graph = DependencyGraph::with_capacity(layers * width, layers * width * fan_out);
    let mut previous: Vec<VisualStudioProject> = Vec::new();

    for layer in 0..layers {
        let current: Vec<VisualStudioProject> = (0..width)
            .map(|i| {
                let name = format!("P{}_{}", layer, i);
                VisualStudioProject::new(&name, format!("{}.csproj", name), "Bench")
            })
            .collect();

        for (i, project) in current.iter().enumerate() {
            graph.add_node(project.clone());
            for k in 0..fan_out.min(previous.len()) {
                graph.add_edge(project.clone(), previous[(i + k) % previous.len()].clone());
            }
        }
        previous = current;
    }

    graph
}

/// Benchmark the depth-first topological sort
fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topo_sort");

    for width in [10, 50, 100, 250].iter() {
        let graph = create_layered_graph(20, *width, 3);

        group.bench_with_input(BenchmarkId::new("nodes", 20 * width), &graph, |b, g| {
            b.iter(|| black_box(g.sort().map(|order| order.len())));
        });
    }

    group.finish();
}

/// Benchmark level grouping over a sorted graph
fn bench_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("levels");

    for width in [10, 50, 100, 250].iter() {
        let graph = create_layered_graph(20, *width, 3);
        let order = graph.sort().unwrap_or_default();

        group.bench_with_input(BenchmarkId::new("nodes", 20 * width), &order, |b, o| {
            b.iter(|| black_box(graph.levels(o).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sort, bench_levels);
criterion_main!(benches);

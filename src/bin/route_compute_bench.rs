use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use pathsim::model::{Graph, RoutingTableSet};
use pathsim::route_compute::{build_all_tables, RouteAlgorithm};
use pathsim::runtime::config::load_simulator_config;
use pathsim::runtime::simulation::generate_topology;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "route_compute_bench")]
#[command(about = "Benchmark all-sources routing table builds per algorithm")]
struct Args {
    #[arg(long, default_value_t = 100)]
    nodes: usize,
    #[arg(long, default_value_t = 0.08)]
    density: f64,
    #[arg(long, default_value_t = 3)]
    seeds: usize,
    #[arg(long, default_value_t = 1)]
    start_seed: u64,
    #[arg(long, default_value_t = 8)]
    iterations: usize,
    /// Benchmark the topology of a simulator config instead of generated graphs.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    output_json: Option<PathBuf>,
}

/// Per-source view of one all-sources build.
#[derive(Debug, Clone, Default, Serialize)]
struct TableMetrics {
    sources: usize,
    failed_sources: usize,
    routes: usize,
    /// Fewest routes held by any successful source.
    min_routes: usize,
    /// Share of ordered (source, destination) pairs with a route.
    coverage: f64,
    mean_cost: f64,
    max_cost: f64,
}

impl TableMetrics {
    fn from_set(set: &RoutingTableSet, node_count: usize) -> Self {
        let routes_per_source: Vec<usize> = set.tables().map(|table| table.len()).collect();
        let costs: Vec<f64> = set
            .tables()
            .flat_map(|table| table.iter().map(|route| route.cost))
            .collect();
        let routes: usize = routes_per_source.iter().sum();
        let pairs = node_count * node_count.saturating_sub(1);

        Self {
            sources: routes_per_source.len(),
            failed_sources: set.failures().count(),
            routes,
            min_routes: routes_per_source.iter().copied().min().unwrap_or(0),
            coverage: if pairs == 0 {
                1.0
            } else {
                routes as f64 / pairs as f64
            },
            mean_cost: mean(&costs),
            max_cost: costs.iter().copied().fold(f64::NAN, f64::max),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct AlgorithmRun {
    algorithm: RouteAlgorithm,
    build_ms: f64,
    /// Build time spread over the sources that produced a table.
    per_source_us: f64,
    metrics: TableMetrics,
}

#[derive(Debug, Serialize)]
struct SeedRun {
    seed: u64,
    nodes: usize,
    edges: usize,
    runs: Vec<AlgorithmRun>,
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        f64::NAN
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn bench_algorithm(graph: &Graph, algorithm: RouteAlgorithm, iterations: usize) -> AlgorithmRun {
    let iterations = iterations.max(1);
    let mut total_ms = 0.0;
    let mut set = RoutingTableSet::default();

    for _ in 0..iterations {
        let start = Instant::now();
        set = build_all_tables(graph, &algorithm);
        total_ms += start.elapsed().as_secs_f64() * 1000.0;
    }

    let metrics = TableMetrics::from_set(&set, graph.node_count());
    let build_ms = total_ms / iterations as f64;
    AlgorithmRun {
        algorithm,
        build_ms,
        per_source_us: build_ms * 1000.0 / metrics.sources.max(1) as f64,
        metrics,
    }
}

/// Averages every seed's run of `algorithm`; counters are summed.
fn average_runs(seed_runs: &[SeedRun], algorithm: RouteAlgorithm) -> AlgorithmRun {
    let runs: Vec<&AlgorithmRun> = seed_runs
        .iter()
        .flat_map(|seed_run| seed_run.runs.iter())
        .filter(|run| run.algorithm == algorithm)
        .collect();
    let avg = |field: fn(&AlgorithmRun) -> f64| {
        mean(&runs.iter().map(|run| field(run)).collect::<Vec<_>>())
    };

    AlgorithmRun {
        algorithm,
        build_ms: avg(|run| run.build_ms),
        per_source_us: avg(|run| run.per_source_us),
        metrics: TableMetrics {
            sources: runs.iter().map(|run| run.metrics.sources).sum(),
            failed_sources: runs.iter().map(|run| run.metrics.failed_sources).sum(),
            routes: runs.iter().map(|run| run.metrics.routes).sum(),
            min_routes: runs
                .iter()
                .map(|run| run.metrics.min_routes)
                .min()
                .unwrap_or(0),
            coverage: avg(|run| run.metrics.coverage),
            mean_cost: avg(|run| run.metrics.mean_cost),
            max_cost: runs
                .iter()
                .map(|run| run.metrics.max_cost)
                .fold(f64::NAN, f64::max),
        },
    }
}

fn print_summary(rows: &[AlgorithmRun]) {
    println!("algorithm\tbuild_ms\tper_source_us\tcoverage\tfailed\tmean_cost\tmax_cost");
    for row in rows {
        println!(
            "{}\t{:.4}\t{:.2}\t{:.4}\t{}\t{:.4}\t{:.4}",
            row.algorithm,
            row.build_ms,
            row.per_source_us,
            row.metrics.coverage,
            row.metrics.failed_sources,
            row.metrics.mean_cost,
            row.metrics.max_cost
        );
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let configured = args
        .config
        .as_ref()
        .map(|path| load_simulator_config(path).map(|cfg| cfg.build_graph()))
        .transpose()?;

    let mut seed_runs = Vec::new();
    for idx in 0..args.seeds.max(1) {
        let seed = args.start_seed + idx as u64;
        let graph = match &configured {
            Some(graph) => graph.clone(),
            None => generate_topology(seed, args.nodes.max(2), args.density),
        };

        seed_runs.push(SeedRun {
            seed,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            runs: RouteAlgorithm::ALL
                .into_iter()
                .map(|algorithm| bench_algorithm(&graph, algorithm, args.iterations))
                .collect(),
        });
    }

    let summary: Vec<AlgorithmRun> = RouteAlgorithm::ALL
        .into_iter()
        .map(|algorithm| average_runs(&seed_runs, algorithm))
        .collect();
    print_summary(&summary);

    let payload = json!({
        "config": {
            "nodes": args.nodes,
            "density": args.density,
            "seeds": args.seeds,
            "start_seed": args.start_seed,
            "iterations": args.iterations,
            "topology_config": args.config,
        },
        "runs": seed_runs,
        "summary": summary,
    });

    if let Some(path) = args.output_json {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(&payload)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_count_routes_per_source() {
        // C has no outgoing links, so its table is empty.
        let graph = Graph::from_edges([("A", "B", 1.0), ("B", "A", 1.0), ("B", "C", 3.0)]);
        let set = build_all_tables(&graph, &RouteAlgorithm::Dijkstra);
        let metrics = TableMetrics::from_set(&set, graph.node_count());

        assert_eq!(metrics.sources, 3);
        assert_eq!(metrics.failed_sources, 0);
        assert_eq!(metrics.routes, 4);
        assert_eq!(metrics.min_routes, 0);
        assert!((metrics.coverage - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(metrics.max_cost, 4.0);
    }

    #[test]
    fn averaging_sums_failures_across_seeds() {
        let graph = Graph::from_edges([("A", "B", 2.0), ("B", "A", -3.0)]);
        let run = |seed| SeedRun {
            seed,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            runs: vec![bench_algorithm(&graph, RouteAlgorithm::BellmanFord, 1)],
        };
        let summary = average_runs(&[run(1), run(2)], RouteAlgorithm::BellmanFord);
        assert_eq!(summary.metrics.failed_sources, 4);
        assert_eq!(summary.metrics.sources, 0);
        assert!(summary.metrics.mean_cost.is_nan());
    }
}

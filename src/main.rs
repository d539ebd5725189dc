use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pathsim::model::{NodeId, RouteChange, RoutingTable, RoutingTableSet, TopologyEvent};
use pathsim::route_compute::{
    build_all_tables, build_table, compare_algorithms, AlgorithmComparison, PathOutcome,
    Recommendation, RouteAlgorithm,
};
use pathsim::runtime::config::load_simulator_config;
use pathsim::runtime::shared::SharedTopology;
use pathsim::runtime::simulation::{simulate_network_events, LcgRng};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pathsim")]
#[command(about = "Network routing simulator: shortest paths and routing tables")]
struct Args {
    #[arg(long)]
    config: PathBuf,
    #[arg(long, default_value = "INFO")]
    log_level: String,
    /// Overrides the algorithm from the config file.
    #[arg(long)]
    algorithm: Option<RouteAlgorithm>,
    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Routing tables for every router, or for one with --source.
    Tables {
        #[arg(long)]
        source: Option<String>,
    },
    /// Shortest path between two routers with both algorithms.
    Route {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Apply the configured events (or random ones) and show route changes.
    Simulate {
        #[arg(long)]
        seed: Option<u64>,
        /// Ignore configured events and generate random ones.
        #[arg(long)]
        random: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let cfg = load_simulator_config(&args.config)?;
    let algorithm = args.algorithm.unwrap_or(cfg.algorithm);
    let graph = cfg.build_graph();
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        %algorithm,
        "topology loaded"
    );

    match args.command {
        Command::Tables { source } => {
            let start = Instant::now();
            let set = match source.as_deref() {
                Some(source) => {
                    let table = build_table(&graph, &algorithm, source)
                        .with_context(|| format!("cannot build routing table for {source}"))?;
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    return print_single_table(&table, algorithm, elapsed_ms, args.json);
                }
                None => build_all_tables(&graph, &algorithm),
            };
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            print_table_set(&set, algorithm, elapsed_ms, args.json)
        }
        Command::Route { from, to } => {
            let start = Instant::now();
            let comparison = compare_algorithms(&graph, &from, &to)?;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
            print_route_comparison(&comparison, elapsed_ms, args.json)
        }
        Command::Simulate { seed, random } => {
            let events = if random || cfg.events.is_empty() {
                let mut rng = LcgRng::new(seed.unwrap_or(cfg.simulation.seed));
                simulate_network_events(&graph, &mut rng, &cfg.simulation.policy)
            } else {
                cfg.events.clone()
            };

            let shared = SharedTopology::new(graph);
            let start = Instant::now();
            let update = shared.apply_all_and_rebuild(&events, algorithm)?;
            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            if args.json {
                let payload = json!({
                    "elapsed_ms": elapsed_ms,
                    "update": update,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            println!("applied {} events in {:.3} ms", update.applied.len(), elapsed_ms);
            for applied in &update.applied {
                let (source, target) = applied.event.endpoints();
                let action = match &applied.event {
                    TopologyEvent::RemoveEdge { .. } => "remove".to_string(),
                    TopologyEvent::UpdateWeight { weight, .. } => {
                        format!("weight={weight}")
                    }
                };
                println!("  {source} -> {target}\t{action}\tchanged={}", applied.changed);
            }
            print_route_changes(&update.changes);
            Ok(())
        }
    }
}

fn format_cost(cost: f64) -> String {
    if cost.is_finite() {
        format!("{cost}")
    } else {
        "inf".to_string()
    }
}

fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn print_routes(table: &RoutingTable) {
    println!("routing table for {}", table.source());
    println!("destination\tnext_hop\tcost\tpath");
    for route in table.iter() {
        println!(
            "{}\t{}\t{}\t{}",
            route.destination,
            route.next_hop,
            format_cost(route.cost),
            format_path(&route.path)
        );
    }
}

fn print_single_table(
    table: &RoutingTable,
    algorithm: RouteAlgorithm,
    elapsed_ms: f64,
    as_json: bool,
) -> Result<()> {
    if as_json {
        let payload = json!({
            "algorithm": algorithm,
            "elapsed_ms": elapsed_ms,
            "table": table,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    print_routes(table);
    println!("{algorithm} took {elapsed_ms:.3} ms");
    Ok(())
}

fn print_table_set(
    set: &RoutingTableSet,
    algorithm: RouteAlgorithm,
    elapsed_ms: f64,
    as_json: bool,
) -> Result<()> {
    if as_json {
        let payload = json!({
            "algorithm": algorithm,
            "elapsed_ms": elapsed_ms,
            "tables": set,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    for table in set.tables() {
        print_routes(table);
        println!();
    }
    for (source, error) in set.failures() {
        println!("routing table for {source} failed: {error}");
    }
    println!("{algorithm} took {elapsed_ms:.3} ms");
    Ok(())
}

fn print_route_comparison(
    comparison: &AlgorithmComparison,
    elapsed_ms: f64,
    as_json: bool,
) -> Result<()> {
    if as_json {
        let payload = json!({
            "elapsed_ms": elapsed_ms,
            "comparison": comparison,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!(
        "shortest paths from {} to {}",
        comparison.source, comparison.destination
    );
    let rows = [
        (RouteAlgorithm::Dijkstra, &comparison.dijkstra),
        (RouteAlgorithm::BellmanFord, &comparison.bellman_ford),
    ];
    for (algorithm, outcome) in rows {
        match outcome {
            PathOutcome::Found(summary) => println!(
                "{algorithm}\tpath={}\tcost={}",
                format_path(&summary.path),
                format_cost(summary.cost)
            ),
            PathOutcome::NoPath => println!("{algorithm}\tno path"),
            PathOutcome::Failed { error } => println!("{algorithm}\tfailed: {error}"),
        }
    }
    let verdict = match comparison.recommendation {
        Recommendation::Dijkstra => "use dijkstra",
        Recommendation::BellmanFord => "use bellman_ford",
        Recommendation::Either => "both algorithms yield the same cost",
        Recommendation::NoPath => "no path found by either algorithm",
    };
    println!("recommendation: {verdict}");
    println!("compared in {elapsed_ms:.3} ms");
    Ok(())
}

fn print_route_changes(changes: &[RouteChange]) {
    if changes.is_empty() {
        println!("no route changes");
        return;
    }
    println!("source\tdestination\tchange");
    for change in changes {
        let detail = match change {
            RouteChange::Added { route, .. } => format!(
                "added via {} cost {}",
                route.next_hop,
                format_cost(route.cost)
            ),
            RouteChange::Removed { route, .. } => {
                format!("removed (was via {})", route.next_hop)
            }
            RouteChange::Changed { before, after, .. } => format!(
                "{} ({}) -> {} ({})",
                before.next_hop,
                format_cost(before.cost),
                after.next_hop,
                format_cost(after.cost)
            ),
        };
        println!("{}\t{}\t{}", change.source(), change.destination(), detail);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
    Ok(())
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use sr_engine::{EngineConfig, RouteRequest, RoutingEngine};

mod logging;

#[cfg(test)]
mod tests;

#[derive(Parser, Debug)]
#[command(name = "saferoute", version, about = "Shortest and risk-aware routes over a road network")]
struct Cli {
    /// JSON config file.  Flags below override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Road network (portable JSON, or .osm.pbf with the `osm` feature).
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Binary graph cache path.
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Risk-zone dataset (CSV, or JSON by extension).
    #[arg(long, global = true)]
    zones: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute one route and print it as a GeoJSON Feature.
    Route {
        /// Start as `LAT,LON`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        start: [f64; 2],
        /// End as `LAT,LON`.
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        end: [f64; 2],
        /// `fast` or `safe`.
        #[arg(long, default_value = "fast")]
        mode: String,
    },
    /// Route every request in a JSON array file; prints one result per request.
    Batch {
        /// File holding `[{ "start": [lat, lon], "end": [lat, lon], "mode": "safe" }, ...]`.
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the loaded risk zones.
    Zones,
    /// Build (or refresh) the binary graph cache.
    Cache,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    logging::init_logging(&config.logging);

    match &cli.command {
        Command::Route { start, end, mode } => handle_route(&config, RouteRequest::new(*start, *end, mode)),
        Command::Batch { input } => handle_batch(&config, input),
        Command::Zones => handle_zones(&config),
        Command::Cache => handle_cache(&config),
    }
}

/// File, then environment, then flags.
fn resolve_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut config = config.with_env_overrides();

    if let Some(graph) = &cli.graph {
        config.graph_path = Some(graph.clone());
    }
    if let Some(cache) = &cli.cache {
        config.graph_cache_path = Some(cache.clone());
    }
    if let Some(zones) = &cli.zones {
        config.zones_path = Some(zones.clone());
    }
    Ok(config)
}

/// `"40.71,-74.0"` → `[40.71, -74.0]`.
fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    Ok([parse(lat)?, parse(lon)?])
}

fn load_engine(config: &EngineConfig) -> Result<RoutingEngine> {
    RoutingEngine::load(config).context("failed to load routing engine")
}

fn handle_route(config: &EngineConfig, request: RouteRequest) -> Result<()> {
    let engine = load_engine(config)?;
    match engine.route_request(&request) {
        Ok(route) => {
            println!("{}", serde_json::to_string_pretty(&route.to_geojson())?);
            Ok(())
        }
        Err(err) => {
            println!("{}", serde_json::to_string_pretty(&err)?);
            Err(err).context("routing failed")
        }
    }
}

fn handle_batch(config: &EngineConfig, input: &std::path::Path) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let requests: Vec<RouteRequest> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of route requests", input.display()))?;

    let engine = load_engine(config)?;

    // Invalid requests keep their slot in the output.
    let mut results: Vec<serde_json::Value> = vec![serde_json::Value::Null; requests.len()];
    let mut queries = Vec::with_capacity(requests.len());
    let mut slots = Vec::with_capacity(requests.len());
    for (i, req) in requests.iter().enumerate() {
        match req.validate() {
            Ok(q) => {
                queries.push(q);
                slots.push(i);
            }
            Err(e) => results[i] = serde_json::json!({ "error": e }),
        }
    }

    for (slot, result) in slots.into_iter().zip(engine.route_batch(&queries)) {
        results[slot] = match result {
            Ok(route) => route.to_geojson(),
            Err(e) => serde_json::json!({ "error": e }),
        };
    }

    let failed = results.iter().filter(|r| r.get("error").is_some()).count();
    info!(requests = results.len(), failed, "batch complete");
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn handle_zones(config: &EngineConfig) -> Result<()> {
    let engine = load_engine(config)?;
    println!("{}", serde_json::to_string_pretty(&engine.zones_listing())?);
    Ok(())
}

fn handle_cache(config: &EngineConfig) -> Result<()> {
    let (Some(graph), Some(cache)) = (&config.graph_path, &config.graph_cache_path) else {
        bail!("`cache` needs both a graph and a cache path (--graph, --cache)");
    };
    let network = sr_spatial::load_graph(graph, Some(cache))
        .with_context(|| format!("failed to load road network from {}", graph.display()))?;
    println!(
        "Graph cache at {} ({} nodes, {} edges)",
        cache.display(),
        network.node_count(),
        network.edge_count()
    );
    Ok(())
}

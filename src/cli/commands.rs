//! Command implementations for the Annex CLI.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::engine::{AnnEngine, AnnRequest, EngineConfig};
use crate::error::{AnnexError, Result};
use crate::vector::core::distance::DistanceMetric;

/// Execute a CLI command.
pub fn execute_command(args: AnnexArgs) -> Result<()> {
    match &args.command {
        Command::Search(search_args) => search(search_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

/// Build an index for the request and answer its queries.
fn search(args: &SearchArgs, cli_args: &AnnexArgs) -> Result<()> {
    let mut request = load_request(&args.request)?;
    if let Some(k) = args.k {
        request.k = k;
    }

    let engine = AnnEngine::new(resolve_config(&args.overrides)?)?;
    let response = engine.execute(&request)?;

    output_response(&response, cli_args)
}

/// Build an index for the request's dataset and report its shape.
fn show_stats(args: &StatsArgs, cli_args: &AnnexArgs) -> Result<()> {
    let request = load_request(&args.request)?;
    let engine = AnnEngine::new(resolve_config(&args.overrides)?)?;

    let start = Instant::now();
    let index = engine.build_index(&request, &engine.request_token())?;
    let build_time_ms = start.elapsed().as_millis() as u64;

    if args.validate {
        index.validate()?;
    }

    output_stats(
        &IndexStatsReport {
            stats: index.stats(),
            build_time_ms,
            validated: args.validate,
        },
        cli_args,
    )
}

/// Read an [`AnnRequest`] from a JSON file.
pub fn load_request(path: &Path) -> Result<AnnRequest> {
    debug!(path = %path.display(), "loading request");
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Merge the configuration file (if any) with command line overrides.
pub fn resolve_config(overrides: &IndexOverrides) -> Result<EngineConfig> {
    let mut config = match &overrides.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };

    if let Some(m) = overrides.m {
        config.hnsw = config.hnsw.with_m(m);
    }
    if let Some(ef_construction) = overrides.ef_construction {
        config.hnsw.ef_construction = ef_construction;
    }
    if let Some(ef) = overrides.ef {
        config.hnsw.ef_search = ef;
    }
    if let Some(seed) = overrides.seed {
        config.hnsw.seed = seed;
    }
    if let Some(metric) = &overrides.metric {
        config.hnsw.distance_metric = DistanceMetric::parse_str(metric)?;
    }
    if let Some(threads) = overrides.threads {
        config.num_threads = Some(threads);
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        config.timeout_ms = Some(timeout_ms);
    }

    config.validate()?;
    Ok(config)
}

/// Process exit code for an error: 2 for bad input, 1 otherwise.
pub fn exit_code(error: &AnnexError) -> i32 {
    if error.is_client_error() { 2 } else { 1 }
}

//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{AnnexArgs, OutputFormat};
use crate::engine::AnnResponse;
use crate::error::Result;
use crate::vector::index::hnsw::HnswStats;

/// Result structure for the stats command.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexStatsReport {
    #[serde(flatten)]
    pub stats: HnswStats,
    pub build_time_ms: u64,
    pub validated: bool,
}

/// Print a search response in the selected format.
pub fn output_response(response: &AnnResponse, args: &AnnexArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(response, args),
        OutputFormat::Human => {
            println!("{}", response.message);
            for result in &response.results {
                println!();
                println!("Query {}:", result.query_id);
                println!("─────────────");
                for (rank, neighbor) in result.neighbors.iter().enumerate() {
                    println!("  {:>3}. {} ({:.6})", rank + 1, neighbor.id, neighbor.distance);
                }
            }
            Ok(())
        }
    }
}

/// Print index statistics in the selected format.
pub fn output_stats(report: &IndexStatsReport, args: &AnnexArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Json => output_json(report, args),
        OutputFormat::Human => {
            let stats = &report.stats;
            println!("Index Statistics:");
            println!("════════════════");
            println!("Total points: {}", stats.total_points);
            println!("Dimension: {}", stats.dimension);
            println!("Levels: {}", stats.levels);
            if let Some(entry) = stats.entry_point {
                println!("Entry point: {entry}");
            }
            for (level, size) in stats.layer_sizes.iter().enumerate() {
                println!("  layer {level}: {size} nodes");
            }
            println!("Average degree (layer 0): {:.2}", stats.avg_degree_layer0);
            println!("Memory usage: {} bytes", stats.memory_usage_bytes);
            println!("Build time: {}ms", report.build_time_ms);
            if report.validated {
                println!("Graph invariants: ok");
            }
            Ok(())
        }
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &AnnexArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

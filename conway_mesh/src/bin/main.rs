//! Conway mesh CLI
//!
//! Runs a distributed Game of Life over an in-process SPMD group and prints
//! the assembled grid for every reported generation.
//!
//! # Example
//!
//! ```bash
//! # 8x8 torus, 4 ranks on a 2x2 mesh, glider, 10 generations
//! conway-mesh -n 8 -p 4 -g 10 --pattern glider
//!
//! # Reproducible random start, only print every 5th generation
//! conway-mesh -n 12 -p 6 -g 20 --seed 42 --report-every 5
//! ```

use clap::Parser;
use conway_mesh::{patterns, MeshShape, ReportSchedule, Seed, SimConfig, Simulation, TextReport};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Distributed Conway's Game of Life
///
/// Splits an N x N torus over a 2D periodic mesh of ranks that exchange
/// ghost cells every generation.
#[derive(Parser, Debug)]
#[command(name = "conway-mesh")]
#[command(version, about, long_about = None)]
struct Args {
    /// Global grid extent N
    #[arg(short = 'n', long, default_value = "5")]
    size: usize,

    /// Number of generations to run
    #[arg(short = 'g', long, default_value = "3")]
    generations: usize,

    /// Number of ranks in the process group
    #[arg(short = 'p', long, default_value = "1")]
    processes: usize,

    /// Explicit mesh shape as ROWSxCOLS. Overrides --processes.
    #[arg(long, value_parser = parse_mesh)]
    mesh: Option<MeshShape>,

    /// Print the grid every K generations (0 = never)
    #[arg(long, default_value = "1")]
    report_every: usize,

    /// Start from a named pattern instead of a random grid
    #[arg(long, conflicts_with = "per_process_seed")]
    pattern: Option<String>,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Seed each rank's block independently from seed + rank
    #[arg(long)]
    per_process_seed: bool,

    /// List the available patterns and exit
    #[arg(long)]
    list_patterns: bool,
}

fn parse_mesh(s: &str) -> Result<MeshShape, String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got {s:?}"))?;
    let rows = rows.trim().parse::<usize>().map_err(|e| e.to_string())?;
    let cols = cols.trim().parse::<usize>().map_err(|e| e.to_string())?;
    Ok(MeshShape::new(rows, cols))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,conway_mesh=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_patterns {
        for pattern in patterns::PATTERNS {
            let (height, width) = pattern.extent();
            println!("{:<20} {height}x{width}", pattern.name);
        }
        return ExitCode::SUCCESS;
    }

    let mut config = SimConfig::new(args.size, args.generations)
        .with_processes(args.processes)
        .with_report(ReportSchedule::every(args.report_every));
    if let Some(mesh) = args.mesh {
        config = config.with_mesh(mesh);
    }

    let seed = match (&args.pattern, args.per_process_seed) {
        (Some(name), _) => Seed::pattern(name.clone()),
        (None, per_process) => {
            let value = args.seed.unwrap_or_else(rand::random);
            info!(seed = value, per_process, "Random initial grid");
            if per_process {
                Seed::PerProcess(value)
            } else {
                Seed::Random(value)
            }
        }
    };

    match Simulation::new(config).run(seed, TextReport::stdout()).await {
        Ok(report) => {
            info!(
                mesh = %report.mesh,
                generations = report.generations,
                live_cells = report.live_cells(),
                messages = report.traffic.messages_sent,
                "Run complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_argument_parses() {
        assert_eq!(parse_mesh("2x3").unwrap(), MeshShape::new(2, 3));
        assert_eq!(parse_mesh("4X1").unwrap(), MeshShape::new(4, 1));
        assert!(parse_mesh("4").is_err());
        assert!(parse_mesh("ax2").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

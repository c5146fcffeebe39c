//! Command-line interface for the Stopover route planner.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod plan;

pub use error::CliError;

use plan::PlanArgs;

const ARG_PLAN_REQUEST: &str = "request";
const ARG_PLAN_GRAPH: &str = "graph";
const ARG_PLAN_TRAFFIC: &str = "traffic";
const ARG_PLAN_STRATEGY: &str = "strategy";
const ARG_PLAN_RADIUS: &str = "radius-m";
const ARG_PLAN_MAX_SNAP_DISTANCE: &str = "max-snap-distance-m";
const ENV_PLAN_REQUEST: &str = "STOPOVER_CMDS_PLAN_REQUEST_PATH";
const ENV_PLAN_GRAPH: &str = "STOPOVER_CMDS_PLAN_GRAPH";

/// Run the Stopover CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => plan::run_plan(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "stopover",
    about = "Plan the shortest visiting order for a set of destinations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a multi-stop route over a road-network graph export.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;

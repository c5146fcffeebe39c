//! Plan command implementation for the Stopover CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use stopover_core::{
    DEFAULT_RADIUS_M, PlanRequest, PlanResponse, Planner, PlannerConfig, ResolverConfig, Strategy,
};
use stopover_data::JsonGraphProvider;
use stopover_fs::open_utf8_file;
use stopover_solver_exhaustive::exhaustive_planner;

use crate::{
    ARG_PLAN_GRAPH, ARG_PLAN_MAX_SNAP_DISTANCE, ARG_PLAN_RADIUS, ARG_PLAN_REQUEST,
    ARG_PLAN_STRATEGY, ARG_PLAN_TRAFFIC, CliError, ENV_PLAN_GRAPH, ENV_PLAN_REQUEST,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a multi-stop route. The first destination in the \
                 request is the departure point; the remaining destinations \
                 are visited in the order with the shortest total length. \
                 The request itself is provided as a JSON-encoded \
                 PlanRequest.",
    about = "Plan a multi-stop route"
)]
#[ortho_config(prefix = "STOPOVER")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a PlanRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Path to the JSON road-network export.
    #[arg(long = ARG_PLAN_GRAPH, value_name = "path")]
    #[serde(default)]
    pub(crate) graph: Option<Utf8PathBuf>,
    /// Traffic snapshot to apply, overriding the request's snapshot.
    #[arg(long = ARG_PLAN_TRAFFIC, value_name = "path")]
    #[serde(default)]
    pub(crate) traffic: Option<Utf8PathBuf>,
    /// Path search strategy, overriding the request's strategy.
    #[arg(long = ARG_PLAN_STRATEGY, value_name = "uniform-cost|heuristic-guided")]
    #[serde(default)]
    pub(crate) strategy: Option<Strategy>,
    /// Radius of the graph loaded around the departure point, in metres.
    #[arg(long = ARG_PLAN_RADIUS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius_m: Option<f64>,
    /// Destinations farther than this from every node are skipped.
    #[arg(long = ARG_PLAN_MAX_SNAP_DISTANCE, value_name = "metres")]
    #[serde(default)]
    pub(crate) max_snap_distance_m: Option<f64>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Path to the JSON graph export.
    pub(crate) graph: Utf8PathBuf,
    /// Snapshot replacing the request's, if any.
    pub(crate) traffic: Option<Utf8PathBuf>,
    /// Strategy replacing the request's, if any.
    pub(crate) strategy: Option<Strategy>,
    /// Planner tuning.
    pub(crate) planner: PlannerConfig,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.request_path, ARG_PLAN_REQUEST)?;
        Self::require_existing(&self.graph, ARG_PLAN_GRAPH)?;
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match stopover_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Apply the command-line overrides to a request read from disk.
    pub(crate) fn apply_overrides(&self, request: &mut PlanRequest) {
        if let Some(traffic) = &self.traffic {
            request.traffic_snapshot = Some(traffic.clone());
        }
        if let Some(strategy) = self.strategy {
            request.strategy = strategy;
        }
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;
        let graph = args.graph.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_GRAPH,
            env: ENV_PLAN_GRAPH,
        })?;

        let defaults = PlannerConfig::default();
        let radius_m = distance(ARG_PLAN_RADIUS, args.radius_m, DEFAULT_RADIUS_M)?;
        let max_snap_distance_m = distance(
            ARG_PLAN_MAX_SNAP_DISTANCE,
            args.max_snap_distance_m,
            defaults.resolver.max_snap_distance_m,
        )?;

        Ok(Self {
            request_path,
            graph,
            traffic: args.traffic,
            strategy: args.strategy,
            planner: PlannerConfig {
                radius_m,
                resolver: ResolverConfig {
                    max_snap_distance_m,
                },
                ..defaults
            },
        })
    }
}

fn distance(field: &'static str, value: Option<f64>, default: f64) -> Result<f64, CliError> {
    match value {
        None => Ok(default),
        Some(metres) if metres.is_finite() && metres >= 0.0 => Ok(metres),
        Some(metres) => Err(CliError::InvalidDistance {
            field,
            value: metres,
        }),
    }
}

/// Builds a planner instance for the current plan invocation.
pub(super) trait PlanPlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError>;
}

pub(super) struct DefaultPlanPlannerBuilder;

impl PlanPlannerBuilder for DefaultPlanPlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError> {
        let provider = JsonGraphProvider::new(config.graph.clone());
        Ok(Box::new(exhaustive_planner(provider, config.planner)))
    }
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultPlanPlannerBuilder;
    run_plan_with(args, &builder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlanPlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_plan(args, builder)?;
    write_plan_response(writer, &response)
}

fn execute_plan(
    args: PlanArgs,
    builder: &dyn PlanPlannerBuilder,
) -> Result<PlanResponse, CliError> {
    let config = resolve_plan_config(args)?;
    let mut request = load_plan_request(&config.request_path)?;
    config.apply_overrides(&mut request);
    request
        .validate()
        .map_err(|source| CliError::InvalidPlanRequest {
            path: config.request_path.clone(),
            source,
        })?;
    debug!(
        "planning {} destinations over {} with {}",
        request.destinations.len(),
        config.graph,
        request.strategy
    );
    let planner = builder.build(&config)?;
    planner
        .plan(&request)
        .map_err(|source| CliError::Plan { source })
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`PlanRequest`] from disk.
pub(super) fn load_plan_request(path: &Utf8Path) -> Result<PlanRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenPlanRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParsePlanRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_plan_response(writer: &mut dyn Write, response: &PlanResponse) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(response).map_err(CliError::SerialisePlanResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WritePlanOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WritePlanOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}

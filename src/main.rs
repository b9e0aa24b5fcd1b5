//! arbiterd - replay registry events and report path ownership.
//!
//! Loads a TOML file of scripted add/remove events, drives a registry with
//! them and prints the resulting status snapshot and per-path report as JSON.

use route_arbiter::config::{self, Config};
use route_arbiter::{Registry, metrics, replay};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Report<'a> {
    status: &'a route_arbiter::StatusSnapshot,
    paths: &'a [route_arbiter::PathReport],
    issues: &'a [replay::StepIssue],
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "arbiter.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("failed to load {config_path}: {e}");
        e
    })?;

    init_tracing(&config);

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {config_path}",
            errors.len()
        ));
    }

    if config.metrics.enabled {
        metrics::init();
    }

    info!(path = %config_path, steps = config.steps.len(), "Replaying registry events");

    let registry = Registry::with_config(&config.registry);
    let issues = replay::run(&registry, &config.steps);

    let status = registry.snapshot_status();
    let paths = registry.path_report();
    let report = Report {
        status: &status,
        paths: &paths,
        issues: &issues,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if config.metrics.enabled && config.metrics.dump {
        print!("{}", metrics::gather_text());
    }

    info!(
        registrations = registry.len(),
        issues = issues.len(),
        "Replay complete"
    );
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

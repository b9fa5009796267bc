/*!
 * procsim - Process Scheduler Simulator Entry Point
 *
 * Runs a scenario file (or a built-in producer/consumer demo) through one
 * scheduling run and prints the resulting snapshot as JSON.
 *
 * Usage: procsim [scenario.json]
 */

use anyhow::{Context, Result};
use process_sim::core::types::{Priority, TimeUnits, Units};
use process_sim::monitoring::TracingSink;
use process_sim::{init_tracing, ProcessKind, ProcessSpec, SimConfig, Simulator};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Scenario file layout
#[derive(Debug, Deserialize)]
struct Scenario {
    /// Replaces the environment configuration when present
    #[serde(default)]
    config: Option<SimConfig>,
    processes: Vec<ScenarioProcess>,
}

/// One process entry; omitted fields are generated
#[derive(Debug, Deserialize)]
struct ScenarioProcess {
    kind: ProcessKind,
    priority: Priority,
    burst_time: Option<TimeUnits>,
    memory_demand: Option<Units>,
}

impl Scenario {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// A producer and a consumer sharing a small buffer plus two normal jobs
    fn demo() -> Self {
        let entry = |kind, priority, burst_time, memory_demand| ScenarioProcess {
            kind,
            priority,
            burst_time: Some(burst_time),
            memory_demand: Some(memory_demand),
        };
        Self {
            config: None,
            processes: vec![
                entry(ProcessKind::Consumer, 2, 4, 120.0),
                entry(ProcessKind::Producer, 3, 4, 120.0),
                entry(ProcessKind::Normal, 1, 6, 300.0),
                entry(ProcessKind::Normal, 5, 3, 900.0),
            ],
        }
    }
}

fn main() -> Result<()> {
    init_tracing();

    let scenario = match std::env::args().nth(1) {
        Some(path) => Scenario::load(Path::new(&path))?,
        None => {
            info!("no scenario given, running built-in demo");
            Scenario::demo()
        }
    };

    let config = match scenario.config {
        Some(config) => {
            config.validate().context("scenario configuration")?;
            config
        }
        None => SimConfig::from_env().context("environment configuration")?,
    };

    let mut sim = Simulator::builder()
        .with_config(config)
        .with_audit_sink(Arc::new(TracingSink))
        .build()
        .context("building simulator")?;

    for entry in scenario.processes {
        let spec = match (entry.burst_time, entry.memory_demand) {
            (Some(burst_time), Some(memory_demand)) => {
                ProcessSpec::new(entry.kind, entry.priority, burst_time, memory_demand)
            }
            (burst_time, memory_demand) => {
                let generated = sim.generate_spec(entry.kind, entry.priority)?;
                ProcessSpec {
                    burst_time: burst_time.unwrap_or(generated.burst_time),
                    memory_demand: memory_demand.unwrap_or(generated.memory_demand),
                    ..generated
                }
            }
        };
        let pid = sim.spawn(spec)?;
        info!(pid = %pid, kind = %entry.kind, "scenario process created");
    }

    let report = sim.run_scheduler().context("scheduling run")?;
    info!(
        policy = %report.policy,
        cycles = report.cycles,
        dispatches = report.dispatches,
        completed = report.completed.len(),
        blocked = report.blocked.len(),
        outcome = ?report.outcome,
        "run report"
    );

    println!("{}", sim.snapshot().to_json_pretty()?);

    if let Err(err) = report.into_result() {
        warn!(error = %err, "run did not complete");
        return Err(err).context("scheduling run did not complete");
    }
    Ok(())
}

//! sim-harness: play wire scenarios and fuzz random layouts from the CLI.

mod fuzz;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use data_runtime::configs::signal::{self, SignalConfig};
use data_runtime::{configs::telemetry, loader};
use signal_core::scene_build::{check_expectations, run_scenario};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Wire propagation harness", long_about = None)]
struct Cli {
    /// Disable the extended-neighbourhood flood regardless of config
    #[arg(long, global = true)]
    no_flood: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Play one scenario and print what each trigger changed and notified
    Run {
        path: PathBuf,
        /// Emit reports as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Play every data/scenarios/*.json and fail on unmet expectations
    Check,
    /// Build random layouts and check propagation invariants
    Fuzz {
        #[arg(long, default_value_t = 0x5EED)]
        seed: u64,
        /// Non-wire cells per layout
        #[arg(long, default_value_t = 40)]
        cells: usize,
        /// Wires placed per layout
        #[arg(long, default_value_t = 60)]
        wires: usize,
        #[arg(long, default_value_t = 50)]
        rounds: usize,
    },
}

fn signal_config(no_flood: bool) -> Result<SignalConfig> {
    let mut cfg = signal::load_default().context("load signal config")?;
    if no_flood {
        cfg.legacy_flood = false;
    }
    Ok(cfg)
}

fn run(path: PathBuf, json: bool, cfg: &SignalConfig) -> Result<()> {
    let sc = loader::load_scenario_file(&path)?;
    let out = run_scenario(&sc, cfg)?;
    for (i, r) in out.reports.iter().enumerate() {
        if json {
            println!("{}", serde_json::to_string(r).context("encode report")?);
        } else {
            println!(
                "#{i} {} at {}: changed {:?}\n   notified ({}) {:?}",
                r.trigger,
                r.pos,
                r.changed,
                r.notified.len(),
                r.notified
            );
        }
    }
    let mismatches = check_expectations(&sc, &out);
    for m in &mismatches {
        eprintln!("expectation: {m}");
    }
    if !mismatches.is_empty() {
        bail!("{}: {} unmet expectations", sc.name, mismatches.len());
    }
    Ok(())
}

fn check(cfg: &SignalConfig) -> Result<()> {
    let mut failed = 0usize;
    let paths = loader::scenario_paths()?;
    for path in &paths {
        let sc = loader::load_scenario_file(path)?;
        let out = run_scenario(&sc, cfg)?;
        let mismatches = check_expectations(&sc, &out);
        if mismatches.is_empty() {
            tracing::info!(scenario = %sc.name, triggers = out.reports.len(), "ok");
        } else {
            failed += 1;
            for m in &mismatches {
                tracing::error!(scenario = %sc.name, "{m}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} scenarios failed", paths.len());
    }
    println!("sim-harness: {} scenarios ok", paths.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tcfg = telemetry::load_default().context("load telemetry config")?;
    let _guard = signal_core::telemetry::init_telemetry(&tcfg)?;
    let cfg = signal_config(cli.no_flood)?;
    match cli.cmd {
        Cmd::Run { path, json } => run(path, json, &cfg),
        Cmd::Check => check(&cfg),
        Cmd::Fuzz {
            seed,
            cells,
            wires,
            rounds,
        } => {
            let stats = fuzz::run(&cfg, seed, cells, wires, rounds)?;
            println!(
                "sim-harness: {rounds} layouts, {} cycles, {} wires changed, {} turn-on drops",
                stats.cycles, stats.changed, stats.turn_on_drops
            );
            Ok(())
        }
    }
}

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Parser)]
#[command(author, version, about = "Workspace automation tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// fmt + clippy -D warnings + tests + schema-check (workspace)
    Ci,
    /// Validate data/ configs and scenarios against their serde models
    SchemaCheck,
    /// Play every scenario through sim-harness
    Scenarios,
}

fn run(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("spawn")?;
    if !status.success() {
        bail!("command failed: {:?}", cmd);
    }
    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    let mut c = Command::new("cargo");
    c.args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    run(&mut c)
}

fn ci() -> Result<()> {
    cargo(&["fmt", "--all"])?;
    cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    cargo(&["test", "--workspace"])?;
    schema_check()?;
    scenarios()?;
    Ok(())
}

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..")
}

fn check_config(path: &Path) -> Result<()> {
    let txt = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    match path.file_stem().and_then(|s| s.to_str()) {
        Some("signal") => {
            data_runtime::configs::signal::parse(&txt)?;
        }
        Some("telemetry") => {
            toml::from_str::<data_runtime::configs::telemetry::TelemetryCfg>(&txt)
                .context("parse telemetry TOML")?;
        }
        _ => {
            // Unknown configs must at least be valid TOML
            toml::from_str::<toml::Value>(&txt).context("parse TOML")?;
        }
    }
    Ok(())
}

fn schema_check() -> Result<()> {
    let data = workspace_root().join("data");
    let (mut configs, mut scenarios) = (0usize, 0usize);
    for entry in walkdir::WalkDir::new(&data).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => {
                check_config(path).with_context(|| format!("validate config: {}", path.display()))?;
                configs += 1;
            }
            Some("json") if path.components().any(|c| c.as_os_str() == "scenarios") => {
                let txt = std::fs::read_to_string(path)
                    .with_context(|| format!("read {}", path.display()))?;
                data_runtime::scenario::parse_scenario(&txt)
                    .with_context(|| format!("validate scenario: {}", path.display()))?;
                scenarios += 1;
            }
            _ => {}
        }
    }
    println!("xtask: schema ok ({configs} configs, {scenarios} scenarios)");
    Ok(())
}

fn scenarios() -> Result<()> {
    cargo(&["run", "-q", "-p", "sim-harness", "--", "check"])
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Ci => ci(),
        Cmd::SchemaCheck => schema_check(),
        Cmd::Scenarios => scenarios(),
    }
}

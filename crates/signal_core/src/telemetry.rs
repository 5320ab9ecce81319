//! Telemetry bootstrap for signal tools (tracing + optional Prometheus metrics).

use anyhow::{Result, anyhow};
use data_runtime::configs::telemetry::TelemetryCfg;

pub struct TelemetryGuard;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry(cfg: &TelemetryCfg) -> Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};
    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    // Plain text unless JSON is requested; tool output shares the terminal
    let fmt_layer = if cfg.json_logs.unwrap_or(false) {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("install subscriber: {e}"))?;
    if let Some(addr) = &cfg.metrics_addr {
        let addr = match addr.parse() {
            Ok(a) => a,
            Err(_e) => {
                metrics::counter!("signal.errors_total", "site" => "telemetry.parse_addr").increment(1);
                std::net::SocketAddr::from(([127, 0, 0, 1], 9100))
            }
        };
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        if let Err(e) = builder.with_http_listener(addr).install() {
            tracing::warn!(target: "telemetry", %addr, error = %e, "metrics exporter not installed");
        }
    }
    // One-line effective config for operator visibility
    tracing::info!(
        target: "telemetry",
        log_level = ?cfg.log_level,
        json_logs = ?cfg.json_logs,
        metrics_addr = ?cfg.metrics_addr,
        "telemetry initialized"
    );
    Ok(TelemetryGuard)
}

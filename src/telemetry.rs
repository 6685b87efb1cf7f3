//! Operational counters exported on `/metrics`.
//!
//! - `bot_commands_total{command}`: handled commands by name
//! - `bot_cache_hits_total` / `bot_cache_misses_total`: `/list` cache lookups
//! - `bot_send_failures_total`: replies Telegram refused
//! - `web_requests_total{endpoint,status}`: stats page and metrics scrapes
//!
//! Without an installed recorder every call here is a no-op.

use ::metrics::increment_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installs the global Prometheus recorder and returns the handle used to
/// render the scrape output.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

pub fn record_command(command: &'static str) {
    increment_counter!("bot_commands_total", "command" => command);
}

pub fn record_cache_lookup(hit: bool) {
    if hit {
        increment_counter!("bot_cache_hits_total");
    } else {
        increment_counter!("bot_cache_misses_total");
    }
}

pub fn record_send_failure() {
    increment_counter!("bot_send_failures_total");
}

pub fn record_web_request(endpoint: &'static str, status: u16) {
    increment_counter!("web_requests_total", "endpoint" => endpoint, "status" => status.to_string());
}

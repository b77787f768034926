use std::path::Path;

use modgate_core::dispatch::CommandDispatcher;

use crate::output::{print_json, print_table};
use crate::wiring;

pub fn run(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = wiring::load_valid_config(config_path)?;
    let panel = wiring::panel_client(&config)?;

    let rt = tokio::runtime::Runtime::new()?;
    let status = rt
        .block_on(panel.query_status())
        .map_err(|failure| anyhow::anyhow!("status query failed: {failure}"))?;

    if json {
        return print_json(&status);
    }

    let r = &status.resources;
    print_table(
        &["FIELD", "VALUE"],
        vec![
            vec![
                "state".into(),
                status.current_state.clone().unwrap_or_else(|| "unknown".into()),
            ],
            vec!["suspended".into(), status.is_suspended.to_string()],
            vec!["memory".into(), format_bytes(r.memory_bytes)],
            vec!["cpu".into(), format!("{:.1}%", r.cpu_absolute)],
            vec!["disk".into(), format_bytes(r.disk_bytes)],
            vec!["network rx".into(), format_bytes(r.network_rx_bytes)],
            vec!["network tx".into(), format_bytes(r.network_tx_bytes)],
            vec!["uptime".into(), format_uptime(r.uptime)],
        ],
    );
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

// The panel reports uptime in milliseconds.
fn format_uptime(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

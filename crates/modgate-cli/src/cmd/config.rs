use clap::Subcommand;
use std::path::Path;

use modgate_core::config::WarnLevel;

use crate::output::{print_json, print_table, yes_no};
use crate::wiring;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Report every configuration problem
    Validate,

    /// Show the effective command template for each action
    Show,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config_path: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(config_path, json),
        ConfigSubcommand::Show => show(config_path, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = wiring::load_config(config_path)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    let errors = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation found {errors} error(s)");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = wiring::load_config(config_path)?;
    let registry = config.templates();

    if json {
        let templates: Vec<_> = registry.iter().collect();
        return print_json(&serde_json::json!({
            "panel": {
                "url": config.panel.url,
                "server_id": config.panel.server_id,
                "timeout_secs": config.panel.timeout_secs,
            },
            "templates": templates,
        }));
    }

    let rows = registry
        .iter()
        .map(|t| {
            vec![
                t.action.to_string(),
                t.pattern.clone(),
                yes_no(t.action.is_target_scoped()),
                yes_no(t.action.is_duration_scoped()),
                yes_no(t.action.requires_reason()),
            ]
        })
        .collect();
    print_table(&["ACTION", "PATTERN", "TARGET", "DURATION", "REASON"], rows);
    Ok(())
}

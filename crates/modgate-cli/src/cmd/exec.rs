use anyhow::Context;
use std::path::Path;

use modgate_core::config::Config;
use modgate_core::types::{ActionKind, ActionRequest, Requestor};

use crate::output::print_json;
use crate::wiring;

pub struct ExecArgs {
    pub action: String,
    pub target: Option<String>,
    pub reason: Option<String>,
    pub duration: Option<u32>,
    pub operator: Option<String>,
    pub dry_run: bool,
}

pub fn run(config_path: Option<&Path>, args: ExecArgs, json: bool) -> anyhow::Result<()> {
    let config = wiring::load_valid_config(config_path)?;
    let action: ActionKind = args.action.parse()?;

    let requestor = local_requestor(&config, args.operator.as_deref())?;
    let mut request = ActionRequest::new(action, requestor);
    request.target = args.target;
    request.reason = args.reason;
    request.duration_minutes = args.duration;
    let dry_run = args.dry_run;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let (controller, _panel) = wiring::build_controller(&config)?;

        if dry_run {
            let command = controller.preview(&request)?;
            if json {
                print_json(&serde_json::json!({ "command": command }))?;
            } else {
                println!("{command}");
            }
            return Ok(());
        }

        let submission = controller.submit_tracked(request).await;
        // The process is about to exit; let the audit delivery finish first.
        submission
            .audit
            .await
            .context("audit delivery task panicked")?;

        let result = submission.result;
        if json {
            print_json(&result)?;
        } else {
            println!("{}", result.message);
        }

        if !result.succeeded {
            let kind = result
                .error_kind
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let detail = result.error_detail.unwrap_or_default();
            anyhow::bail!("{action} failed ({kind}): {detail}");
        }
        Ok::<(), anyhow::Error>(())
    })
}

/// The requestor for someone running the CLI on the host.
///
/// `--operator` must name an operator from the config. Without it the local
/// user is treated as an administrator holding the configured admin role.
fn local_requestor(config: &Config, operator: Option<&str>) -> anyhow::Result<Requestor> {
    if let Some(name) = operator {
        let op = config
            .operator_by_name(name)
            .with_context(|| format!("no operator named '{name}' in the config"))?;
        return Ok(op.requestor());
    }
    let name = std::env::var("USER").unwrap_or_else(|_| "local".to_string());
    let mut requestor = Requestor::local_admin(name);
    if let Some(role) = &config.access.admin_role {
        requestor.roles.push(role.clone());
    }
    Ok(requestor)
}

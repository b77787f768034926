use anyhow::Context;
use std::path::Path;

use crate::output::print_json;
use crate::wiring;

/// Recent targets live in the serving process, so ask it over HTTP.
pub fn run(
    config_path: Option<&Path>,
    url: Option<String>,
    token: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let config = wiring::load_config(config_path)?;
    let base = url
        .unwrap_or_else(|| format!("http://{}", config.server.bind))
        .trim_end_matches('/')
        .to_string();
    let token = token
        .or_else(|| config.operators.first().map(|op| op.token.clone()))
        .context("no operator token given (--token or MODGATE_TOKEN)")?;

    let rt = tokio::runtime::Runtime::new()?;
    let targets: Vec<String> = rt.block_on(async {
        reqwest::Client::new()
            .get(format!("{base}/api/targets"))
            .bearer_auth(&token)
            .send()
            .await
            .with_context(|| format!("could not reach modgate at {base}"))?
            .error_for_status()?
            .json()
            .await
            .context("unexpected response from /api/targets")
    })?;

    if json {
        print_json(&targets)?;
    } else if targets.is_empty() {
        println!("No recent targets.");
    } else {
        for (i, target) in targets.iter().enumerate() {
            println!("{:>2}. {target}", i + 1);
        }
    }
    Ok(())
}

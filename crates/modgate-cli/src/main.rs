mod cmd;
mod output;
mod wiring;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "modgate",
    about = "Issue audited moderation actions against a game server through its panel API",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ./modgate.yaml, optional)
    #[arg(long, global = true, env = "MODGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the moderation HTTP API
    Serve {
        /// Address to bind (default: server.bind from the config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run a single moderation action as a local administrator
    Exec {
        /// kill, kick, tempban, ban, mute, warn, freeze, unfreeze
        action: String,
        /// Player name
        #[arg(long, short = 't')]
        target: Option<String>,
        #[arg(long, short = 'r')]
        reason: Option<String>,
        /// Ban length in minutes (tempban)
        #[arg(long, short = 'd')]
        duration: Option<u32>,
        /// Act as this operator from the config
        #[arg(long)]
        operator: Option<String>,
        /// Print the rendered command without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Query the game server's state and resource usage
    Status,

    /// List recently targeted players from a running server
    Targets {
        /// Base URL of the running API (default: http://<server.bind>)
        #[arg(long)]
        url: Option<String>,
        /// Operator token (default: first configured operator)
        #[arg(long, env = "MODGATE_TOKEN")]
        token: Option<String>,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    // RUST_LOG, when set, replaces the per-command default entirely.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Serve { bind } => cmd::serve::run(config, bind),
        Commands::Exec {
            action,
            target,
            reason,
            duration,
            operator,
            dry_run,
        } => cmd::exec::run(
            config,
            cmd::exec::ExecArgs {
                action,
                target,
                reason,
                duration,
                operator,
                dry_run,
            },
            cli.json,
        ),
        Commands::Status => cmd::status::run(config, cli.json),
        Commands::Targets { url, token } => cmd::targets::run(config, url, token, cli.json),
        Commands::Config { subcommand } => cmd::config::run(config, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

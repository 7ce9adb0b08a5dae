//! Noteplane CLI: sign in and work with a tenant's notes and members.
//!
//! # Usage
//!
//! ```bash
//! noteplane -u acmeMember -p 123 notes
//! noteplane -u acmeMember -p 123 add "Standup" --content "notes"
//! noteplane -u acmeAdmin -p 123 members --format json
//! noteplane --memory -u acmeAdmin -p 123 upgrade
//! ```

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use noteplane_client::{HttpConfig, HttpTransport, MemoryBackend};
use noteplane_core::error::NoteplaneResult;
use noteplane_core::models::tenant::Plan;
use noteplane_core::models::user::{Credential, Role};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

const DEFAULT_LOG_DIRECTIVE: &str = "noteplane=info";

#[derive(Parser)]
#[command(name = "noteplane", version, about = "Noteplane command-line client", long_about = None)]
struct Cli {
    /// Backend base URL (overrides NOTEPLANE_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long, short, env = "NOTEPLANE_USERNAME")]
    username: String,

    #[arg(long, short, env = "NOTEPLANE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Run against a seeded in-process backend instead of HTTP
    #[arg(long)]
    memory: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Output format
    #[arg(long, short, default_value = "text")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the signed-in user, tenant and quota
    Whoami,
    /// List the tenant's notes
    Notes,
    /// Create a note
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Replace a note's title and content
    Edit {
        id: i64,
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    /// Delete a note
    Delete { id: i64 },
    /// Upgrade the tenant to the pro plan (admin)
    Upgrade,
    /// List tenant members (admin)
    Members,
    /// Invite a user into the tenant (admin)
    Invite {
        email: String,
        #[arg(long, default_value = "member")]
        role: Role,
    },
    /// Change a member's plan (admin)
    ChangePlan { user_id: i64, plan: Plan },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> NoteplaneResult<()> {
    let credential = Credential::new(cli.username, cli.password);

    if cli.memory {
        tracing::info!("Using in-process backend");
        return commands::execute(MemoryBackend::seeded(), credential, cli.command, cli.format)
            .await;
    }

    let mut config = HttpConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    tracing::info!(base_url = %config.base_url, "Using HTTP backend");
    let transport = HttpTransport::new(config)?;
    commands::execute(transport, credential, cli.command, cli.format).await
}

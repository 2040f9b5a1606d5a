//! linkindex command line
//!
//! `linkindex serve` runs the HTTP server; `linkindex submit <file>` sends the
//! URLs in a file (one per line) to a running server and prints the run's log
//! as it streams.

use chrono::Utc;
use clap::{Parser, Subcommand};
use linkindex::client::{ApiClient, LogKind, Msg, Panel, RunState};
use linkindex::{Config, ProcessOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "linkindex", version, about = "Staged link promotion pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// TOML configuration file
        #[arg(short, long, env = "LINKINDEX_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Submit the URLs in FILE to a running server
    Submit {
        /// File with one URL per line
        file: PathBuf,
        /// Server base URL
        #[arg(long, env = "LINKINDEX_SERVER", default_value = "http://127.0.0.1:3000")]
        server: String,
        /// Skip the traffic stage
        #[arg(long)]
        no_traffic: bool,
        /// Skip the indexing stage
        #[arg(long)]
        no_indexing: bool,
        /// Write the log to this directory when the run ends
        #[arg(long)]
        save_log: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linkindex=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Command::Serve { config: None }) {
        Command::Serve { config } => serve(config).await,
        Command::Submit {
            file,
            server,
            no_traffic,
            no_indexing,
            save_log,
        } => {
            let options = ProcessOptions {
                simulate_traffic: !no_traffic,
                check_indexing: !no_indexing,
                ..ProcessOptions::default()
            };
            submit(file, &server, options, save_log).await
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "linkindex failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config_path: Option<PathBuf>) -> linkindex::Result<ExitCode> {
    let config = Config::load(config_path.as_deref())?;
    linkindex::api::start_api_server(Arc::new(config)).await?;
    Ok(ExitCode::SUCCESS)
}

async fn submit(
    file: PathBuf,
    server: &str,
    options: ProcessOptions,
    save_log: Option<PathBuf>,
) -> linkindex::Result<ExitCode> {
    let input = tokio::fs::read_to_string(&file).await?;
    let mut client = ApiClient::new(server)?;
    if let Some(dir) = &save_log {
        client = client.with_save_dir(dir);
    }

    let mut panel = Panel::new();
    let mut printed: Option<u64> = None;
    let mut print_new = |panel: &Panel| {
        for entry in panel.log().since(printed) {
            let line = format!(
                "[{}] {}: {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.kind,
                entry.message
            );
            match entry.kind {
                LogKind::Error => eprintln!("{line}"),
                LogKind::Info | LogKind::Success => println!("{line}"),
            }
            printed = Some(entry.id);
        }
    };

    client
        .dispatch(&mut panel, Msg::InputChanged(input), &mut print_new)
        .await;
    client
        .dispatch(&mut panel, Msg::OptionsChanged(options), &mut print_new)
        .await;
    client
        .dispatch(&mut panel, Msg::StartClicked, &mut print_new)
        .await;

    for card in panel.cards() {
        println!("{}: {}", card.title, card.body);
    }
    if !panel.files().is_empty() {
        println!("Generated files:");
        for row in panel.files() {
            println!("  {} ({}) {}", row.name, row.size, row.download_path);
        }
    }

    if save_log.is_some() {
        client
            .dispatch(&mut panel, Msg::SaveLogClicked { at: Utc::now() }, &mut print_new)
            .await;
    }

    Ok(match panel.run_state() {
        RunState::Finished => ExitCode::SUCCESS,
        RunState::Failed { .. } | RunState::Idle | RunState::Running => ExitCode::FAILURE,
    })
}

//! Network Recorder Probe
//!
//! Sends GET requests to the URLs given on the command line through the
//! recorded ambient fetch, optionally replays each of them, then prints the
//! recorded history and the aggregate statistics.
//!
//! # Usage
//!
//! ```text
//! netlog-probe [--repeat] [--json] [--config <PATH>] <URLS>...
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use clap::Parser;
use log::{error, info};
use netlog::config::{get_config, load_config_from_path};
use netlog::history::{format_entry_list, format_stats};
use netlog::interceptor::{fetch, setup_network_logging, SetupOptions};
use netlog::transport::FetchRequest;
use netlog::NetworkRecorder;
use std::path::PathBuf;
use std::process::ExitCode;

/// Records HTTP calls to the given URLs and prints the history.
#[derive(Debug, Parser)]
#[command(name = "netlog-probe", version, about)]
struct Args {
    /// URLs to request with GET
    #[arg(required = true)]
    urls: Vec<String>,

    /// Replay every recorded call once
    #[arg(long)]
    repeat: bool,

    /// Print the history as JSON instead of one line per call
    #[arg(long)]
    json: bool,

    /// JSON settings file with a "netlog" section
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match load_config_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => get_config(),
    };

    info!(
        "netlog-probe {} recording in {} mode",
        env!("CARGO_PKG_VERSION"),
        config.resolved_environment()
    );

    let recorder = NetworkRecorder::new(config);
    let detach = setup_network_logging(&recorder, SetupOptions::new());

    for url in &args.urls {
        match fetch::fetch(FetchRequest::get(url.as_str())).await {
            Ok(response) => info!("{} -> {}", url, response.status),
            Err(e) => error!("{} -> {}", url, e),
        }
    }

    if args.repeat {
        for entry in recorder.entries().iter().rev() {
            let replayed = recorder.repeat(entry).await;
            info!("Replayed {} as {}", entry.id, replayed.id);
        }
    }

    detach.detach();

    if args.json {
        match serde_json::to_string_pretty(&recorder.entries()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize history: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for line in format_entry_list(&recorder.entries()) {
            println!("{}", line);
        }
    }

    match recorder.stats() {
        Some(stats) => println!("{}", format_stats(&stats)),
        None => println!("No requests recorded"),
    }

    ExitCode::SUCCESS
}

#![forbid(unsafe_code)]

//! `podmigd-ctl` — operator CLI companion for `podmigd`.
//!
//! Drives the migration API over HTTP. Designed for manual triggering
//! and inspection when an orchestrating controller is not in play.

use clap::{Parser, Subcommand};
use reqwest::StatusCode;

#[derive(Debug, Parser)]
#[command(
    name = "podmigd-ctl",
    about = "Operator CLI for the podmigd migration API",
    version,
    long_about = None
)]
struct Cli {
    /// Base URL of the podmigd server.
    #[arg(long, default_value = "http://127.0.0.1:8750")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Migrate a pod and print the checkpoint result.
    ///
    /// Blocks until the pod's state capture is complete.
    Migrate {
        /// UID of the pod to migrate.
        pod_uid: String,
        /// Components to checkpoint (comma-separated or repeated).
        #[arg(long, value_delimiter = ',')]
        components: Vec<String>,
    },

    /// Show the live migration session for a pod, if any.
    Status {
        /// UID of the pod to inspect.
        pod_uid: String,
    },

    /// Probe server liveness.
    Health,
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let client = reqwest::Client::new();

    let response = match &args.command {
        Command::Migrate {
            pod_uid,
            components,
        } => {
            let url = format!(
                "{}/migrate/{pod_uid}?components={}",
                args.server,
                components.join(",")
            );
            client.post(url).send().await
        }
        Command::Status { pod_uid } => {
            let url = format!("{}/migrations/{pod_uid}", args.server);
            client.get(url).send().await
        }
        Command::Health => {
            let url = format!("{}/health", args.server);
            client.get(url).send().await
        }
    };

    let response = match response {
        Ok(response) => response,
        Err(err) => {
            eprintln!("Failed to reach server: {err}");
            eprintln!("Is podmigd running at {}?", args.server);
            std::process::exit(1);
        }
    };

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.is_success() {
        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(json) => {
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or(body));
            }
            Err(_) => println!("{body}"),
        }
    } else {
        match status {
            StatusCode::NOT_FOUND => eprintln!("Not found: {body}"),
            StatusCode::CONFLICT => eprintln!("Conflict: {body}"),
            _ => eprintln!("Server error ({status}): {body}"),
        }
        std::process::exit(1);
    }
}

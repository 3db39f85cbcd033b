#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the TtT relay.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use ttt_relay_feed::HttpFeed;
use ttt_relay_poller::{CursorStore, RunConfig, SnapshotSummary, relay_file, relay_url, watch};
use ttt_relay_report::ReportDefaults;
use ttt_relay_uploader::HttpUploader;

#[derive(Parser)]
#[command(
    name = "ttt_relay_poller",
    about = "Relays TweakTheTweet CSV snapshots to an incident-mapping API"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every relaying mode.
#[derive(Args)]
struct RelayArgs {
    /// Event name to admit (repeatable; `#` marker and case are ignored)
    #[arg(long = "event", required = true)]
    events: Vec<String>,
    /// Only relay records with this TtT id or higher
    #[arg(long, default_value_t = 1)]
    start_id: u64,
    /// Category id for reports that carry coordinates
    #[arg(long, default_value = "67")]
    category: String,
    /// Category id for reports missing coordinates
    #[arg(long, default_value = "68")]
    no_location_category: String,
    /// Latitude substituted when a record has no coordinates
    #[arg(long, default_value = "0.0")]
    default_lat: String,
    /// Longitude substituted when a record has no coordinates
    #[arg(long, default_value = "0.0")]
    default_lng: String,
    /// Title substituted when a record has none (defaults to the event name)
    #[arg(long)]
    default_title: Option<String>,
    /// Location label substituted when a record has none
    #[arg(long, default_value = "Undefined")]
    default_location: String,
    /// Path of the accepted-outcomes log
    #[arg(long, default_value = "ttt_uploaded.csv")]
    uploaded: PathBuf,
    /// Path of the rejected-outcomes log
    #[arg(long, default_value = "ttt_rejected.csv")]
    rejected: PathBuf,
    /// Base URL of the incident-mapping site (reports go to `<url>/api`)
    #[arg(long)]
    site_url: String,
    /// Bearer token attached to every create-report call
    #[arg(long)]
    api_token: Option<String>,
    /// Treat snapshot bodies as gzip-compressed
    #[arg(long)]
    gzip: bool,
}

impl RelayArgs {
    fn run_config(&self, fetch_interval: Duration, max_files: Option<u64>) -> RunConfig {
        RunConfig {
            allowed_events: self.events.clone(),
            start_record_id: self.start_id,
            defaults: ReportDefaults {
                category: self.category.clone(),
                no_location_category: self.no_location_category.clone(),
                default_latitude: self.default_lat.clone(),
                default_longitude: self.default_lng.clone(),
                default_title: self.default_title.clone(),
                default_location: self.default_location.clone(),
            },
            uploaded_log: self.uploaded.clone(),
            rejected_log: self.rejected.clone(),
            fetch_interval,
            max_files,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the sequence feed indefinitely, relaying each new snapshot
    Watch {
        #[command(flatten)]
        relay: RelayArgs,
        /// URL prefix of the sequence feed; file N lives at `<prefix><N>.csv`
        #[arg(long)]
        url_prefix: String,
        /// Path of the durable resume-state file
        #[arg(long, default_value = "ttt_relay_state.toml")]
        state_file: PathBuf,
        /// Seconds to wait when the next snapshot is not available yet
        #[arg(long, default_value_t = 300)]
        interval: u64,
        /// Stop after this many processed snapshots (for testing)
        #[arg(long)]
        max_files: Option<u64>,
    },
    /// Relay a single snapshot from an explicit URL
    Url {
        /// Snapshot URL
        url: String,
        #[command(flatten)]
        relay: RelayArgs,
        /// Load and advance this resume-state file (off by default)
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
    /// Relay a single local snapshot file
    File {
        /// Snapshot file path
        path: PathBuf,
        #[command(flatten)]
        relay: RelayArgs,
        /// Load and advance this resume-state file (off by default)
        #[arg(long)]
        state_file: Option<PathBuf>,
    },
    /// Print the persisted resume state
    Cursor {
        /// Path of the durable resume-state file
        #[arg(long, default_value = "ttt_relay_state.toml")]
        state_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let client = reqwest::Client::builder()
        .user_agent("ttt-relay/0.1")
        .build()?;

    match cli.command {
        Commands::Watch {
            relay,
            url_prefix,
            state_file,
            interval,
            max_files,
        } => {
            let config = relay.run_config(Duration::from_secs(interval), max_files);
            let feed = HttpFeed::new(client.clone(), &url_prefix).with_gzip(relay.gzip);
            let sink = HttpUploader::new(client, &relay.site_url).with_token(relay.api_token.clone());
            let store = CursorStore::new(state_file);

            watch(&feed, &sink, &config, &store).await;
        }
        Commands::Url {
            url,
            relay,
            state_file,
        } => {
            let config = relay.run_config(Duration::ZERO, None);
            let sink = HttpUploader::new(client.clone(), &relay.site_url)
                .with_token(relay.api_token.clone());
            let store = state_file.map(CursorStore::new);

            let summary =
                relay_url(&client, &url, relay.gzip, &sink, &config, store.as_ref()).await?;
            print_summary(&summary);
        }
        Commands::File {
            path,
            relay,
            state_file,
        } => {
            let config = relay.run_config(Duration::ZERO, None);
            let sink = HttpUploader::new(client, &relay.site_url).with_token(relay.api_token.clone());
            let store = state_file.map(CursorStore::new);

            let summary = relay_file(&path, &sink, &config, store.as_ref()).await?;
            print_summary(&summary);
        }
        Commands::Cursor { state_file } => {
            let cursor = CursorStore::new(state_file).load();
            println!("next record id:      {}", cursor.next_record_id);
            println!("next file sequence:  {}", cursor.next_file_sequence);
            if let Some(updated_at) = cursor.updated_at {
                println!("last advanced:       {updated_at}");
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &SnapshotSummary) {
    println!(
        "{} row(s), {} malformed, {} admitted, {} accepted, {} rejected",
        summary.rows, summary.malformed, summary.admitted, summary.accepted, summary.rejected
    );
}

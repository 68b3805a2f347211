//! Status command implementation
//!
//! Shows where the input file sits, what the error directory holds and
//! how many rows the store has left to export.

use super::{connect_store, EXIT_CONFIG, EXIT_OK, EXIT_STORE};
use crate::adapters::store::StoreCounts;
use crate::config::load_config;
use crate::core::lifecycle::{FileLifecycle, FileState, LifecycleSnapshot};
use clap::Args;
use serde::Serialize;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only inspect the file system; do not connect to the store
    #[arg(long)]
    pub files_only: bool,

    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    files: LifecycleSnapshot,
    store: Option<StoreCounts>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let lifecycle = FileLifecycle::new(&config.paths)?;
        let files = lifecycle.observe();

        let store = if self.files_only {
            None
        } else {
            let counts = match connect_store(&config).await {
                Ok(store) => store.count_records().await,
                Err(e) => Err(e),
            };
            match counts {
                Ok(counts) => Some(counts),
                Err(e) => {
                    println!("❌ Failed to query store");
                    println!("   Error: {e}");
                    return Ok(EXIT_STORE);
                }
            }
        };

        let report = StatusReport { files, store };
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(EXIT_OK);
        }

        println!("📊 Ferry Status");
        println!();
        print_files(&lifecycle, &report.files);
        if let Some(counts) = report.store {
            println!();
            println!("Store:");
            println!("  Total rows:       {}", counts.total);
            println!("  Awaiting export:  {}", counts.unprocessed);
        }
        println!();
        Ok(EXIT_OK)
    }
}

fn print_files(lifecycle: &FileLifecycle, files: &LifecycleSnapshot) {
    let state = match files.state {
        FileState::Absent => "⏸️  No input",
        FileState::Incoming => "📥 Waiting for ingest",
        FileState::InFlight => "🔄 In flight",
        FileState::Archived => "✅ Last input archived",
        FileState::Errored => "❌ Blocked by error directory",
    };
    let error_entries = files
        .error_entries
        .map_or_else(|| "unreadable".to_string(), |n| n.to_string());

    println!("Files:");
    println!("  State:            {state}");
    println!(
        "  {:<17} {} ({})",
        "Incoming:",
        lifecycle.incoming_path().display(),
        present(files.incoming_present)
    );
    println!(
        "  {:<17} {} ({})",
        "In flight:",
        lifecycle.in_flight_path().display(),
        present(files.in_flight_present)
    );
    println!(
        "  {:<17} {} ({error_entries} entries)",
        "Error directory:",
        lifecycle.error_dir().display()
    );
    println!("  {:<17} {}", "Archived copies:", files.archived_files);
    println!(
        "  {:<17} {} ({})",
        "Output:",
        lifecycle.output_path().display(),
        present(files.output_present)
    );
}

fn present(flag: bool) -> &'static str {
    if flag {
        "present"
    } else {
        "absent"
    }
}

//! Trigger command implementation
//!
//! Runs a single tick of one job through the same admission gate and file
//! transitions the scheduler uses.

use super::{connect_store, EXIT_CONFIG, EXIT_OK, EXIT_RUN_FAILED, EXIT_STORE};
use crate::config::load_config;
use crate::core::lifecycle::FileLifecycle;
use crate::core::scheduler::{RunStatus, Scheduler};
use crate::domain::JobKind;
use clap::Args;

/// Arguments for the trigger command
#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Job to run (ingest or export)
    pub job: JobKind,

    /// Print the run descriptor as JSON
    #[arg(long)]
    pub json: bool,
}

impl TriggerArgs {
    /// Execute the trigger command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(job = %self.job, "Triggering one-shot run");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        FileLifecycle::new(&config.paths)?.ensure_directories()?;

        let store = match connect_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to connect to store: {e}");
                return Ok(EXIT_STORE);
            }
        };

        let scheduler = Scheduler::from_config(&config, store)?;
        let descriptor = scheduler.tick(self.job).await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        } else {
            let icon = match descriptor.status {
                RunStatus::Succeeded => "✅",
                RunStatus::Failed => "❌",
                RunStatus::Skipped(_) => "⏭️ ",
            };
            println!("{icon} {} {}", descriptor.job, descriptor.status);
            println!("  Run ID:        {}", descriptor.run_id);
            println!("  Items read:    {}", descriptor.items_read);
            println!("  Items written: {}", descriptor.items_written);
            if let Some(ref failure) = descriptor.failure {
                println!("  Failure:       {failure}");
            }
        }

        Ok(match descriptor.status {
            RunStatus::Failed => EXIT_RUN_FAILED,
            RunStatus::Succeeded | RunStatus::Skipped(_) => EXIT_OK,
        })
    }
}

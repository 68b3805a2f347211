//! Run command implementation
//!
//! Starts both cadences and blocks until a shutdown signal arrives.

use super::{connect_store, EXIT_CONFIG, EXIT_FATAL, EXIT_OK, EXIT_STORE};
use crate::config::load_config;
use crate::core::lifecycle::FileLifecycle;
use crate::core::scheduler::{RunHooks, RunStatus, Scheduler};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Evaluate the cadences immediately instead of after the configured start delay
    #[arg(long)]
    pub no_start_delay: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting scheduler");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration error");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        FileLifecycle::new(&config.paths)?.ensure_directories()?;

        let store = match connect_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to store");
                eprintln!("Failed to connect to store: {e}");
                return Ok(EXIT_STORE);
            }
        };

        let hooks = RunHooks::new()
            .on_before_run(|job| tracing::debug!(job = %job, "Run starting"))
            .on_after_run(|job, descriptor| {
                if descriptor.status == RunStatus::Failed {
                    eprintln!(
                        "❌ {job} run {} failed: {}",
                        descriptor.run_id,
                        descriptor.failure.as_deref().unwrap_or("unknown error")
                    );
                }
            });

        let mut scheduler = Scheduler::from_config(&config, store)?.with_hooks(hooks);
        if self.no_start_delay {
            scheduler = scheduler.with_start_delay(Duration::ZERO);
        }

        println!("🚀 Scheduler running (Ctrl+C to stop)");
        for cadence in scheduler.cadences() {
            println!("  {:<8} {}", cadence.job(), cadence.expression());
        }

        match Arc::new(scheduler).run(shutdown_signal).await {
            Ok(()) => {
                println!("Scheduler stopped.");
                Ok(EXIT_OK)
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduler failed");
                eprintln!("Scheduler failed: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_default() {
        let args = RunArgs {
            no_start_delay: false,
        };
        assert!(!args.no_start_delay);
    }
}

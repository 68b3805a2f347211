//! Validate config command implementation

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::StoreBackend;
use crate::core::scheduler::Cadence;
use crate::domain::JobKind;
use chrono::Utc;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config also runs validate()
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Incoming File: {}", config.paths.incoming_file.display());
        println!("  In-flight File: {}", config.paths.in_flight_file.display());
        println!("  Error Directory: {}", config.paths.error_dir.display());
        println!("  Output File: {}", config.paths.output_file.display());
        println!("  Chunk Size: {}", config.pipeline.chunk_size);
        println!("  Delimiter: {:?}", config.pipeline.delimiter);

        match config.store.backend {
            StoreBackend::Memory => println!("  Store: in-memory"),
            StoreBackend::PostgreSQL => {
                println!("  Store: PostgreSQL");
                if let Some(ref pg_config) = config.postgresql {
                    let conn: &str = pg_config.connection_string.expose_secret().as_ref();
                    println!(
                        "  PostgreSQL Connection: {}",
                        conn.split('@').next_back().unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
        }

        println!("  Start Delay: {}s", config.schedule.start_delay_secs);
        let now = Utc::now();
        for (job, expr) in [
            (JobKind::Ingest, &config.schedule.ingest_cron),
            (JobKind::Export, &config.schedule.export_cron),
        ] {
            let cadence = Cadence::parse(job, expr)?;
            let next: Vec<String> = cadence
                .upcoming(now, 3)
                .iter()
                .map(|t| t.format("%H:%M:%S").to_string())
                .collect();
            println!("  {job} cadence: {expr} (next: {})", next.join(", "));
        }
        println!();

        Ok(EXIT_OK)
    }
}

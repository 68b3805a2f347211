//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{FerryConfig, StoreBackend};
use super::secret_string;
use crate::domain::errors::FerryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FerryConfig
/// 4. Applies environment variable overrides (FERRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use ferry::config::loader::load_config;
///
/// let config = load_config("ferry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FerryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FerryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FerryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: FerryConfig = toml::from_str(&contents)
        .map_err(|e| FerryError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        FerryError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FerryError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FerryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using FERRY_* prefix
///
/// Environment variables follow the pattern: FERRY_<SECTION>_<KEY>
/// For example: FERRY_PATHS_INCOMING_FILE, FERRY_PIPELINE_CHUNK_SIZE
fn apply_env_overrides(config: &mut FerryConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("FERRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Path overrides
    if let Ok(val) = std::env::var("FERRY_PATHS_INCOMING_FILE") {
        config.paths.incoming_file = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FERRY_PATHS_IN_FLIGHT_FILE") {
        config.paths.in_flight_file = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FERRY_PATHS_ERROR_DIR") {
        config.paths.error_dir = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("FERRY_PATHS_ERROR_FILE_NAME") {
        config.paths.error_file_name = Some(val);
    }
    if let Ok(val) = std::env::var("FERRY_PATHS_OUTPUT_FILE") {
        config.paths.output_file = PathBuf::from(val);
    }

    // Schedule overrides
    if let Ok(val) = std::env::var("FERRY_SCHEDULE_INGEST_CRON") {
        config.schedule.ingest_cron = val;
    }
    if let Ok(val) = std::env::var("FERRY_SCHEDULE_EXPORT_CRON") {
        config.schedule.export_cron = val;
    }
    if let Ok(val) = std::env::var("FERRY_SCHEDULE_START_DELAY_SECS") {
        if let Ok(delay) = val.parse() {
            config.schedule.start_delay_secs = delay;
        }
    }

    // Pipeline overrides
    if let Ok(val) = std::env::var("FERRY_PIPELINE_CHUNK_SIZE") {
        if let Ok(size) = val.parse() {
            config.pipeline.chunk_size = size;
        }
    }
    if let Ok(val) = std::env::var("FERRY_PIPELINE_DELIMITER") {
        config.pipeline.delimiter = val;
    }

    // Store overrides
    if let Ok(val) = std::env::var("FERRY_STORE_BACKEND") {
        match val.to_lowercase().as_str() {
            "postgresql" => config.store.backend = StoreBackend::PostgreSQL,
            "memory" => config.store.backend = StoreBackend::Memory,
            other => tracing::warn!(backend = %other, "Ignoring unknown FERRY_STORE_BACKEND"),
        }
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("FERRY_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("FERRY_POSTGRESQL_MAX_CONNECTIONS") {
            if let Ok(max) = val.parse() {
                pg_config.max_connections = max;
            }
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("FERRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("FERRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FERRY_LOADER_TEST_VAR", "test_value");
        let input = "dir = \"${FERRY_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "dir = \"test_value\"\n");
        std::env::remove_var("FERRY_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FERRY_LOADER_COMMENTED");
        let input = "# uses ${FERRY_LOADER_COMMENTED}";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "# uses ${FERRY_LOADER_COMMENTED}\n");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FERRY_LOADER_MISSING_VAR");
        let input = "password = \"${FERRY_LOADER_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[paths]
incoming_file = "/data/in/input.csv"
in_flight_file = "/data/process/input.csv"
error_dir = "/data/error"
output_file = "/data/out/output"

[store]
backend = "memory"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.pipeline.chunk_size, 5);
        assert_eq!(config.paths.error_dir, PathBuf::from("/data/error"));
    }
}

//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SensorSyncConfig;
use crate::domain::errors::SyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into [`SensorSyncConfig`]
/// 4. Applies environment variable overrides (SENSORSYNC_* prefix)
/// 5. Validates the ambient sections
///
/// # Errors
///
/// Returns [`SyncError::Configuration`] if the file cannot be read, a
/// referenced environment variable is missing, the TOML is malformed or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use sensorsync::config::load_config;
///
/// let config = load_config("sensorsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SensorSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    tracing::debug!(path = %path.display(), "Loading configuration");
    load_config_from_str(&contents)
}

/// Parses configuration text; see [`load_config`]
pub fn load_config_from_str(contents: &str) -> Result<SensorSyncConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: SensorSyncConfig = toml::from_str(&contents)
        .map_err(|e| SyncError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| SyncError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("environment variable pattern is valid")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
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
        return Err(SyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the SENSORSYNC_* prefix
///
/// Variables follow the pattern `SENSORSYNC_<SECTION>_<KEY>`, for example
/// `SENSORSYNC_HTTP_TIMEOUT_SECONDS`. Unparseable numeric or boolean values
/// are ignored.
fn apply_env_overrides(config: &mut SensorSyncConfig) {
    if let Ok(val) = std::env::var("SENSORSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("SENSORSYNC_HTTP_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.http.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("SENSORSYNC_HTTP_USER_AGENT") {
        config.http.user_agent = Some(val);
    }
    if let Ok(val) = std::env::var("SENSORSYNC_HTTP_CONTACT_EMAIL") {
        config.http.contact_email = Some(val);
    }

    if let Ok(val) = std::env::var("SENSORSYNC_LOGGING_LOCAL_ENABLED") {
        if let Ok(enabled) = val.parse() {
            config.logging.local_enabled = enabled;
        }
    }
    if let Ok(val) = std::env::var("SENSORSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

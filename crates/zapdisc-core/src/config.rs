use crate::app_config::{AppConfig, Environment, DEFAULT_RELAYS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing is decoupled from the real environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("ZAPDISC_ENV", "development"));
    let log_level = or_default("ZAPDISC_LOG_LEVEL", "info");

    let relays = match lookup("ZAPDISC_RELAYS") {
        Ok(raw) => parse_relays(&raw)?,
        Err(_) => DEFAULT_RELAYS.iter().map(|r| (*r).to_string()).collect(),
    };

    let lookback_secs = parse_u64("ZAPDISC_LOOKBACK_SECS", "21600")?;
    let post_limit = parse_usize("ZAPDISC_POST_LIMIT", "500")?;
    let sample_size = parse_usize("ZAPDISC_SAMPLE_SIZE", "20")?;
    let notes_per_author = parse_usize("ZAPDISC_NOTES_PER_AUTHOR", "10")?;
    let timeout_ms = parse_u64("ZAPDISC_TIMEOUT_MS", "10000")?;
    let relay_grace_ms = parse_u64("ZAPDISC_RELAY_GRACE_MS", "1000")?;
    let note_feed_limit = parse_usize("ZAPDISC_NOTE_FEED_LIMIT", "20")?;
    let note_feed_timeout_ms = parse_u64("ZAPDISC_NOTE_FEED_TIMEOUT_MS", "5000")?;

    if timeout_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ZAPDISC_TIMEOUT_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        relays,
        lookback_secs,
        post_limit,
        sample_size,
        notes_per_author,
        timeout_ms,
        relay_grace_ms,
        note_feed_limit,
        note_feed_timeout_ms,
    })
}

/// Split a comma-separated relay list, trimming whitespace and dropping blanks.
fn parse_relays(raw: &str) -> Result<Vec<String>, ConfigError> {
    let relays: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect();

    if relays.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "ZAPDISC_RELAYS".to_string(),
            reason: "at least one relay URL is required".to_string(),
        });
    }

    if let Some(bad) = relays
        .iter()
        .find(|r| !r.starts_with("ws://") && !r.starts_with("wss://"))
    {
        return Err(ConfigError::InvalidEnvVar {
            var: "ZAPDISC_RELAYS".to_string(),
            reason: format!("relay URL must use ws:// or wss://: {bad}"),
        });
    }

    Ok(relays)
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

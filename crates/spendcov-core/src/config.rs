use chrono::NaiveDate;

use crate::app_config::{AppConfig, Environment};
use crate::options::{
    BrandKey, CacheTtl, ClosureFilter, CoverageOptions, ReportingWindow, DEFAULT_WINDOW_END,
    DEFAULT_WINDOW_START,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_date = |var: &str, default: &str| -> Result<NaiveDate, ConfigError> {
        NaiveDate::parse_from_str(&or_default(var, default), "%Y-%m-%d")
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("SPENDCOV_ENV", "development"))?;

    let bind_addr = parse_addr("SPENDCOV_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("SPENDCOV_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("SPENDCOV_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("SPENDCOV_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("SPENDCOV_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let window = ReportingWindow::new(
        parse_date("SPENDCOV_WINDOW_START", DEFAULT_WINDOW_START)?,
        parse_date("SPENDCOV_WINDOW_END", DEFAULT_WINDOW_END)?,
    )?;
    let closure_filter = or_default("SPENDCOV_CLOSURE_FILTER", "exclude-closed")
        .parse::<ClosureFilter>()
        .map_err(|e| invalid("SPENDCOV_CLOSURE_FILTER", e))?;
    let brand_key = or_default("SPENDCOV_BRAND_KEY", "name")
        .parse::<BrandKey>()
        .map_err(|e| invalid("SPENDCOV_BRAND_KEY", e))?;
    let cache_ttl = or_default("SPENDCOV_CACHE_TTL_SECS", "3600")
        .parse::<CacheTtl>()
        .map_err(|e| invalid("SPENDCOV_CACHE_TTL_SECS", e))?;

    let rate_limit_per_minute = parse_usize("SPENDCOV_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        coverage: CoverageOptions {
            window,
            closure_filter,
            brand_key,
            cache_ttl,
        },
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SPENDCOV_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Client configuration resolved from flags, then environment, then defaults.

use stockscope_core::ClientConfig;
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

pub const API_URL_ENV: &str = "STOCKSCOPE_API_URL";
pub const API_URL_FALLBACK_ENV: &str = "API_URL";
pub const TIMEOUT_ENV: &str = "STOCKSCOPE_TIMEOUT_MS";

pub fn resolve(cli: &Cli) -> Result<ClientConfig, CliError> {
    resolve_with(cli.api_url.as_deref(), cli.timeout_ms, |key| {
        std::env::var(key).ok()
    })
}

/// Resolution with an injectable environment lookup.
pub fn resolve_with<F>(
    api_url: Option<&str>,
    timeout_ms: Option<u64>,
    env: F,
) -> Result<ClientConfig, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());

    let base_url = api_url
        .map(str::to_owned)
        .or_else(|| non_empty(API_URL_ENV))
        .or_else(|| non_empty(API_URL_FALLBACK_ENV))
        .unwrap_or_else(|| String::from(ClientConfig::DEFAULT_BASE_URL));

    let timeout_ms = match timeout_ms {
        Some(value) => value,
        None => match non_empty(TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CliError::Config(format!("{TIMEOUT_ENV} must be a whole number, got '{raw}'"))
            })?,
            None => ClientConfig::DEFAULT_TIMEOUT_MS,
        },
    };
    if timeout_ms == 0 {
        return Err(CliError::Config(String::from(
            "timeout must be greater than zero",
        )));
    }

    let base_url = base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(CliError::Config(format!(
            "API URL must start with http:// or https://, got '{base_url}'"
        )));
    }

    debug!(base_url, timeout_ms, "resolved client configuration");
    Ok(ClientConfig::new(base_url).with_timeout_ms(timeout_ms))
}

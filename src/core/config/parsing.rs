use std::env;
use std::str::FromStr;

use super::types::ConfigError;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Trimmed value of `key`; unset and blank variables both read as `None`.
pub(super) fn var(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

pub(super) fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

/// First variable in `keys` that is set, so aliases can be listed by precedence.
pub(super) fn first_var(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| var(key))
}

pub(super) fn number<T: FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    match raw.parse() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::Invalid { key, value: raw }),
    }
}

pub(super) fn flag(raw: &str) -> bool {
    ["1", "true", "yes", "on"].iter().any(|truthy| raw.eq_ignore_ascii_case(truthy))
}

/// Accepts `["http://a","http://b"]` or `http://a, http://b`; empty input yields the
/// local frontend origin.
pub(super) fn origins(key: &'static str, raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let parsed = match raw {
        Some(raw) if raw.starts_with('[') => serde_json::from_str::<Vec<String>>(&raw)
            .map_err(|_| ConfigError::InvalidOrigins { key, value: raw.clone() })?,
        Some(raw) => raw.split(',').map(|item| item.trim().to_string()).collect(),
        None => Vec::new(),
    };

    let origins: Vec<String> = parsed.into_iter().filter(|origin| !origin.is_empty()).collect();
    if origins.is_empty() {
        return Ok(vec![DEFAULT_ORIGIN.to_string()]);
    }
    Ok(origins)
}

//! INI parsing: the single place where key names map to struct fields.

use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::{ConfigFile, ConfigFileError};

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [routing] section
    if let Some(section) = ini.section(Some("routing")) {
        if let Some(v) = section.get("service_url") {
            let v = v.trim();
            if !v.is_empty() {
                config.routing.service_url = Some(v.to_string());
            }
        }
        if let Some(timeout) = parse_number::<u64>(section, "routing", "timeout", "seconds")? {
            if timeout == 0 {
                return Err(invalid("routing", "timeout", "0", "must be a positive integer (seconds)"));
            }
            config.routing.timeout = timeout;
        }
    }

    // [engine] section
    if let Some(section) = ini.section(Some("engine")) {
        if let Some(v) = parse_number(section, "engine", "debounce_ms", "milliseconds")? {
            config.engine.debounce_ms = v;
        }
        if let Some(v) = parse_number(section, "engine", "ready_retry_ms", "milliseconds")? {
            config.engine.ready_retry_ms = v;
        }
        if let Some(v) = parse_number(section, "engine", "max_ready_retries", "retries")? {
            config.engine.max_ready_retries = v;
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    unit: &str,
) -> Result<Option<T>, ConfigFileError> {
    let Some(v) = section.get(key) else {
        return Ok(None);
    };
    v.trim().parse().map(Some).map_err(|_| {
        invalid(
            section_name,
            key,
            v,
            &format!("must be a non-negative integer ({})", unit),
        )
    })
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

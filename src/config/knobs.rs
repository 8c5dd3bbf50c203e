//! Lenient integer knobs.
//!
//! Socket-creation knobs are read once per use and never fail: a missing
//! value silently takes the default, while a value of the wrong type, an
//! unparsable string or an out-of-range number logs a warning and takes the
//! default.

use std::fmt::Display;

use toml::Value;

use super::toml::NetworkSection;
use crate::socket::{DEFAULT_BIND_RETRIES, DEFAULT_MAX_PORT, DEFAULT_MIN_PORT, NetworkSettings};

/// Reads an integer knob, falling back to `default`.
///
/// Integers and strings holding an integer are accepted.
pub fn integer_knob<T>(name: &str, value: Option<&Value>, default: T) -> T
where
    T: TryFrom<i64> + Copy + Display,
{
    let Some(value) = value else {
        return default;
    };

    let raw = match value {
        Value::Integer(raw) => Some(*raw),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    match raw.map(T::try_from) {
        Some(Ok(parsed)) => parsed,
        Some(Err(_)) => {
            tracing::warn!(knob = name, value = %value, default = %default, "Knob out of range, using default");
            default
        }
        None => {
            tracing::warn!(knob = name, value = %value, default = %default, "Malformed knob, using default");
            default
        }
    }
}

/// Builds [`NetworkSettings`] from the `[network]` section.
///
/// A port range whose minimum exceeds its maximum is discarded in favour
/// of the default range.
#[must_use]
pub fn network_settings(section: &NetworkSection) -> NetworkSettings {
    let bind_retries = integer_knob("bind_retries", section.bind_retries.as_ref(), DEFAULT_BIND_RETRIES);
    let mut min_port = integer_knob("min_port", section.min_port.as_ref(), DEFAULT_MIN_PORT);
    let mut max_port = integer_knob("max_port", section.max_port.as_ref(), DEFAULT_MAX_PORT);

    if min_port > max_port {
        tracing::warn!(min_port, max_port, "Port range is inverted, using default range");
        min_port = DEFAULT_MIN_PORT;
        max_port = DEFAULT_MAX_PORT;
    }

    NetworkSettings {
        bind_retries,
        min_port,
        max_port,
    }
}

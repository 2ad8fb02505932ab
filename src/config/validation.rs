use std::collections::HashSet;
use std::time::Duration;

use super::schema::Config;
use crate::commands::RetryPolicy;
use crate::logging::normalize_level;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.brackets.is_empty() {
        errors.push("brackets: at least one bracket is required".to_string());
    }
    let mut seen = HashSet::new();
    for (i, bracket) in config.brackets.iter().enumerate() {
        if bracket.trim().is_empty() {
            errors.push(format!("brackets[{}]: must not be blank", i));
        } else if !seen.insert(bracket.as_str()) {
            errors.push(format!("brackets[{}]: duplicate bracket '{}'", i, bracket));
        }
    }

    if config.retry.attempts == 0 {
        errors.push("retry.attempts: must be at least 1".to_string());
    }
    let base = parse_delay("retry.base_delay", &config.retry.base_delay, &mut errors);
    let max = parse_delay("retry.max_delay", &config.retry.max_delay, &mut errors);
    if let (Some(base), Some(max)) = (base, max) {
        if base > max {
            errors.push(format!(
                "retry.base_delay: {} is longer than retry.max_delay {}",
                config.retry.base_delay, config.retry.max_delay
            ));
        }
    }

    if let Some(ref level) = config.log_level {
        if normalize_level(level).is_err() {
            errors.push(format!(
                "log_level: unknown level '{}' (expected off, error, warn, info, debug or trace)",
                level
            ));
        }
    }

    if config.report.title.trim().is_empty() {
        errors.push("report.title: must not be blank".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_delay(field: &str, value: &str, errors: &mut Vec<String>) -> Option<Duration> {
    match humantime::parse_duration(value) {
        Ok(duration) => Some(duration),
        Err(e) => {
            errors.push(format!("{}: invalid duration '{}' - {}", field, value, e));
            None
        }
    }
}

/// Retry policy of a validated config
pub fn retry_policy(config: &Config) -> RetryPolicy {
    let defaults = RetryPolicy::default();
    RetryPolicy {
        attempts: config.retry.attempts.max(1),
        base_delay: humantime::parse_duration(&config.retry.base_delay)
            .unwrap_or(defaults.base_delay),
        max_delay: humantime::parse_duration(&config.retry.max_delay)
            .unwrap_or(defaults.max_delay),
    }
}

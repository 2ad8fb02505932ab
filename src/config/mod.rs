mod schema;
mod validation;

pub use schema::{Config, ReportConfig, RetryConfig};
pub use validation::{retry_policy, validate_config};

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/judgeboard/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("judgeboard"))
}

/// Get the default config file path (~/.config/judgeboard/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/judgeboard/config.yaml)
///
/// A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if:
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(path) => path,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        debug!("No config at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| {
            format!("Failed to parse config: invalid YAML in {}", config_path.display())
        })
}

/// Parse YAML config text; an empty document means defaults
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_saphyr::from_str(content)?)
}

/// Location of the shared document file, with a leading `~/` expanded
pub fn resolve_store_path(config: &Config) -> Result<PathBuf> {
    match &config.store_path {
        Some(path) => expand_home(path),
        None => Ok(get_config_dir()?.join("store.json")),
    }
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().context("Could not determine home directory")?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.brackets, vec!["SD", "SMP", "SLTA"]);
        assert_eq!(config.retry.attempts, 3);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
brackets: [SD, SMP]
retry:
  attempts: 5
report:
  title: Lomba PBB
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.brackets, vec!["SD", "SMP"]);
        assert_eq!(config.retry.attempts, 5);
        assert_eq!(config.retry.base_delay, "10ms");
        assert_eq!(config.report.title, "Lomba PBB");
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(parse_config("bracket: [SD]\n").is_err());
    }

    #[test]
    fn test_load_config_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "brackets: {not: a list}\n").unwrap();

        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(format!("{:#}", err).contains(&path.display().to_string()));
    }

    #[test]
    fn test_store_path_resolution() {
        let mut config = Config::default();
        config.store_path = Some(PathBuf::from("/srv/lomba/store.json"));
        assert_eq!(
            resolve_store_path(&config).unwrap(),
            PathBuf::from("/srv/lomba/store.json")
        );

        config.store_path = Some(PathBuf::from("~/lomba/store.json"));
        let resolved = resolve_store_path(&config).unwrap();
        assert!(resolved.ends_with("lomba/store.json"));
        assert!(!resolved.starts_with("~"));
    }
}

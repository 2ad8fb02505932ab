use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::DEFAULT_TITLE;
use crate::sync::seed::DEFAULT_BRACKETS;

/// Judgeboard configuration.
///
/// Example YAML:
/// ```yaml
/// brackets: [SD, SMP, SLTA]
/// store_path: ~/lomba/store.json
/// retry:
///   attempts: 5
///   base_delay: 20ms
///   max_delay: 1s
/// log_level: info
/// report:
///   title: Rekapitulasi Lomba PBB
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bracket order used by reports covering every bracket
    #[serde(default = "default_brackets")]
    pub brackets: Vec<String>,

    /// Shared document file (default: ~/.config/judgeboard/store.json)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    #[serde(default)]
    pub retry: RetryConfig,

    /// One of error, warn, info, debug, trace
    #[serde(default)]
    pub log_level: Option<String>,

    /// Write rotating log files here instead of stderr
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brackets: default_brackets(),
            store_path: None,
            retry: RetryConfig::default(),
            log_level: None,
            log_dir: None,
            report: ReportConfig::default(),
        }
    }
}

fn default_brackets() -> Vec<String> {
    DEFAULT_BRACKETS.iter().map(|b| b.to_string()).collect()
}

/// Per-write retry settings; delays are humantime strings ("10ms", "2s")
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub attempts: usize,
    #[serde(default = "default_base_delay")]
    pub base_delay: String,
    #[serde(default = "default_max_delay")]
    pub max_delay: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
        }
    }
}

fn default_attempts() -> usize {
    3
}

fn default_base_delay() -> String {
    "10ms".to_string()
}

fn default_max_delay() -> String {
    "2s".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

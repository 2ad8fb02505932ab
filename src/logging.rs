//! Logger bootstrap for the binary.
//!
//! The library only uses the `log` facade. The binary calls [`init_logging`]
//! once at startup: stderr by default, rotating files when a log directory is
//! configured. Initialization is idempotent and never panics.

use anyhow::{anyhow, Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "judgeboard";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGER: OnceCell<LoggerHandle> = OnceCell::new();

/// Level used when neither the config nor `--verbose` says otherwise
pub fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Normalize a level name; "warning" is accepted as "warn"
pub fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok("off"),
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(anyhow!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error|off",
            other
        )),
    }
}

/// Start the logger. Later calls are no-ops.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<()> {
    let level = normalize_level(level)?;
    LOGGER.get_or_try_init(|| -> Result<LoggerHandle> {
        let logger = Logger::try_with_str(level)
            .with_context(|| format!("invalid log level `{}`", level))?;

        let handle = match log_dir {
            Some(dir) => {
                let dir: PathBuf = dir.to_path_buf();
                std::fs::create_dir_all(&dir)
                    .with_context(|| {
                        format!("Failed to create log directory `{}`", dir.display())
                    })?;
                logger
                    .log_to_file(
                        FileSpec::default()
                            .directory(dir.as_path())
                            .basename(LOG_FILE_BASENAME),
                    )
                    .rotate(
                        Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                        Naming::Numbers,
                        Cleanup::KeepLogFiles(MAX_LOG_FILES),
                    )
                    .write_mode(WriteMode::BufferAndFlush)
                    .append()
                    .format_for_files(flexi_logger::detailed_format)
                    .start()
                    .context("Failed to start logger")?
            }
            None => logger
                .log_to_stderr()
                .format_for_stderr(flexi_logger::default_format)
                .start()
                .context("Failed to start logger")?,
        };

        info!(
            "event=app_start level={} version={}",
            level,
            env!("CARGO_PKG_VERSION")
        );
        Ok(handle)
    })?;
    Ok(())
}

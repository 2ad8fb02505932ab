use anyhow::{Context, Result};
use std::path::Path;

/// Open an exported report in the user's default browser, ready for printing
///
/// # Errors
/// Returns error if browser cannot be opened (e.g., no browser available)
pub fn open_report(path: &Path) -> Result<()> {
    let target = path
        .canonicalize()
        .with_context(|| format!("Report not found: {}", path.display()))?;
    webbrowser::open(&target.to_string_lossy())
        .with_context(|| format!("Failed to open browser for report: {}", target.display()))?;
    Ok(())
}

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::path::Path;

const DOCUMENT_VERSION: u32 = 1;

/// On-disk envelope of the event document
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    version: u32,
    #[serde(default)]
    data: Value,
}

/// Load the event document from a JSON file
///
/// If the file doesn't exist, returns an empty document (which makes the
/// scoreboard seed defaults on first sync).
/// If the file exists but has an unsupported version, returns an error.
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Map::new()));
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open store file at {}", path.display()))?;

    let stored: StoredDocument = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load store file at {}", path.display()))?;

    if stored.version != DOCUMENT_VERSION {
        anyhow::bail!("Unsupported store file version: {}", stored.version);
    }

    match stored.data {
        Value::Null => Ok(Value::Object(Map::new())),
        data @ Value::Object(_) => Ok(data),
        _ => anyhow::bail!("Store file at {} does not hold a document object", path.display()),
    }
}

/// Save the event document to a JSON file atomically
///
/// Uses atomic-write-file so a crash mid-write never leaves a truncated file.
/// Creates the parent directory if it doesn't exist.
pub fn save_document(path: &Path, document: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create store directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    let stored = StoredDocument {
        version: DOCUMENT_VERSION,
        data: document.clone(),
    };
    serde_json::to_writer_pretty(&mut file, &stored).context("Failed to serialize store document")?;

    file.commit().context("Failed to save store document")?;

    Ok(())
}

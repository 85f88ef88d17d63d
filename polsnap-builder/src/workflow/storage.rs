//! Snapshot storage
//!
//! The previous snapshot is read once before the run. The new one is written
//! once at the end: serialized to a temporary file beside the target, then
//! renamed over it, so readers never see a half-written document.

use crate::models::Snapshot;
use polsnap_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Previous snapshot, if one exists and parses
///
/// An unreadable or malformed file is logged and treated as absent; it
/// only disables carry-over for this run.
pub fn load_previous(path: &Path) -> Option<Snapshot> {
    if !path.exists() {
        info!(path = %path.display(), "No previous snapshot");
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Previous snapshot unreadable, ignoring");
            return None;
        }
    };

    match serde_json::from_str::<Snapshot>(&content) {
        Ok(snapshot) => {
            info!(
                path = %path.display(),
                countries = snapshot.countries.len(),
                generated_at = %snapshot.generated_at,
                "Loaded previous snapshot"
            );
            Some(snapshot)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Previous snapshot malformed, ignoring");
            None
        }
    }
}

/// Write the snapshot as pretty-printed JSON, replacing `path` atomically
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidInput(format!("output path {} has no file name", path.display())))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut body = serde_json::to_string_pretty(snapshot)?;
    body.push('\n');

    let temp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
    if let Err(e) = std::fs::write(&temp_path, body.as_bytes()) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }

    info!(
        path = %path.display(),
        countries = snapshot.countries.len(),
        bytes = body.len(),
        "Snapshot written"
    );
    Ok(())
}

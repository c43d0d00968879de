//! Export of the history log to a shareable file

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::{error::ExportError, storage::TimerRepository};

/// File name used for history exports
pub const EXPORT_FILE_NAME: &str = "timer_history.json";

/// Write the stored history blob, unchanged, to `dir/timer_history.json`.
///
/// Returns `Ok(None)` without touching the filesystem when no history has
/// been stored yet.
pub async fn export_history(
    repository: &TimerRepository,
    dir: &Path,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(blob) = repository.history_blob().await? else {
        info!("No history to export");
        return Ok(None);
    };

    fs::create_dir_all(dir).await.map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, blob.as_bytes())
        .await
        .map_err(|source| ExportError::Write { path: path.clone(), source })?;

    info!("Exported history to {}", path.display());
    Ok(Some(path))
}

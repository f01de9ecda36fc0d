//! Artifact detail loader (`000Admin/<10-digit id>`).

use std::path::{Path, PathBuf};

use symstore_types::{parse_transaction_file_name, ArtifactDetail, TransactionDetail};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ReaderError, Result};
use crate::loader::{load_lines, Loaded};

/// A detail file found in the metadata folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionFile {
    pub id: u32,
    pub path: PathBuf,
}

/// Load one transaction's artifact list.
///
/// `id` is supplied by the caller (normally parsed from the file name); the
/// file content is not consulted for it.
pub async fn load_transaction_detail(
    path: &Path,
    id: u32,
    cancel: &CancellationToken,
) -> Result<Loaded<TransactionDetail>> {
    let loaded = load_lines::<ArtifactDetail>(path, cancel).await?;
    Ok(loaded.map(|artifacts| TransactionDetail::new(id, artifacts)))
}

/// List the detail files directly inside `metadata_dir`, sorted by id.
///
/// Only regular files whose whole name is a zero-padded transaction id
/// qualify; the logs and anything else in the folder are ignored.
pub async fn discover_transaction_files(metadata_dir: &Path) -> Result<Vec<TransactionFile>> {
    let mut dir = tokio::fs::read_dir(metadata_dir)
        .await
        .map_err(|e| ReaderError::io(metadata_dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|e| ReaderError::io(metadata_dir, e))?
    {
        let Some(id) = entry.file_name().to_str().and_then(parse_transaction_file_name) else {
            continue;
        };
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ReaderError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        debug!(path = %entry.path().display(), id, "found transaction file");
        files.push(TransactionFile {
            id,
            path: entry.path(),
        });
    }

    files.sort_by_key(|f| f.id);
    Ok(files)
}

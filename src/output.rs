//! Writing results to disk.

use crate::error::ImgTxtError;
use std::path::Path;

/// Write `bytes` to `path` via a sibling temp file and a rename, so readers
/// never see a half-written file. Parent directories are created.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ImgTxtError> {
    let write_failed = |source| ImgTxtError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }
    Ok(())
}

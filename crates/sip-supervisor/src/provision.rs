//! Obtaining the pjsua executable

use crate::error::{SupervisorError, SupervisorResult};
use std::path::Path;
use tracing::{debug, info};

/// Download `url` to `path` unless something already exists there
///
/// The file is written next to its destination and renamed into place, so
/// an interrupted download never leaves a truncated executable behind.
pub async fn ensure_binary(path: &Path, url: &str) -> SupervisorResult<()> {
    if tokio::fs::metadata(path).await.is_ok() {
        debug!("Using voice client at {}", path.display());
        return Ok(());
    }

    info!("Voice client missing, downloading {} to {}", url, path.display());

    let response = reqwest::get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let partial = path.with_extension("part");
    tokio::fs::write(&partial, &bytes).await?;
    make_executable(&partial).await?;
    tokio::fs::rename(&partial, path).await?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(())
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> SupervisorResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .map_err(SupervisorError::from)
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> SupervisorResult<()> {
    Ok(())
}

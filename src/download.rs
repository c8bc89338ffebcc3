use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tokio::fs;

use crate::extract::CandidateUrl;
use crate::fetch::AssetClient;

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Skipped { path: PathBuf },
    Downloaded { path: PathBuf, bytes: usize },
    Failed { reason: String },
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadOutcome::Skipped { path } => {
                write!(f, "skipped {} (already exists)", path.display())
            }
            DownloadOutcome::Downloaded { path, bytes } => {
                write!(f, "saved {} ({bytes} bytes)", path.display())
            }
            DownloadOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Downloads `candidate` into `dest_dir` unless a file with the same final
/// path segment is already there. Never returns an error; failures are folded into
/// [`DownloadOutcome::Failed`] so a batch can keep going.
pub async fn download_asset(
    client: &AssetClient,
    candidate: &CandidateUrl,
    dest_dir: &Path,
) -> DownloadOutcome {
    match try_download(client, candidate, dest_dir).await {
        Ok(outcome) => outcome,
        Err(err) => DownloadOutcome::Failed {
            reason: format!("{err:#}"),
        },
    }
}

async fn try_download(
    client: &AssetClient,
    candidate: &CandidateUrl,
    dest_dir: &Path,
) -> Result<DownloadOutcome> {
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("failed to create {}", dest_dir.display()))?;

    let name = candidate
        .file_name()
        .ok_or_else(|| anyhow!("no file name in {candidate}"))?;
    let dest_path = dest_dir.join(name);

    let exists = fs::try_exists(&dest_path)
        .await
        .with_context(|| format!("failed to check {}", dest_path.display()))?;
    if exists {
        tracing::info!("Skipping {name} (already exists)");
        return Ok(DownloadOutcome::Skipped { path: dest_path });
    }

    tracing::info!("Downloading {name} from {candidate}...");
    let body = client
        .fetch_bytes(candidate.url())
        .await
        .with_context(|| format!("GET {candidate}"))?;

    let partial = dest_dir.join(format!("{name}{PARTIAL_SUFFIX}"));
    if let Err(err) = write_then_rename(&partial, &dest_path, &body).await {
        fs::remove_file(&partial).await.ok();
        return Err(err);
    }

    Ok(DownloadOutcome::Downloaded {
        path: dest_path,
        bytes: body.len(),
    })
}

async fn write_then_rename(partial: &Path, dest: &Path, body: &[u8]) -> Result<()> {
    fs::write(partial, body)
        .await
        .with_context(|| format!("failed to write {}", partial.display()))?;
    fs::rename(partial, dest)
        .await
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(())
}

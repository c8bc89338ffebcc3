use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::download::{DownloadOutcome, download_asset};
use crate::extract::{CandidateUrl, extract_from_css, extract_from_html};
use crate::fetch::AssetClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub ran: bool,
    pub found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl StageReport {
    fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Skipped { .. } => self.skipped += 1,
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.ran {
            return f.write_str("not run");
        }
        write!(
            f,
            "{} found, {} downloaded, {} skipped, {} failed",
            self.found, self.downloaded, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct RecoverySummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub html: StageReport,
    pub css: StageReport,
}

impl RecoverySummary {
    pub fn total_downloaded(&self) -> usize {
        self.html.downloaded + self.css.downloaded
    }

    pub fn total_failed(&self) -> usize {
        self.html.failed + self.css.failed
    }
}

impl fmt::Display for RecoverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        writeln!(f, "Recovery complete in {} ms.", elapsed.num_milliseconds())?;
        writeln!(f, "  html: {}", self.html)?;
        write!(f, "  css:  {}", self.css)
    }
}

/// Runs the HTML stage then the CSS stage. Every failure is logged and
/// downgraded, so partial completion comes back as a normal summary.
pub async fn recover_assets(config: &Config, client: &AssetClient) -> RecoverySummary {
    let started_at = Utc::now();
    tracing::info!("Starting asset recovery...");

    let html = recover_from_html(config, client).await;
    let css = recover_from_css(config, client).await;

    RecoverySummary {
        started_at,
        finished_at: Utc::now(),
        html,
        css,
    }
}

pub async fn recover_from_html(config: &Config, client: &AssetClient) -> StageReport {
    let path = &config.backup_html;
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!("{} not found, skipping HTML extraction", path.display());
            return StageReport::default();
        }
        Err(err) => {
            tracing::error!("Failed to read {}: {err}", path.display());
            return StageReport::default();
        }
    };

    tracing::info!("Extracting URLs from {}...", path.display());
    let content = String::from_utf8_lossy(&bytes);
    let urls = extract_from_html(&content);
    tracing::info!("Found {} images in HTML.", urls.len());
    download_all(client, &urls, &config.images_dir).await
}

pub async fn recover_from_css(config: &Config, client: &AssetClient) -> StageReport {
    tracing::info!("Downloading original CSS from {}...", config.css_url);
    let css = match client.fetch_text(&config.css_url).await {
        Ok(css) => css,
        Err(err) => {
            tracing::error!("Failed to fetch CSS: {err}");
            return StageReport::default();
        }
    };

    tracing::info!("Extracting URLs from CSS...");
    let urls = extract_from_css(&css);
    tracing::info!("Found {} images in CSS.", urls.len());
    download_all(client, &urls, &config.images_dir).await
}

/// Downloads one URL at a time, in no particular order.
pub async fn download_all(
    client: &AssetClient,
    urls: &HashSet<CandidateUrl>,
    dest_dir: &Path,
) -> StageReport {
    let mut report = StageReport {
        ran: true,
        found: urls.len(),
        ..StageReport::default()
    };
    for candidate in urls {
        let outcome = download_asset(client, candidate, dest_dir).await;
        match &outcome {
            DownloadOutcome::Failed { .. } => tracing::warn!("{candidate}: {outcome}"),
            DownloadOutcome::Downloaded { .. } => tracing::info!("{outcome}"),
            DownloadOutcome::Skipped { .. } => {}
        }
        report.record(&outcome);
    }
    report
}

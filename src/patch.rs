use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

pub const BADGE_SELECTOR: &str = ".w-webflow-badge";

pub const HIDE_BADGE_RULE: &str = "
/* Hide Webflow Badge */
.w-webflow-badge {
  display: none !important;
}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Appended,
    AlreadyPresent,
}

/// Appends `rule` to the stylesheet at `path`, creating the file if needed.
pub async fn append_css_rule(path: &Path, rule: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(rule.as_bytes())
        .await
        .with_context(|| format!("failed to append to {}", path.display()))?;
    file.flush().await?;
    Ok(())
}

/// Appends [`HIDE_BADGE_RULE`] unless the stylesheet already targets the badge.
pub async fn hide_badge(path: &Path) -> Result<PatchOutcome> {
    match fs::read_to_string(path).await {
        Ok(existing) if existing.contains(BADGE_SELECTOR) => {
            return Ok(PatchOutcome::AlreadyPresent);
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    }
    append_css_rule(path, HIDE_BADGE_RULE).await?;
    Ok(PatchOutcome::Appended)
}

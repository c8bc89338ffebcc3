use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Hosts that served the site's original assets.
pub const ASSET_HOSTS: [&str; 2] = ["assets.website-files.com", "cdn.prod.website-files.com"];

/// Extensions (lowercase) an asset URL must end with to be recovered.
pub const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".svg", ".gif", ".ico"];

static HTML_ASSET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://(?:assets\.website-files\.com|cdn\.prod\.website-files\.com)/[^"\s)]+"#)
        .expect("html asset regex is valid")
});

static CSS_URL_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(["']?(https?://[^"')]+)["']?\)"#).expect("css url() regex is valid")
});

/// An absolute image URL on one of the [`ASSET_HOSTS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateUrl {
    raw: String,
    url: Url,
}

impl CandidateUrl {
    /// Validates host, scheme and extension. Returns `None` for anything that
    /// should not be downloaded.
    pub fn parse(raw: &str) -> Option<Self> {
        if !has_image_extension(raw) {
            return None;
        }
        let url = Url::parse(raw).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let host = url.host_str()?;
        if !ASSET_HOSTS.contains(&host) {
            return None;
        }
        let candidate = Self {
            raw: raw.to_string(),
            url,
        };
        candidate.file_name()?;
        Some(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Final path segment exactly as written in the source text, without
    /// query or fragment. Percent escapes and non-ASCII letters are kept.
    pub fn file_name(&self) -> Option<&str> {
        raw_file_name(&self.raw)
    }
}

impl fmt::Display for CandidateUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn raw_file_name(raw: &str) -> Option<&str> {
    let (_, after_scheme) = raw.split_once("://")?;
    let (_, path) = after_scheme.split_once('/')?;
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

fn has_image_extension(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Scans backup HTML for asset-host image URLs, e.g. in `src`, `srcset` or `href`.
pub fn extract_from_html(content: &str) -> HashSet<CandidateUrl> {
    HTML_ASSET_URL
        .find_iter(content)
        .filter_map(|found| {
            // srcset entries carry a trailing width descriptor such as " 800w"
            let raw = found.as_str().split(' ').next().unwrap_or_default();
            CandidateUrl::parse(raw)
        })
        .collect()
}

/// Scans stylesheet text for `url(...)` values pointing at asset-host images.
pub fn extract_from_css(content: &str) -> HashSet<CandidateUrl> {
    CSS_URL_FUNCTION
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|found| CandidateUrl::parse(found.as_str().trim()))
        .collect()
}

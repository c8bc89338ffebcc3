use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CSS_URL: &str =
    "https://assets.website-files.com/615c647d100bcdc731534a25/css/medidot.62a50d1f4.css";
pub const DEFAULT_BACKUP_HTML: &str = "index.html.bak";
pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const DEFAULT_CSS_PATH: &str = "css/style.css";
const DEFAULT_USER_AGENT: &str = "sitesalvage";

#[derive(Debug, Parser)]
#[command(
    name = "sitesalvage",
    version,
    about = "Recover a static site's images from an HTML backup and its live stylesheet."
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// TOML site profile overriding the built-in site defaults.
    #[arg(long, env = "SITESALVAGE_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Backup HTML document scanned for image URLs.
    #[arg(long, env = "SITESALVAGE_BACKUP_HTML")]
    pub backup_html: Option<PathBuf>,

    /// Directory the recovered images are written to.
    #[arg(long, env = "SITESALVAGE_IMAGES_DIR")]
    pub images_dir: Option<PathBuf>,

    /// Remote stylesheet scanned for url(...) image references.
    #[arg(long, env = "SITESALVAGE_CSS_URL")]
    pub css_url: Option<String>,

    /// Local stylesheet patched by `patch-css`.
    #[arg(long, env = "SITESALVAGE_CSS_PATH")]
    pub css_path: Option<PathBuf>,

    /// Custom user-agent header value.
    #[arg(long, env = "SITESALVAGE_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "SITESALVAGE_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download every image referenced by the backup HTML and the remote stylesheet (default).
    Recover,
    /// Append the rule hiding the hosting badge to the local stylesheet.
    PatchCss,
    /// Serve a directory over HTTP for local verification.
    Serve(ServeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "SITESALVAGE_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to bind the HTTP server to.
    #[arg(long, env = "SITESALVAGE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory to serve.
    #[arg(long, env = "SITESALVAGE_ROOT", default_value = ".")]
    pub root: PathBuf,
}

/// Optional per-site settings loaded from `--profile`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteProfile {
    pub css_url: Option<String>,
    pub backup_html: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub css_path: Option<PathBuf>,
}

impl SiteProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid profile {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backup_html: PathBuf,
    pub images_dir: PathBuf,
    pub css_url: Url,
    pub css_path: PathBuf,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub mode: Mode,
}

#[derive(Debug, Clone)]
pub enum Mode {
    Recover,
    PatchCss,
    Serve(ServeOptions),
}

#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub bind: IpAddr,
    pub port: u16,
    pub root: PathBuf,
}

impl Config {
    pub fn from_cli() -> Result<Self> {
        let cli = Cli::parse();
        let profile = match &cli.common.profile {
            Some(path) => SiteProfile::load(path)?,
            None => SiteProfile::default(),
        };
        Config::from_parts(cli.common, profile, cli.command)
    }

    pub fn from_parts(
        common: CommonArgs,
        profile: SiteProfile,
        command: Option<Command>,
    ) -> Result<Self> {
        if common.timeout_secs == 0 {
            return Err(anyhow!("timeout must be greater than zero"));
        }

        if common.user_agent.trim().is_empty() {
            return Err(anyhow!("user agent must not be empty"));
        }

        let raw_css_url = common
            .css_url
            .or(profile.css_url)
            .unwrap_or_else(|| DEFAULT_CSS_URL.to_string());
        let css_url = parse_http_url(&raw_css_url)?;

        let mode = match command {
            Some(Command::Serve(args)) => Mode::Serve(ServeOptions {
                bind: args.bind,
                port: args.port,
                root: args.root,
            }),
            Some(Command::PatchCss) => Mode::PatchCss,
            Some(Command::Recover) | None => Mode::Recover,
        };

        Ok(Self {
            backup_html: common
                .backup_html
                .or(profile.backup_html)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_HTML)),
            images_dir: common
                .images_dir
                .or(profile.images_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR)),
            css_url,
            css_path: common
                .css_path
                .or(profile.css_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSS_PATH)),
            user_agent: common.user_agent,
            timeout_secs: common.timeout_secs,
            mode,
        })
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid stylesheet url: {raw}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("unsupported stylesheet url scheme {other}: {raw}")),
    }
}

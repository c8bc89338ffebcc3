use anyhow::Result;
use sitesalvage::Config;
use sitesalvage::config::Mode;
use sitesalvage::fetch::AssetClient;
use sitesalvage::logging::init_logging;
use sitesalvage::patch::{self, PatchOutcome};
use sitesalvage::recover::recover_assets;
use sitesalvage::server;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let config = Config::from_cli()?;
    match &config.mode {
        Mode::Recover => {
            let client = AssetClient::new(&config)?;
            let summary = recover_assets(&config, &client).await;
            if summary.total_failed() > 0 {
                tracing::warn!("{} downloads failed", summary.total_failed());
            }
            println!("{summary}");
            Ok(())
        }
        Mode::PatchCss => {
            run_patch_css(&config).await;
            Ok(())
        }
        Mode::Serve(_) => server::run_server(config).await,
    }
}

async fn run_patch_css(config: &Config) {
    match patch::hide_badge(&config.css_path).await {
        Ok(PatchOutcome::Appended) => println!("Successfully appended CSS rule."),
        Ok(PatchOutcome::AlreadyPresent) => {
            println!("{} already hides the badge.", config.css_path.display())
        }
        Err(err) => eprintln!("Error appending CSS: {err:#}"),
    }
}

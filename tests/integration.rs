use std::path::{Path, PathBuf};

use httpmock::prelude::*;
use url::Url;

use sitesalvage::config::{Config, Mode};
use sitesalvage::extract::{extract_from_css, extract_from_html};
use sitesalvage::fetch::AssetClient;
use sitesalvage::recover::recover_assets;

fn test_config(root: &Path, css_url: &str) -> Config {
    Config {
        backup_html: root.join("index.html.bak"),
        images_dir: root.join("recovered").join("images"),
        css_url: Url::parse(css_url).unwrap(),
        css_path: PathBuf::from("css/style.css"),
        user_agent: "sitesalvage-test".into(),
        timeout_secs: 5,
        mode: Mode::Recover,
    }
}

fn proxied_client(server: &MockServer) -> AssetClient {
    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(server.base_url()).unwrap())
        .build()
        .unwrap();
    AssetClient::from_client(client)
}

#[tokio::test]
async fn recovers_html_images_into_new_directory() {
    let server = MockServer::start_async().await;
    let hero = server
        .mock_async(|when, then| {
            when.method(GET).path("/615c/hero.jpg");
            then.status(200).body("jpeg");
        })
        .await;
    let logo = server
        .mock_async(|when, then| {
            when.method(GET).path("/615c/logo.svg");
            then.status(200).body("<svg/>");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/site.css");
            then.status(404);
        })
        .await;

    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path(), &server.url("/site.css"));
    std::fs::write(
        &config.backup_html,
        r#"<html><body>
        <img src="http://assets.website-files.com/615c/hero.jpg"
             srcset="http://assets.website-files.com/615c/hero.jpg 800w">
        <img src="http://cdn.prod.website-files.com/615c/logo.svg">
        <img src="https://example.com/615c/tracker.gif">
        </body></html>"#,
    )
    .unwrap();
    assert!(!config.images_dir.exists());

    let summary = recover_assets(&config, &proxied_client(&server)).await;

    assert_eq!(summary.html.found, 2);
    assert_eq!(summary.html.downloaded, 2);
    assert!(!summary.css.ran);
    let mut names: Vec<String> = std::fs::read_dir(&config.images_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["hero.jpg", "logo.svg"]);
    hero.assert_hits_async(1).await;
    logo.assert_hits_async(1).await;

    // a rerun finds everything already on disk
    let rerun = recover_assets(&config, &proxied_client(&server)).await;
    assert_eq!(rerun.html.skipped, 2);
    assert_eq!(rerun.total_downloaded(), 0);
    hero.assert_hits_async(1).await;
}

#[tokio::test]
async fn recovers_stylesheet_images_when_backup_is_missing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/site.css");
            then.status(200).body(
                ".hero{background-image:url(\"http://assets.website-files.com/615c/bg.png\")}\
                 .x{background:url(http://assets.website-files.com/615c/bg.webp)}",
            );
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/615c/bg.png");
            then.status(200).body("png");
        })
        .await;

    let temp = tempfile::tempdir().unwrap();
    let config = test_config(temp.path(), &server.url("/site.css"));

    let summary = recover_assets(&config, &proxied_client(&server)).await;

    assert!(!summary.html.ran);
    assert_eq!(summary.css.found, 1);
    assert_eq!(summary.css.downloaded, 1);
    assert_eq!(
        std::fs::read(config.images_dir.join("bg.png")).unwrap(),
        b"png"
    );
}

#[test]
fn both_extractors_agree_on_host_and_extension_rules() {
    let html = r#"<img src="https://assets.website-files.com/a/b/pic.png">
                  <img src="https://assets.website-files.com/a/b/pic.png">
                  <img src="https://assets.website-files.com/a/b/pic.webp">"#;
    let css = "a{background:url(https://assets.website-files.com/a/b/pic.png)}\
               b{background:url(https://assets.website-files.com/a/b/pic.webp)}";
    let from_html = extract_from_html(html);
    let from_css = extract_from_css(css);
    assert_eq!(from_html.len(), 1);
    assert_eq!(from_html, from_css);
}

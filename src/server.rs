use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tokio::net::TcpListener;
use warp::http::{HeaderValue, header};
use warp::{Filter, Reply};

use crate::Config;
use crate::config::Mode;

pub async fn run_server(config: Config) -> Result<()> {
    let serve_options = match &config.mode {
        Mode::Serve(opts) => opts.clone(),
        _ => return Err(anyhow!("server mode requires the serve subcommand")),
    };

    let root = serve_options.root.clone();
    if !root.is_dir() {
        return Err(anyhow!("{} is not a directory", root.display()));
    }

    let routes = routes(root.clone());
    let listener = TcpListener::bind((serve_options.bind, serve_options.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                serve_options.bind, serve_options.port
            )
        })?;
    let listening_addr = listener.local_addr()?;
    let server_future = warp::serve(routes)
        .incoming(listener)
        .graceful(shutdown_signal())
        .run();

    println!(
        "Serving {} at http://{}:{}/",
        root.display(),
        listening_addr.ip(),
        listening_addr.port()
    );

    server_future.await;
    println!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }
}

/// Static file routes rooted at `root`; `/` resolves to `index.html`.
pub fn routes(
    root: PathBuf,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let index_route = warp::path::end().and(warp::fs::file(root.join("index.html")));
    let files_route = warp::fs::dir(root);

    index_route
        .or(files_route)
        .unify()
        .map(|file: warp::fs::File| {
            let mut response = file.into_response();
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        })
        .with(warp::log::custom(|info| {
            tracing::info!(
                "{} {} {}",
                info.method(),
                info.path(),
                info.status().as_u16()
            );
        }))
}

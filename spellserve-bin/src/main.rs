use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::routes::AppState;

mod config;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    pretty_env_logger::formatted_builder()
        .parse_filters(&config.log_level)
        .init();
    log::info!("spellserve {} starting", env!("CARGO_PKG_VERSION"));

    let splitter = config.word_splitter()?;
    let registry = Arc::new(config.open_registry()?);
    log::info!(
        "{} dictionaries loaded from {}",
        registry.list().len(),
        registry.dir().display()
    );

    let token = CancellationToken::new();
    let autosave = registry.autosave(config.autosave_interval, token.clone());

    let app = routes::router(AppState {
        registry: Arc::clone(&registry),
        splitter: Arc::new(splitter),
    });

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("unable to listen on {}", config.addr))?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(token.clone()))
        .await
        .context("http server failed")?;
    log::info!("http server stopped");

    token.cancel();
    if let Some(handle) = autosave {
        handle.await.context("autosave task failed")?;
    }

    let registry = Arc::clone(&registry);
    tokio::task::spawn_blocking(move || registry.save_all())
        .await
        .context("final save task failed")?
        .context("final save failed")?;

    log::info!("dictionaries saved, bye");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM, cancelling `token` first.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("unable to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::error!("unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("shutdown signal received");
    token.cancel();
}

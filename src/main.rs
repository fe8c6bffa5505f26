use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use quiz_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    logging, routes, AppState,
};
use tokio::net::TcpListener;
use tracing::info;

const LOG_RETENTION_DAYS: u64 = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();
    let _log_guards = logging::init(config)?;

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);
    let api = routes::router(app_state);

    let entry = config.entry.trim_end_matches('/');
    let app = if entry.is_empty() {
        api
    } else {
        Router::new().nest(entry, api)
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, draining in-flight requests");
        let _ = shutdown_tx.send(true);
    });

    {
        let mut rx = shutdown_rx.clone();
        tokio::spawn(async move {
            let config = get_config();
            let mut timer = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        match logging::prune_rotated_logs(
                            config,
                            Duration::from_secs(LOG_RETENTION_DAYS * 24 * 60 * 60),
                        ) {
                            Ok(0) => {}
                            Ok(n) => info!(removed = n, "pruned rotated log files"),
                            Err(e) => tracing::warn!(error = ?e, "log maintenance failed"),
                        }
                    }
                    _ = rx.changed() => break,
                }
            }
        });
    }

    let addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;

    let mut rx = shutdown_rx;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = rx.changed().await;
        })
        .await?;

    info!("quiz shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

use std::sync::Arc;

use jogadores_domain::player::{ArcPlayerRepository, ArcPlayerService, PlayerServiceImpl};
use jogadores_persistence_sqlite::SqlitePlayerRepository;
use log::{error, info};

mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    logs::init_logger();

    let player_repository = SqlitePlayerRepository::new();
    if let Err(e) = player_repository.init_schema().await {
        error!("Failed to prepare player storage: {}", e);
        std::process::exit(1);
    }

    let player_repository: ArcPlayerRepository = Arc::new(Box::new(player_repository));
    let player_service: ArcPlayerService =
        Arc::new(Box::new(PlayerServiceImpl::new(player_repository)));

    info!("Starting application");

    let http_app = tokio::spawn(async move {
        jogadores_api::run(player_service, shutdown_signal()).await;
    });

    if let Err(e) = http_app.await {
        error!("HTTP API task failed: {}", e);
    }
}

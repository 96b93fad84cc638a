use std::future::IntoFuture;
use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rolltrack::api::router;
use rolltrack::config::AppConfig;
use rolltrack::db;
use rolltrack::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "rolltrack=debug,tower_http=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().inspect_err(|e| {
        error!("failed to start server: {}", e);
        error!("make sure DATABASE_URL is set in your .env file");
    })?;

    let pool = db::connect(&config.database).await.inspect_err(|e| {
        error!("database connection error: {}", e);
    })?;
    db::ping(&pool).await?;
    info!("connected to database {}", config.database.name());

    db::MIGRATOR.run(&pool).await?;

    let state = AppState::new(pool.clone(), config.database.name());
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.inspect_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            error!("port {} is already in use; stop the other process or set PORT", addr.port());
        } else {
            error!("server error: {}", e);
        }
    })?;

    info!("listening on http://{}", addr);
    info!("environment: {}", config.environment);
    info!("API endpoints available at http://{}/api", addr);

    // In-flight requests are not drained; the pool is closed and the process exits.
    tokio::select! {
        res = axum::serve(listener, app).into_future() => {
            if let Err(e) = res {
                warn!("server stopped: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("shutting down server...");
        }
    }

    pool.close().await;
    info!("database connection closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
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
}

use arena_robot::command::handlers::StatusHandler;
use arena_robot::command::CommandExecutor;
use arena_robot::config::{Args, RobotConfig};
use arena_robot::http;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = RobotConfig::from(Args::parse());

    info!("Robot node starting: {}", config.robot_id);

    let executor = Arc::new(
        CommandExecutor::new(config.robot_id.clone(), config.token.clone())
            .with_handler(Arc::new(StatusHandler)),
    );
    let app = http::create_router(executor);

    let listener = TcpListener::bind(&config.listen).await?;
    info!("Robot API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Robot node stopped");
    Ok(())
}

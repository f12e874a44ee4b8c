use arena_dispatcher::clock::MonotonicClock;
use arena_dispatcher::config::{Args, DispatcherConfig};
use arena_dispatcher::http::create_router;
use arena_dispatcher::robot::HttpRobotClient;
use arena_dispatcher::Dispatcher;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = DispatcherConfig::from(Args::parse());

    info!("Dispatcher starting on {}", config.listen);
    info!("  penalty window: {:?}", config.penalty_window);
    info!("  probe timeout: {:?}", config.probe_timeout);
    info!("  relay timeout: {:?}", config.relay_timeout);

    let robots = Arc::new(HttpRobotClient::new(config.probe_timeout)?);
    let dispatcher = Arc::new(Dispatcher::new(&config, robots, Arc::new(MonotonicClock::new())));
    let app = create_router(dispatcher);

    let listener = TcpListener::bind(&config.listen).await?;
    info!("Dispatcher listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Dispatcher stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

use anyhow::Context;
use pricekeeper_server::{api::app_router, build_state, config::Config, init_tracing, scheduler};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::from_args()?;
    let state = build_state(&config).await?;

    scheduler::start_price_refresh_scheduler(state.clone());

    let router = app_router(state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    tracing::info!("Starting API on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

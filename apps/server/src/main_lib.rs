use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use pricekeeper_core::prices::{PriceService, PriceServiceTrait};
use pricekeeper_storage_sqlite::{
    db::{self, write_actor},
    prices::PriceRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub price_service: Arc<dyn PriceServiceTrait>,
    pub db_path: String,
    pub refresh_interval: Duration,
}

pub fn init_tracing() {
    let log_format = std::env::var("PK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Opens the database, ensures the schema, starts the writer actor and
/// loads the price cache. Any failure here is fatal.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::create_schema(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone())?;

    let price_repository = Arc::new(PriceRepository::new(pool.clone(), writer));
    let price_service = Arc::new(PriceService::new(price_repository));
    price_service.initialize()?;

    tracing::info!(
        "Set currency data refresh interval to {:?}",
        config.refresh_interval
    );

    Ok(Arc::new(AppState {
        price_service,
        db_path,
        refresh_interval: config.refresh_interval,
    }))
}

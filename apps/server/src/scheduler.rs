//! Background scheduler for the periodic price cache reload.
//!
//! Keeps the cache in step with rows written to the database by other
//! processes. The cadence comes from `statsCollectInterval`.

use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::main_lib::AppState;

/// Starts the background reload loop. The first reload happens one full
/// interval after startup, since the cache was just loaded.
pub fn start_price_refresh_scheduler(state: Arc<AppState>) {
    let period = state.refresh_interval;
    tokio::spawn(async move {
        info!("Price refresh scheduler started ({:?} interval)", period);

        let mut refresh_interval = interval_at(Instant::now() + period, period);
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            refresh_interval.tick().await;
            run_scheduled_refresh(&state).await;
        }
    });
}

/// Runs a single reload. Failures keep the previous snapshot.
async fn run_scheduled_refresh(state: &Arc<AppState>) {
    match state.price_service.refresh().await {
        Ok(count) => debug!("Scheduled price refresh loaded {} currencies", count),
        Err(e) => warn!("Scheduled price refresh failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pricekeeper_core::prices::{
        CurrencyRecord, MutationReply, PriceChange, PriceServiceTrait,
    };
    use pricekeeper_core::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingService {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl PriceServiceTrait for CountingService {
        fn initialize(&self) -> Result<usize> {
            Ok(0)
        }
        fn reload(&self) -> Result<usize> {
            Ok(0)
        }
        async fn refresh(&self) -> Result<usize> {
            Ok(self.refreshes.fetch_add(1, Ordering::SeqCst) + 1)
        }
        fn get_price(&self, _symbol: &str) -> Option<CurrencyRecord> {
            None
        }
        fn select_price(&self, _symbol: &str) -> Result<CurrencyRecord> {
            unimplemented!()
        }
        fn get_price_history(&self, _symbol: &str) -> Result<Vec<PriceChange>> {
            Ok(Vec::new())
        }
        async fn insert_price(&self, _symbol: &str, _price: &str) -> Result<MutationReply> {
            unimplemented!()
        }
        async fn update_price(&self, _symbol: &str, _price: &str) -> Result<MutationReply> {
            unimplemented!()
        }
        async fn delete_price(&self, _symbol: &str) -> Result<MutationReply> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refreshes_once_per_interval_after_the_first_period() {
        let service = Arc::new(CountingService::default());
        let state = Arc::new(AppState {
            price_service: service.clone(),
            db_path: String::new(),
            refresh_interval: Duration::from_secs(30),
        });

        start_price_refresh_scheduler(state);
        tokio::task::yield_now().await;
        assert_eq!(service.refreshes.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(service.refreshes.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(service.refreshes.load(Ordering::SeqCst), 3);
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::price::FeedSnapshot;
use crate::services::price_service::PriceService;

/// How often the feed polls by default.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// What to poll and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFeedConfig {
    pub base: String,
    pub quote: String,
    pub interval: Duration,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            base: "BTC".to_string(),
            quote: "IDR".to_string(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PriceFeedConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Periodic price poller.
///
/// The first poll happens immediately, then once per interval. A failed poll
/// keeps the last known price, records the error in the snapshot and waits
/// for the next tick; there is no extra retry.
pub struct PriceFeed;

impl PriceFeed {
    /// Start polling on the current tokio runtime.
    ///
    /// Polling lasts as long as the returned handle: call
    /// [`PriceFeedHandle::stop`] or drop the handle to end it.
    pub fn spawn(service: Arc<PriceService>, config: PriceFeedConfig) -> PriceFeedHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(FeedSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tracing::info!(
            pair = %format!("{}/{}", config.base, config.quote),
            interval_secs = config.interval.as_secs_f64(),
            "starting price feed"
        );
        let task = tokio::spawn(run(service, config, snapshot_tx, shutdown_rx));

        PriceFeedHandle {
            snapshot: snapshot_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Run a single poll and fold the outcome into `snapshot`.
    pub async fn poll_once(
        service: &PriceService,
        config: &PriceFeedConfig,
        snapshot: &watch::Sender<FeedSnapshot>,
    ) {
        match service.fetch_quote(&config.base, &config.quote).await {
            Ok(quote) => {
                tracing::debug!(price = quote.price, source = %quote.source, "price updated");
                snapshot.send_modify(|s| {
                    s.quote = Some(quote);
                    s.last_error = None;
                    s.consecutive_failures = 0;
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch {}/{} price, keeping last known price", config.base, config.quote);
                snapshot.send_modify(|s| {
                    s.last_error = Some(format!("Failed to fetch current {} price: {e}", config.base));
                    s.consecutive_failures += 1;
                });
            }
        }
    }
}

async fn run(
    service: Arc<PriceService>,
    config: PriceFeedConfig,
    snapshot: watch::Sender<FeedSnapshot>,
    mut shutdown: oneshot::Receiver<()>,
) {
    // tokio panics on a zero period.
    let period = config.interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("price feed stopped");
                break;
            }
            _ = ticker.tick() => {
                PriceFeed::poll_once(&service, &config, &snapshot).await;
            }
        }
    }
}

/// Owner-side handle of a running price feed.
pub struct PriceFeedHandle {
    snapshot: watch::Receiver<FeedSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PriceFeedHandle {
    /// A receiver that is notified after every poll.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.clone()
    }

    /// Copy of the most recent snapshot.
    pub fn latest(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and wait for the task to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PriceFeedHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

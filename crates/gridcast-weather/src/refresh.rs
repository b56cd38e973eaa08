//! The background polling loop that keeps the forecast snapshot fresh.
//!
//! One worker task owns the authoritative snapshot. Each cycle it re-fetches
//! the hourly forecast and active alerts, compares them against what is
//! published, and only on a material change fetches the detailed forecast
//! and swaps in a complete replacement. The consumer side never sees a
//! partial snapshot: publication is a single `Arc` assignment under the
//! shared mutex, and an unchanged poll leaves the previous `Arc` untouched.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use gridcast_core::LocationConfig;

use crate::client::ForecastClient;
use crate::diff::has_material_change;
use crate::error::FetchError;
use crate::types::ForecastSnapshot;

const DEFAULT_INTERVAL_SECS: u64 = 600;
const DEFAULT_INITIAL_DATA_POLL_MS: u64 = 500;

/// Timing knobs for the refresh loop.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between polling cycles.
    pub interval: Duration,

    /// Poll granularity for [`RefreshHandle::wait_for_initial_data`].
    pub initial_data_poll: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            initial_data_poll: Duration::from_millis(DEFAULT_INITIAL_DATA_POLL_MS),
        }
    }
}

/// Worker-owned state, shared with the consumer behind one mutex.
#[derive(Debug, Default)]
struct Shared {
    snapshot: Option<Arc<ForecastSnapshot>>,
    initial_data_fetched: bool,
    updated: bool,
}

/// Builds and starts the background worker. A scheduler is single-use:
/// a location change stops the old handle and starts a new scheduler
/// against a cleared snapshot.
#[derive(Debug)]
pub struct RefreshScheduler {
    client: ForecastClient,
    location: LocationConfig,
    config: RefreshConfig,
}

impl RefreshScheduler {
    pub fn new(client: ForecastClient, location: LocationConfig, config: RefreshConfig) -> Self {
        Self {
            client,
            location,
            config,
        }
    }

    /// Spawn the worker and hand back the consumer's end.
    pub fn start(self) -> RefreshHandle {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (cycle_tx, cycle_rx) = watch::channel(0u64);
        let cancel = CancellationToken::new();

        let worker = Worker {
            client: self.client,
            location: self.location,
            shared: Arc::clone(&shared),
            cancel: cancel.clone(),
            interval: self.config.interval,
        };
        tokio::spawn(worker.run(cycle_tx));

        RefreshHandle {
            shared,
            cycles: cycle_rx,
            cancel,
            poll: self.config.initial_data_poll,
        }
    }
}

/// The consumer's view of the refresh loop.
#[derive(Debug)]
pub struct RefreshHandle {
    shared: Arc<Mutex<Shared>>,
    cycles: watch::Receiver<u64>,
    cancel: CancellationToken,
    poll: Duration,
}

impl RefreshHandle {
    /// The currently published snapshot. Cloning the `Arc`, not the data.
    pub fn snapshot(&self) -> Option<Arc<ForecastSnapshot>> {
        self.shared.lock().snapshot.clone()
    }

    /// True once the first complete snapshot has been published.
    pub fn initial_data_fetched(&self) -> bool {
        self.shared.lock().initial_data_fetched
    }

    /// True when the most recent cycle republished; false when it found
    /// nothing material.
    pub fn updated(&self) -> bool {
        self.shared.lock().updated
    }

    /// How many cycles the worker has completed, including no-op cycles.
    pub fn completed_cycles(&self) -> u64 {
        *self.cycles.borrow()
    }

    /// Block until the worker signals the next completed cycle. Returns
    /// false once the worker has stopped and no further cycles will come.
    pub async fn wait_for_cycle(&mut self) -> bool {
        self.cycles.changed().await.is_ok()
    }

    /// Block until the first snapshot is published, polling the shared
    /// flag. Returns `None` if the worker stops first.
    pub async fn wait_for_initial_data(&self) -> Option<Arc<ForecastSnapshot>> {
        loop {
            {
                let guard = self.shared.lock();
                if guard.initial_data_fetched {
                    return guard.snapshot.clone();
                }
            }
            if self.cancel.is_cancelled() {
                return None;
            }
            tokio::time::sleep(self.poll).await;
        }
    }

    /// Ask the worker to stop. The token is observed between cycles and
    /// inside the client's retry waits, so an in-flight retry loop does not
    /// hold shutdown hostage.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

struct Worker {
    client: ForecastClient,
    location: LocationConfig,
    shared: Arc<Mutex<Shared>>,
    cancel: CancellationToken,
    interval: Duration,
}

impl Worker {
    async fn run(self, cycle_tx: watch::Sender<u64>) {
        tracing::debug!("Refresh worker started");
        loop {
            match self.run_cycle().await {
                Ok(()) => {}
                Err(FetchError::Cancelled) => break,
                Err(e) => {
                    tracing::error!("Stopping refresh worker: {}", e);
                    break;
                }
            }

            // Signal the cycle even when nothing changed, so a consumer
            // blocked on the handoff always wakes to read the flags.
            cycle_tx.send_modify(|n| *n += 1);

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        tracing::debug!("Refresh worker stopped");
    }

    async fn run_cycle(&self) -> Result<(), FetchError> {
        // Read the published snapshot under the lock, fetch without it, and
        // republish under the lock. The consumer is never blocked behind
        // network I/O, and can never observe a partial update.
        let previous = self.shared.lock().snapshot.clone();

        match previous {
            None => self.initial_fetch().await,
            Some(previous) => self.poll_for_changes(&previous).await,
        }
    }

    async fn initial_fetch(&self) -> Result<(), FetchError> {
        let hourly = self
            .client
            .hourly_forecast(&self.location, &self.cancel)
            .await?;
        let detailed = self
            .client
            .detailed_forecast(&self.location, &self.cancel)
            .await?;
        let alerts = self
            .client
            .active_alerts(&self.location, &self.cancel)
            .await?;

        let (Some(hourly), Some(detailed), Some(alerts)) = (hourly, detailed, alerts) else {
            tracing::warn!("Location is not fully configured, skipping refresh cycle");
            return Ok(());
        };

        let snapshot = Arc::new(ForecastSnapshot {
            hourly,
            detailed,
            alerts,
        });

        let mut guard = self.shared.lock();
        guard.snapshot = Some(snapshot);
        guard.initial_data_fetched = true;
        tracing::info!("Initial forecast data published");
        Ok(())
    }

    async fn poll_for_changes(&self, previous: &Arc<ForecastSnapshot>) -> Result<(), FetchError> {
        let hourly = self
            .client
            .hourly_forecast(&self.location, &self.cancel)
            .await?;
        let alerts = self
            .client
            .active_alerts(&self.location, &self.cancel)
            .await?;

        let (Some(hourly), Some(alerts)) = (hourly, alerts) else {
            tracing::warn!("Location is not fully configured, skipping refresh cycle");
            return Ok(());
        };

        let county = self.location.county.as_deref().unwrap_or_default();
        if !has_material_change(previous, &hourly, &alerts, county) {
            self.shared.lock().updated = false;
            tracing::debug!("Forecast unchanged, keeping published snapshot");
            return Ok(());
        }

        // Something material changed: complete the snapshot with a fresh
        // detailed forecast, reusing the hourly payload just fetched.
        let detailed = self
            .client
            .detailed_forecast(&self.location, &self.cancel)
            .await?;
        let Some(detailed) = detailed else {
            tracing::warn!("Location is not fully configured, skipping refresh cycle");
            return Ok(());
        };

        let snapshot = Arc::new(ForecastSnapshot {
            hourly,
            detailed,
            alerts,
        });

        let mut guard = self.shared.lock();
        guard.snapshot = Some(snapshot);
        guard.updated = true;
        tracing::info!("Forecast changed, published a new snapshot");
        Ok(())
    }
}

// ── Polling bridge ──
//
// Full lifecycle for one bridge instance: the startup inventory cycle,
// two independent periodic tasks (inventory poll and pre-emptive token
// refresh), and clean shutdown. The reconciliation engine sits behind
// a mutex; an inventory tick that arrives while the previous cycle is
// still in flight is dropped, never run concurrently.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use leakbridge_api::{AuthClient, DeviceClient, DeviceRecord, TransportConfig};

use crate::config::BridgeConfig;
use crate::engine::{ReconcileResult, ReconciliationEngine};
use crate::error::CoreError;
use crate::host::AccessoryHost;
use crate::model::{AccessoryRecord, ServiceSet};
use crate::persist::RefreshTokenSink;
use crate::token::TokenStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<BridgeInner>`. Construct with
/// [`new`](Self::new), optionally [`restore`](Self::restore) cached
/// accessories, then [`start`](Self::start).
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    config: BridgeConfig,
    token_store: TokenStore,
    device_client: DeviceClient,
    engine: Mutex<ReconciliationEngine>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Bridge {
    /// Create a new bridge from configuration.
    ///
    /// Fails with [`CoreError::Config`] when a required credential is
    /// missing -- the only startup-fatal condition. Does NOT poll;
    /// call [`start`](Self::start).
    pub fn new(
        config: BridgeConfig,
        host: Arc<dyn AccessoryHost>,
        sink: Arc<dyn RefreshTokenSink>,
    ) -> Result<Self, CoreError> {
        use secrecy::ExposeSecret;

        if config.consumer_key.is_empty() {
            return Err(CoreError::Config {
                message: "consumer_key must be provided".into(),
            });
        }
        if config.refresh_token.expose_secret().is_empty() {
            return Err(CoreError::Config {
                message: "refresh_token must be provided".into(),
            });
        }

        let transport = TransportConfig {
            timeout: config.timeout,
        };

        let auth = AuthClient::new(
            config.token_url.clone(),
            config.proxy_url.clone(),
            config.consumer_key.clone(),
            config.consumer_secret.clone(),
            &transport,
        )?;
        let device_client = DeviceClient::new(
            config.api_base_url.clone(),
            config.consumer_key.clone(),
            &transport,
        )?;

        let token_store = TokenStore::new(auth, &config.refresh_token, sink);
        let services = ServiceSet::from_flags(config.hide_temperature, config.hide_humidity);
        let engine = Mutex::new(ReconciliationEngine::new(host, services));

        Ok(Self {
            inner: Arc::new(BridgeInner {
                config,
                token_store,
                device_client,
                engine,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    /// Seed the registry from host-cached accessories. Must run before
    /// [`start`](Self::start) so the first pass updates instead of
    /// re-registering.
    pub async fn restore(&self, records: Vec<AccessoryRecord>) {
        self.inner.engine.lock().await.restore(records);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the initial inventory cycle (the host "ready" trigger), then
    /// spawn the periodic inventory and token-refresh tasks.
    ///
    /// A failed initial cycle is logged, not fatal: accessories keep
    /// their restored state until the next successful poll.
    pub async fn start(&self) {
        match self.run_inventory_cycle().await {
            Ok(result) => info!(
                created = result.created.len(),
                updated = result.updated.len(),
                removed = result.removed.len(),
                "initial device discovery complete"
            ),
            Err(e) => {
                warn!(error = %e, "initial device discovery failed");
                self.inner.token_store.force_expire().await;
            }
        }

        let mut handles = self.inner.task_handles.lock().await;

        let bridge = self.clone();
        let cancel = self.inner.cancel.clone();
        let period = self.inner.config.polling_period();
        handles.push(tokio::spawn(inventory_task(bridge, period, cancel)));

        let bridge = self.clone();
        let cancel = self.inner.cancel.clone();
        let period = self.inner.config.token_refresh_period();
        handles.push(tokio::spawn(token_refresh_task(bridge, period, cancel)));

        info!("bridge started");
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        debug!("bridge stopped");
    }

    // ── Cycles ───────────────────────────────────────────────────────

    /// One full inventory cycle: ensure token, fetch, reconcile.
    pub async fn run_inventory_cycle(&self) -> Result<ReconcileResult, CoreError> {
        let mut engine = self.inner.engine.lock().await;
        self.cycle_locked(&mut engine).await
    }

    async fn cycle_locked(
        &self,
        engine: &mut ReconciliationEngine,
    ) -> Result<ReconcileResult, CoreError> {
        let token = self.inner.token_store.ensure_valid_token().await?;

        let locations = self
            .inner
            .device_client
            .list_locations(&token)
            .await
            .map_err(CoreError::from)?;

        debug!(locations = locations.len(), "fetched inventory");

        let inventory: Vec<DeviceRecord> = locations
            .into_iter()
            .flat_map(|location| location.devices)
            .collect();

        Ok(engine.reconcile(inventory))
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub async fn accessories(&self) -> Vec<AccessoryRecord> {
        self.inner.engine.lock().await.registry().snapshot()
    }

    pub async fn accessory_count(&self) -> usize {
        self.inner.engine.lock().await.registry().len()
    }

    /// The refresh token currently in memory (visible for tests and
    /// the daemon's status output).
    pub async fn current_refresh_token(&self) -> String {
        self.inner.token_store.current_refresh_token().await
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically poll the inventory and reconcile.
async fn inventory_task(bridge: Bridge, period: std::time::Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // the initial cycle ran in start()

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Overlap guard: skip the tick rather than run two
                // reconcile passes against the same registry.
                let Ok(mut engine) = bridge.inner.engine.try_lock() else {
                    warn!("previous inventory cycle still in flight; dropping tick");
                    continue;
                };

                match bridge.cycle_locked(&mut engine).await {
                    Ok(result) if result.is_steady() => {
                        debug!(updated = result.updated.len(), "inventory poll steady");
                    }
                    Ok(result) => info!(
                        created = result.created.len(),
                        updated = result.updated.len(),
                        removed = result.removed.len(),
                        "inventory poll applied changes"
                    ),
                    Err(e) => {
                        warn!(error = %e, "inventory poll failed; will retry with a fresh token");
                        if e.invalidates_token() {
                            bridge.inner.token_store.force_expire().await;
                        }
                    }
                }
            }
        }
    }
}

/// Pre-emptively refresh the access token between inventory polls.
async fn token_refresh_task(
    bridge: Bridge,
    period: std::time::Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = bridge.inner.token_store.ensure_valid_token().await {
                    warn!(error = %e, "pre-emptive token refresh failed");
                }
            }
        }
    }
}

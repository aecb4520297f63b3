//! Live refresh of a dashboard query
//!
//! Refetches the current window on the mode's refresh interval and publishes
//! each result on the [`EventBus`]. Custom windows are fetched once. Fetch
//! errors are published and the loop carries on.

use chrono::{DateTime, FixedOffset, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::analytics::summarize_forecast;
use crate::client::ForecastClient;
use crate::config::GatecastConfig;
use crate::error::CoreError;
use crate::event::{EventBus, ForecastEvent, ForecastSnapshot};
use crate::window::DashboardQuery;

/// Configuration for the live poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Refresh period of live modes
    pub interval: Duration,
    /// Wall-clock offset used to compute windows
    pub offset: FixedOffset,
}

impl PollerConfig {
    pub fn from_config(config: &GatecastConfig) -> Self {
        Self {
            interval: config.refresh_interval(),
            offset: config.offset(),
        }
    }
}

/// Fetch the forecast plus the share and ranking used by the summary
pub async fn fetch_snapshot(
    client: &ForecastClient,
    query: &DashboardQuery,
    now: DateTime<FixedOffset>,
) -> Result<ForecastSnapshot, CoreError> {
    let (window, response) = client.forecast(query, now).await?;

    // secondary panels degrade to "-" instead of failing the refresh
    let share = client
        .movetype_share(&window, &query.terminal, &query.desig)
        .await
        .map_err(|e| warn!(error = %e, "Move type share unavailable"))
        .ok();
    let ranking = client
        .terminal_ranking(&window, &query.move_type, &query.desig)
        .await
        .map_err(|e| warn!(error = %e, "Terminal ranking unavailable"))
        .ok();

    let summary = summarize_forecast(
        &response,
        share.as_ref().map(|s| &s.share),
        ranking.as_ref().map(|r| r.ranking.as_slice()),
    );

    Ok(ForecastSnapshot {
        query: query.clone(),
        window,
        response,
        summary,
        fetched_at: Utc::now(),
    })
}

/// Background task polling one query
pub struct LivePoller {
    shutdown_tx: mpsc::Sender<()>,
    latest: Arc<RwLock<Option<Arc<ForecastSnapshot>>>>,
    handle: JoinHandle<()>,
}

impl LivePoller {
    /// Spawn the polling task; the first fetch happens immediately
    pub fn start(
        client: Arc<ForecastClient>,
        query: DashboardQuery,
        config: PollerConfig,
        bus: EventBus,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let latest: Arc<RwLock<Option<Arc<ForecastSnapshot>>>> = Arc::new(RwLock::new(None));
        let slot = Arc::clone(&latest);

        info!(
            terminal = %query.terminal,
            mode = %query.mode,
            interval_secs = config.interval.as_secs(),
            "Live poller started"
        );

        let handle = tokio::spawn(async move {
            let mut reported_clamps = client.counters().total();

            loop {
                let now = Utc::now().with_timezone(&config.offset);
                match fetch_snapshot(&client, &query, now).await {
                    Ok(snapshot) => {
                        debug!(
                            window_start = %snapshot.window.start,
                            points = snapshot.response.horizon_hours.len(),
                            "Forecast refreshed"
                        );
                        let snapshot = Arc::new(snapshot);
                        *slot.write() = Some(Arc::clone(&snapshot));
                        bus.publish(ForecastEvent::Updated(snapshot));
                    }
                    Err(e) => {
                        warn!(error = %e, "Forecast refresh failed");
                        bus.publish(ForecastEvent::FetchFailed(e.to_string()));
                    }
                }

                let clamps = client.counters().total();
                if clamps > reported_clamps {
                    reported_clamps = clamps;
                    bus.publish(ForecastEvent::DataQuality(client.counters().snapshot()));
                }

                let Some(every) = query.mode.refetch_interval(config.interval) else {
                    debug!("Custom window fetched once, poller done");
                    break;
                };

                tokio::select! {
                    _ = tokio::time::sleep(every) => {}
                    _ = shutdown_rx.recv() => {
                        info!("Live poller shutting down");
                        break;
                    }
                }
            }

            bus.publish(ForecastEvent::Stopped);
        });

        Self {
            shutdown_tx,
            latest,
            handle,
        }
    }

    /// Most recent successful snapshot
    pub fn latest(&self) -> Option<Arc<ForecastSnapshot>> {
        self.latest.read().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal shutdown and wait for the task to exit
    pub async fn stop(self) {
        // already finished when the receiver is gone
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Live poller task ended abnormally");
        }
    }
}

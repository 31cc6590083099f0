// crates/exports/src/monitor.rs
//! Tokio runtime wiring around the tracker.
//!
//! Mirrors the single-threaded, event-driven model: every registry mutation
//! happens on the signal loop (snapshot or push delivery) or the reaper
//! tick, each a synchronous transition followed by event broadcast. The
//! write lock serializes those logical producers; nothing suspends while
//! holding it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, info};

use clipdeck_types::RecoverySnapshot;

use crate::config::TrackerConfig;
use crate::tracker::{ExportEvent, ExportTracker};
use crate::view::IndicatorView;

/// Capacity of the broadcast channel toward SSE subscribers.
const EVENT_CHANNEL_CAPACITY: usize = 256;
/// Capacity of the inbound signal channel from the transport layer.
const SIGNAL_CHANNEL_CAPACITY: usize = 512;

/// One inbound delivery from the transport collaborators.
#[derive(Debug)]
pub enum InboundSignal {
    /// Server-authoritative full sync, delivered on (re)connect.
    Snapshot(RecoverySnapshot),
    /// One raw push payload, unordered and at-least-once.
    Push(serde_json::Value),
}

/// Owns the tracker and its two background tasks (signal loop + reaper).
pub struct ExportMonitor {
    tracker: Arc<RwLock<ExportTracker>>,
    tx: broadcast::Sender<ExportEvent>,
}

impl ExportMonitor {
    /// Start the monitor and its background tasks.
    ///
    /// Returns the monitor and the sender the transport layer feeds with
    /// snapshots and push payloads. Dropping the sender ends the signal
    /// loop; the reaper runs until the process exits.
    pub fn start(config: TrackerConfig) -> (Arc<Self>, mpsc::Sender<InboundSignal>) {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);

        let monitor = Arc::new(Self {
            tracker: Arc::new(RwLock::new(ExportTracker::new(config))),
            tx,
        });

        monitor.spawn_signal_loop(signal_rx);
        monitor.spawn_reaper(config);

        info!(
            fresh_window_secs = config.fresh_window.as_secs(),
            reap_interval_secs = config.reap_interval.as_secs(),
            "export monitor started"
        );

        (monitor, signal_tx)
    }

    /// Subscribe to registry-change events for SSE streaming.
    pub fn subscribe(&self) -> broadcast::Receiver<ExportEvent> {
        self.tx.subscribe()
    }

    /// Recompute the indicator view for a route handler.
    pub async fn view(&self) -> IndicatorView {
        self.tracker.read().await.view(Utc::now())
    }

    /// User dismissal of a terminal entry; broadcasts the removal.
    pub async fn dismiss(&self, job_id: &str) {
        let events = self.tracker.write().await.dismiss(job_id);
        self.forward(events);
    }

    fn spawn_signal_loop(self: &Arc<Self>, mut rx: mpsc::Receiver<InboundSignal>) {
        let monitor = self.clone();
        tokio::spawn(async move {
            while let Some(signal) = rx.recv().await {
                let now = Utc::now();
                let events = {
                    let mut tracker = monitor.tracker.write().await;
                    match signal {
                        InboundSignal::Snapshot(snapshot) => {
                            tracker.apply_snapshot(&snapshot, now)
                        }
                        InboundSignal::Push(raw) => tracker.apply_raw(&raw, now),
                    }
                };
                monitor.forward(events);
            }
            debug!("signal channel closed; export signal loop ending");
        });
    }

    fn spawn_reaper(self: &Arc<Self>, config: TrackerConfig) {
        let monitor = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.reap_interval);
            loop {
                interval.tick().await;
                let pruned = monitor.tracker.write().await.reap();
                if pruned > 0 {
                    info!(pruned, "reaped notification ledger entries");
                }
            }
        });
    }

    fn forward(&self, events: Vec<ExportEvent>) {
        for event in events {
            // Ignore send errors (no subscribers is fine).
            let _ = self.tx.send(event);
        }
    }
}

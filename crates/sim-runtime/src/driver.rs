//! Cancellable auto-advance loop over a shared engine.
//!
//! A single spawned task owns the loop, so at most one `advance_week` is
//! in flight at any time. Stopping waits for the task to finish.

use crate::SavingsEngine;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Drives `advance_week` on a fixed cadence until stopped.
pub struct AutoAdvance {
    engine: Arc<Mutex<SavingsEngine>>,
    shutdown_tx: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl AutoAdvance {
    pub fn new(engine: Arc<Mutex<SavingsEngine>>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            engine,
            shutdown_tx,
            handle: None,
        }
    }

    /// Whether the loop task is still live. The loop can exit on its own
    /// (poisoned engine mutex), so a held handle alone is not enough.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the loop, advancing once per `period`. If a loop is already
    /// running it is stopped first, so changing cadence is a restart.
    pub async fn start(&mut self, period: Duration) {
        self.stop().await;

        let engine = Arc::clone(&self.engine);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the first advance happens one full period after start.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        let outcome = match engine.lock() {
                            Ok(mut eng) => eng.advance_week(),
                            Err(_) => {
                                warn!("engine mutex poisoned; stopping auto-advance");
                                break;
                            }
                        };
                        match outcome {
                            Ok(entry) => {
                                info!(week = entry.week, interest = %entry.total_interest_generated, "auto-advanced");
                            }
                            Err(e) => warn!(error = %e, "auto-advance failed"),
                        }
                    }
                }
            }
        });
        self.handle = Some(handle);
        info!(period_ms = period.as_millis() as u64, "auto-advance started");
    }

    /// Signal the loop to stop and wait for the task to finish. A no-op
    /// when nothing is running.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown_tx.send(());
            let _ = handle.await;
            info!("auto-advance stopped");
        }
    }
}

//! In-process event plumbing for the notification side.
//!
//! Events are emitted after a transaction commits and are strictly
//! fire-and-forget: a full channel or a gone receiver is logged and
//! swallowed, never surfaced to the flow that produced the event.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use stockbook_core::alerts::{self, StockAlert};
use stockbook_core::document::DocumentKind;
use stockbook_shared::types::{DocumentId, ProductId, WarehouseId};
use stockbook_shared::PolicyConfig;

use crate::repositories::stock::{MovementError, StockRepository};

/// Events emitted by the engine for observers.
#[derive(Debug, Clone)]
pub enum StockEvent {
    /// A lot quantity changed through a movement, transfer, or adjustment.
    StockChanged {
        /// Product whose lot changed.
        product: ProductId,
        /// Warehouse holding the lot.
        warehouse: WarehouseId,
        /// Batch label, `None` for the batchless bucket.
        batch: Option<String>,
        /// Quantity on hand after the change.
        on_hand: Decimal,
    },
    /// A document applied its stock and ledger effects.
    DocumentRealized {
        /// The realized document.
        document: DocumentId,
        /// Its kind.
        kind: DocumentKind,
        /// Its human-facing reference.
        reference: String,
    },
    /// A refund was paid out.
    RefundProcessed {
        /// The sale return that was refunded.
        document: DocumentId,
        /// Amount paid.
        amount: Decimal,
    },
    /// A stock condition crossed a policy threshold.
    Alert(StockAlert),
}

/// Cloneable sending half handed to repositories.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<StockEvent>,
}

impl EventSender {
    /// Wraps an existing channel sender.
    #[must_use]
    pub const fn new(sender: mpsc::Sender<StockEvent>) -> Self {
        Self { sender }
    }

    /// Sends an event without blocking the caller's flow.
    ///
    /// Failures are logged and dropped; the business operation that raised
    /// the event has already committed and must not be disturbed.
    pub fn send(&self, event: StockEvent) {
        if let Err(err) = self.sender.try_send(event) {
            warn!(error = %err, "event channel full or closed, dropping event");
        }
    }
}

/// Creates an event channel with the given capacity.
#[must_use]
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<StockEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event.
///
/// This is the default consumer; a deployment wanting webhooks or email
/// replaces it with its own loop over the receiver.
pub async fn process_events(mut rx: mpsc::Receiver<StockEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            StockEvent::StockChanged {
                product,
                warehouse,
                batch,
                on_hand,
            } => {
                debug!(%product, %warehouse, batch = batch.as_deref(), %on_hand, "stock changed");
            }
            StockEvent::DocumentRealized {
                document,
                kind,
                reference,
            } => {
                info!(%document, %kind, %reference, "document realized");
            }
            StockEvent::RefundProcessed { document, amount } => {
                info!(%document, %amount, "refund processed");
            }
            StockEvent::Alert(alert) => {
                warn!(alert = %alert, "stock alert");
            }
        }
    }
}

/// Periodic watcher turning stock snapshots into alert events.
///
/// The watcher only reads. It never blocks a sale, holds no lock across
/// sweeps, and a failed sweep just waits for the next tick.
pub struct ThresholdWatcher {
    stock: StockRepository,
    policy: PolicyConfig,
    events: EventSender,
    interval: Duration,
}

impl ThresholdWatcher {
    /// Creates a watcher sweeping at the given interval.
    #[must_use]
    pub const fn new(
        stock: StockRepository,
        policy: PolicyConfig,
        events: EventSender,
        interval: Duration,
    ) -> Self {
        Self {
            stock,
            policy,
            events,
            interval,
        }
    }

    /// Runs the watcher until the process shuts down.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.sweep().await {
                Ok(alerts) if !alerts.is_empty() => {
                    info!(count = alerts.len(), "stock sweep raised alerts");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "stock sweep failed, retrying next tick");
                }
            }
        }
    }

    /// One sweep: snapshot, evaluate against policy, emit alerts.
    ///
    /// # Errors
    ///
    /// Returns an error when a snapshot query fails.
    pub async fn sweep(&self) -> Result<Vec<StockAlert>, MovementError> {
        let lows = self
            .stock
            .low_stock_snapshot(self.policy.low_stock_threshold)
            .await?;
        let expired = self
            .stock
            .expired_snapshot(Utc::now().date_naive())
            .await?;

        let alerts = alerts::evaluate(&lows, &expired, &self.policy);
        for alert in &alerts {
            self.events.send(StockEvent::Alert(alert.clone()));
        }
        Ok(alerts)
    }
}

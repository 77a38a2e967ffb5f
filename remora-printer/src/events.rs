//! Printer event bus
//!
//! Single publish-point, multi-subscriber fan-out of lifecycle events.
//! Delivery is best-effort and never blocks the publisher: with no subscriber
//! an event is dropped, and a subscriber that falls behind the bounded buffer
//! loses the oldest events (`RecvError::Lagged`) instead of stalling a print
//! job. Events are advisory and are not part of the printing correctness
//! contract.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Default broadcast buffer size per subscriber
const DEFAULT_CAPACITY: usize = 16;

/// All events in the printer lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PrinterEvent {
    // Bluetooth discovery
    DiscoveryStarted,
    DiscoveryStopped,
    DeviceFound {
        name: String,
        address: String,
    },

    // Connection
    Connecting {
        address: String,
    },
    Connected {
        address: String,
    },
    Disconnected {
        address: String,
    },
    ConnectionFailed {
        address: String,
        error: String,
    },

    // Print jobs
    #[serde(rename_all = "camelCase")]
    JobStarted {
        job_id: String,
    },
    #[serde(rename_all = "camelCase")]
    JobCompleted {
        job_id: String,
    },
    #[serde(rename_all = "camelCase")]
    JobFailed {
        job_id: String,
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    JobProgress {
        job_id: String,
        progress: u8,
    },
}

impl PrinterEvent {
    /// Callback name this event is surfaced under at the bridge boundary
    pub fn bridge_event(&self) -> &'static str {
        match self {
            PrinterEvent::DiscoveryStarted
            | PrinterEvent::DiscoveryStopped
            | PrinterEvent::DeviceFound { .. } => "onDeviceDiscovered",
            PrinterEvent::Connecting { .. }
            | PrinterEvent::Connected { .. }
            | PrinterEvent::Disconnected { .. }
            | PrinterEvent::ConnectionFailed { .. } => "onConnectionChanged",
            PrinterEvent::JobStarted { .. } | PrinterEvent::JobProgress { .. } => "onPrintProgress",
            PrinterEvent::JobCompleted { .. } => "onPrintCompleted",
            PrinterEvent::JobFailed { .. } => "onPrintError",
        }
    }
}

/// Publish/subscribe mechanism for printer events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PrinterEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event; never blocks, never fails the caller
    pub fn publish(&self, event: PrinterEvent) {
        trace!(?event, "publish");
        // send only errors when there are no subscribers; the event is dropped
        let _ = self.tx.send(event);
    }

    /// Subscribe to all events published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<PrinterEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

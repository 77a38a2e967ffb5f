//! Printer connectivity service
//!
//! Tracks the one live connection, delegates transport work to the device
//! capability, and publishes connection lifecycle events. Connect failures
//! surface immediately; retry policy, if any, belongs to the caller.

use crate::device::{PrinterDevice, PrinterStatus};
use crate::error::{PrintError, PrintResult};
use crate::events::{EventBus, PrinterEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Connection transports supported by printer adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    #[default]
    Bluetooth,
    Wifi,
    Usb,
    Unknown,
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Parameters for a connection attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default = "default_connect_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> u16 {
    9100
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Current connection snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub address: String,
    pub port: u16,
    pub transport: Transport,
    pub state: ConnectionState,
}

/// Connectivity operations over the shared device
pub struct ConnectionService {
    device: Arc<dyn PrinterDevice>,
    events: EventBus,
    current: Mutex<Option<ConnectionInfo>>,
}

impl ConnectionService {
    pub fn new(device: Arc<dyn PrinterDevice>, events: EventBus) -> Self {
        Self {
            device,
            events,
            current: Mutex::new(None),
        }
    }

    /// Connect to a printer
    #[instrument(skip(self, config), fields(address = %config.address, port = config.port))]
    pub async fn connect(&self, config: ConnectionConfig) -> PrintResult<ConnectionInfo> {
        let info = ConnectionInfo {
            address: config.address.clone(),
            port: config.port,
            transport: config.transport,
            state: ConnectionState::Connecting,
        };
        *self.current.lock() = Some(info.clone());
        self.events.publish(PrinterEvent::Connecting {
            address: config.address.clone(),
        });

        let deadline = Duration::from_millis(config.timeout_ms);
        let attempt = self.device.connect(&config.address, config.port);
        let outcome = match tokio::time::timeout(deadline, attempt).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("connect timeout after {}ms", config.timeout_ms)),
        };

        match outcome {
            Ok(()) => {
                let connected = ConnectionInfo {
                    state: ConnectionState::Connected,
                    ..info
                };
                *self.current.lock() = Some(connected.clone());
                self.events.publish(PrinterEvent::Connected {
                    address: config.address.clone(),
                });
                info!("connected");
                Ok(connected)
            }
            Err(reason) => {
                if let Some(current) = self.current.lock().as_mut() {
                    current.state = ConnectionState::Error;
                }
                self.events.publish(PrinterEvent::ConnectionFailed {
                    address: config.address.clone(),
                    error: reason.clone(),
                });
                warn!(error = %reason, "connection failed");
                Err(PrintError::Connection(format!(
                    "{}: {reason}",
                    config.address
                )))
            }
        }
    }

    /// Connect via Bluetooth by MAC address
    pub async fn connect_bluetooth(&self, address: &str) -> PrintResult<ConnectionInfo> {
        self.connect(ConnectionConfig {
            address: address.to_string(),
            port: default_port(),
            transport: Transport::Bluetooth,
            timeout_ms: default_connect_timeout_ms(),
        })
        .await
    }

    /// Connect via WiFi (raw TCP)
    pub async fn connect_wifi(&self, ip: &str, port: u16) -> PrintResult<ConnectionInfo> {
        self.connect(ConnectionConfig {
            address: ip.to_string(),
            port,
            transport: Transport::Wifi,
            timeout_ms: default_connect_timeout_ms(),
        })
        .await
    }

    /// Disconnect from the current printer
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> PrintResult<()> {
        self.device
            .disconnect()
            .await
            .map_err(|e| PrintError::Connection(e.to_string()))?;

        let address = self
            .current
            .lock()
            .take()
            .map(|c| c.address)
            .unwrap_or_default();
        self.events.publish(PrinterEvent::Disconnected { address });
        info!("disconnected");
        Ok(())
    }

    /// Query live status from the device
    pub async fn status(&self) -> PrintResult<PrinterStatus> {
        self.device.status().await.map_err(|e| match e {
            crate::device::DeviceError::NotConnected => PrintError::NotConnected,
            other => PrintError::Connection(other.to_string()),
        })
    }

    /// Quick cached check; does not touch the device
    pub fn is_connected(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|c| c.state == ConnectionState::Connected)
    }

    /// Cached connection info, if any
    pub fn current(&self) -> Option<ConnectionInfo> {
        self.current.lock().clone()
    }
}

//! Bluetooth discovery and permission boundary
//!
//! The SDK consumes platform Bluetooth through these traits; the actual
//! adapter/permission plumbing is platform work and lives outside this crate.

use crate::error::{PrintError, PrintResult};
use crate::events::{EventBus, PrinterEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Bluetooth device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BluetoothDeviceType {
    Classic,
    Le,
    Dual,
    #[default]
    Unknown,
}

/// Information about a paired or discovered Bluetooth device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BluetoothDeviceInfo {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub device_type: BluetoothDeviceType,
    /// Name-heuristic flag set by the platform provider
    pub is_printer: bool,
}

/// Platform Bluetooth operations
#[async_trait]
pub trait BluetoothProvider: Send + Sync {
    /// Bluetooth hardware present on this device
    fn is_supported(&self) -> bool;

    /// Bluetooth currently turned on
    fn is_enabled(&self) -> bool;

    /// Paired/bonded devices
    async fn paired_devices(&self) -> PrintResult<Vec<BluetoothDeviceInfo>>;

    /// Start scanning; `true` if scanning actually started
    async fn start_discovery(&self) -> PrintResult<bool>;

    /// Stop scanning
    async fn stop_discovery(&self) -> PrintResult<bool>;

    fn is_discovering(&self) -> bool;
}

/// Platform permission checks required before any Bluetooth call
pub trait PermissionProvider: Send + Sync {
    fn has_required_permissions(&self) -> bool;

    /// Permission identifiers still missing, for surfacing to the caller
    fn missing_permissions(&self) -> Vec<String>;
}

/// Discovery operations plus event publication
pub struct DiscoveryService {
    provider: Arc<dyn BluetoothProvider>,
    events: EventBus,
}

impl DiscoveryService {
    pub fn new(provider: Arc<dyn BluetoothProvider>, events: EventBus) -> Self {
        Self { provider, events }
    }

    pub fn is_supported(&self) -> bool {
        self.provider.is_supported()
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_enabled()
    }

    pub fn is_discovering(&self) -> bool {
        self.provider.is_discovering()
    }

    /// All paired devices
    pub async fn paired_devices(&self) -> PrintResult<Vec<BluetoothDeviceInfo>> {
        self.ensure_available()?;
        let devices = self.provider.paired_devices().await?;
        debug!(count = devices.len(), "paired devices listed");
        Ok(devices)
    }

    /// Paired devices that look like printers
    pub async fn paired_printers(&self) -> PrintResult<Vec<BluetoothDeviceInfo>> {
        Ok(self
            .paired_devices()
            .await?
            .into_iter()
            .filter(|d| d.is_printer)
            .collect())
    }

    /// Start discovery; discovered devices arrive on the event bus
    pub async fn start_discovery(&self) -> PrintResult<bool> {
        self.ensure_available()?;
        let started = self.provider.start_discovery().await?;
        if started {
            self.events.publish(PrinterEvent::DiscoveryStarted);
            info!("discovery started");
        }
        Ok(started)
    }

    /// Stop discovery
    pub async fn stop_discovery(&self) -> PrintResult<bool> {
        let stopped = self.provider.stop_discovery().await?;
        if stopped {
            self.events.publish(PrinterEvent::DiscoveryStopped);
            info!("discovery stopped");
        }
        Ok(stopped)
    }

    /// Publish a device found by the platform scan callback
    pub fn announce(&self, device: &BluetoothDeviceInfo) {
        self.events.publish(PrinterEvent::DeviceFound {
            name: device.name.clone(),
            address: device.address.clone(),
        });
    }

    fn ensure_available(&self) -> PrintResult<()> {
        if !self.provider.is_supported() {
            return Err(PrintError::Bluetooth("not supported on this device".to_string()));
        }
        if !self.provider.is_enabled() {
            return Err(PrintError::Bluetooth("disabled".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeProvider {
        supported: bool,
        enabled: bool,
        discovering: AtomicBool,
        devices: Vec<BluetoothDeviceInfo>,
    }

    impl FakeProvider {
        fn with_devices(devices: Vec<BluetoothDeviceInfo>) -> Self {
            Self {
                supported: true,
                enabled: true,
                discovering: AtomicBool::new(false),
                devices,
            }
        }
    }

    #[async_trait]
    impl BluetoothProvider for FakeProvider {
        fn is_supported(&self) -> bool {
            self.supported
        }
        fn is_enabled(&self) -> bool {
            self.enabled
        }
        async fn paired_devices(&self) -> PrintResult<Vec<BluetoothDeviceInfo>> {
            Ok(self.devices.clone())
        }
        async fn start_discovery(&self) -> PrintResult<bool> {
            self.discovering.store(true, Ordering::SeqCst);
            Ok(true)
        }
        async fn stop_discovery(&self) -> PrintResult<bool> {
            self.discovering.store(false, Ordering::SeqCst);
            Ok(true)
        }
        fn is_discovering(&self) -> bool {
            self.discovering.load(Ordering::SeqCst)
        }
    }

    fn device(name: &str, is_printer: bool) -> BluetoothDeviceInfo {
        BluetoothDeviceInfo {
            name: name.to_string(),
            address: "00:11:22:33:44:55".to_string(),
            device_type: BluetoothDeviceType::Classic,
            is_printer,
        }
    }

    #[tokio::test]
    async fn test_paired_printers_filters_non_printers() {
        let service = DiscoveryService::new(
            Arc::new(FakeProvider::with_devices(vec![
                device("SPP-R310", true),
                device("Headphones", false),
            ])),
            EventBus::new(),
        );

        let printers = service.paired_printers().await.unwrap();
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].name, "SPP-R310");
    }

    #[tokio::test]
    async fn test_discovery_publishes_lifecycle_events() {
        let service = DiscoveryService::new(
            Arc::new(FakeProvider::with_devices(vec![])),
            EventBus::new(),
        );
        let mut rx = service.events.subscribe();

        assert!(service.start_discovery().await.unwrap());
        assert!(service.is_discovering());
        service.announce(&device("SPP-R310", true));
        assert!(service.stop_discovery().await.unwrap());

        assert!(matches!(rx.try_recv().unwrap(), PrinterEvent::DiscoveryStarted));
        assert!(matches!(rx.try_recv().unwrap(), PrinterEvent::DeviceFound { .. }));
        assert!(matches!(rx.try_recv().unwrap(), PrinterEvent::DiscoveryStopped));
    }

    #[test]
    fn test_missing_permissions_are_reported() {
        struct DeniedPermissions;

        impl PermissionProvider for DeniedPermissions {
            fn has_required_permissions(&self) -> bool {
                false
            }
            fn missing_permissions(&self) -> Vec<String> {
                vec!["BLUETOOTH_CONNECT".to_string(), "BLUETOOTH_SCAN".to_string()]
            }
        }

        let permissions = DeniedPermissions;
        assert!(!permissions.has_required_permissions());
        assert_eq!(permissions.missing_permissions().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_bluetooth_fails_fast() {
        let provider = FakeProvider {
            supported: true,
            enabled: false,
            discovering: AtomicBool::new(false),
            devices: vec![],
        };
        let service = DiscoveryService::new(Arc::new(provider), EventBus::new());

        let err = service.start_discovery().await.unwrap_err();
        assert_eq!(err.code(), "BLUETOOTH_UNAVAILABLE");
    }
}

//! # remora-printer
//!
//! Device-control SDK for thermal/label printers (Bluetooth, WiFi, USB).
//!
//! ## Scope
//!
//! The crate turns a declarative receipt description into positioned draw
//! calls against a vendor printer, executed inside a serialized,
//! all-or-nothing print session:
//!
//! - Receipt model: header/body/footer of text, key-value, QR, barcode,
//!   image, separator, spacer, and column lines
//! - Layout engine: pure computation of absolute (x, y) draw positions
//! - Session coordinator: one job at a time against the one shared device,
//!   with setup → draws → print → teardown lifecycle and guaranteed lock
//!   release
//! - Event bus: best-effort lifecycle events for UI/bridge consumers
//!
//! Vendor SDKs plug in underneath the [`PrinterDevice`] trait; platform
//! Bluetooth plugs in behind [`BluetoothProvider`]. Neither ships here.
//!
//! ## Example
//!
//! ```ignore
//! use remora_printer::{
//!     EventBus, MediaConfig, PrintService, Receipt, ReceiptLine,
//!     SessionCoordinator,
//! };
//!
//! let events = EventBus::new();
//! let coordinator = Arc::new(SessionCoordinator::new(adapter, events.clone()));
//! let service = PrintService::new(coordinator);
//!
//! let receipt = Receipt::builder()
//!     .header(ReceiptLine::Text {
//!         content: "MY STORE".into(),
//!         font_size: FontSize::Large,
//!         bold: true,
//!         alignment: Alignment::Center,
//!     })
//!     .body(ReceiptLine::KeyValue {
//!         key: "Total".into(),
//!         value: "$10.00".into(),
//!         font_size: FontSize::Medium,
//!         bold: false,
//!     })
//!     .build();
//!
//! service.print_receipt(&receipt, MediaConfig::continuous_80mm(), 1).await?;
//! ```

mod bitmap;
mod bluetooth;
mod connection;
mod device;
mod error;
mod events;
mod job;
mod layout;
mod media;
mod receipt;
mod service;
mod session;

// Re-exports
pub use bitmap::{ImageHandle, PdfRenderer};
pub use bluetooth::{
    BluetoothDeviceInfo, BluetoothDeviceType, BluetoothProvider, DiscoveryService,
    PermissionProvider,
};
pub use connection::{
    ConnectionConfig, ConnectionInfo, ConnectionService, ConnectionState, Transport,
};
pub use device::{DeviceError, DeviceResult, PrinterDevice, PrinterStatus};
pub use error::{PrintError, PrintResult};
pub use events::{EventBus, PrinterEvent};
pub use job::{PrintJob, PrintJobStatus};
pub use layout::{DrawCommand, LayoutConfig, LayoutEngine, LayoutResult};
pub use media::{DOTS_PER_MM, MediaConfig, MediaType};
pub use receipt::{
    Alignment, BarcodeSymbology, Column, FontSize, Receipt, ReceiptBuilder, ReceiptLine,
};
pub use service::{
    BarcodeOptions, ImageOptions, KeyValueOptions, PrintService, QrOptions, TextOptions,
};
pub use session::{DEFAULT_COMPLETION_TIMEOUT_MS, JobContext, SessionCoordinator};

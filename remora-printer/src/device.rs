//! Device capability interface
//!
//! The minimal operation set the session coordinator needs, independent of
//! vendor. Each printer brand/transport implements this trait; the vendor
//! wire protocol stays opaque below it.
//!
//! Errors are values at this boundary: adapters must catch whatever their
//! vendor SDK raises and convert it into a [`DeviceError`]. Nothing else
//! may cross.

use crate::bitmap::ImageHandle;
use crate::media::MediaConfig;
use crate::receipt::BarcodeSymbology;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Device-level error carrying a human-readable cause
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// No live connection to the device
    #[error("not connected")]
    NotConnected,

    /// Transport-level connect failure
    #[error("connection failed: {0}")]
    Connection(String),

    /// A device command was rejected or failed
    #[error("command failed: {0}")]
    Command(String),

    /// The device did not respond within the deadline
    #[error("timed out after {0}ms")]
    Timeout(u64),
}

/// Result type for device capability operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Printer status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    pub connected: bool,
    pub has_paper: bool,
    pub has_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Contract every printer adapter implements.
///
/// Draw operations take absolute positions in device dots; `alignment` is the
/// vendor numeric code (0=left, 1=center, 2=right) and is informational for
/// adapters whose SDK renders its own alignment, since the layout engine
/// always supplies a fully resolved x.
#[async_trait]
pub trait PrinterDevice: Send + Sync {
    /// Open a connection to the device
    async fn connect(&self, address: &str, port: u16) -> DeviceResult<()>;

    /// Close the current connection
    async fn disconnect(&self) -> DeviceResult<()>;

    /// Query device status
    async fn status(&self) -> DeviceResult<PrinterStatus>;

    /// Reset the printer to a known state
    async fn initialize(&self) -> DeviceResult<()>;

    /// Configure media dimensions and boundary detection
    async fn configure_media(&self, media: &MediaConfig) -> DeviceResult<()>;

    /// Clear any previously buffered draw commands
    async fn clear_buffer(&self) -> DeviceResult<()>;

    /// Start buffering a batch of draw commands
    async fn begin_transaction(&self) -> DeviceResult<()>;

    /// End the current draw batch
    async fn end_transaction(&self) -> DeviceResult<()>;

    /// Draw text at an absolute position
    async fn draw_text(
        &self,
        text: &str,
        x: i32,
        y: i32,
        font_dots: i32,
        bold: bool,
        alignment: u8,
    ) -> DeviceResult<()>;

    /// Draw a QR code; `size` is the module scale (1-10)
    async fn draw_qr(&self, data: &str, x: i32, y: i32, size: i32) -> DeviceResult<()>;

    /// Draw a one-dimensional barcode
    async fn draw_barcode(
        &self,
        data: &str,
        x: i32,
        y: i32,
        symbology: BarcodeSymbology,
        module_width: i32,
        height: i32,
    ) -> DeviceResult<()>;

    /// Draw a decoded bitmap
    async fn draw_bitmap(&self, image: &ImageHandle, x: i32, y: i32) -> DeviceResult<()>;

    /// Advance the paper by the given number of dots
    async fn feed(&self, dots: i32) -> DeviceResult<()>;

    /// Cut the paper (no-op on devices without a cutter)
    async fn cut(&self) -> DeviceResult<()>;

    /// Commit the buffered batch to paper
    async fn print(&self, copies: u32) -> DeviceResult<()>;

    /// Block until the hardware confirms output completion or the deadline
    /// passes
    async fn wait_for_completion(&self, timeout_ms: u64) -> DeviceResult<()>;
}

//! Error types for the printer SDK

use thiserror::Error;

/// Printer SDK error types
///
/// Every failure carries a human-readable cause plus a short machine-checkable
/// code (see [`PrintError::code`]) so bridge callers can branch without
/// parsing messages.
#[derive(Debug, Clone, Error)]
pub enum PrintError {
    /// Bluetooth is unsupported, disabled, or missing permissions
    #[error("Bluetooth unavailable: {0}")]
    Bluetooth(String),

    /// Device unreachable, wrong address, or connect timeout
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Operation attempted while no device session is live
    #[error("Printer not connected")]
    NotConnected,

    /// One of the setup steps (initialize, configure media, clear buffer,
    /// begin transaction) failed; later steps were not attempted
    #[error("Setup failed at {step}: {reason}")]
    Setup { step: &'static str, reason: String },

    /// A draw primitive or the print command failed mid-job
    #[error("Render failed: {0}")]
    Render(String),

    /// Ending the transaction failed after the job body succeeded
    #[error("Teardown failed: {0}")]
    Teardown(String),

    /// Hardware did not confirm completion within the deadline; the physical
    /// outcome is indeterminate (paper may have partially printed)
    #[error("Print completion timed out after {0}ms")]
    CompletionTimeout(u64),

    /// Malformed caller input (bad base64, unparsable receipt JSON, zero copies)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl PrintError {
    /// Short stable reason code for bridge callers
    pub fn code(&self) -> &'static str {
        match self {
            PrintError::Bluetooth(_) => "BLUETOOTH_UNAVAILABLE",
            PrintError::Connection(_) => "CONNECTION_FAILED",
            PrintError::NotConnected => "NOT_CONNECTED",
            PrintError::Setup { .. } => "SETUP_FAILED",
            PrintError::Render(_) => "RENDER_FAILED",
            PrintError::Teardown(_) => "TEARDOWN_FAILED",
            PrintError::CompletionTimeout(_) => "COMPLETION_TIMEOUT",
            PrintError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

/// Result type for printer SDK operations
pub type PrintResult<T> = Result<T, PrintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(PrintError::NotConnected.code(), "NOT_CONNECTED");
        assert_eq!(
            PrintError::Setup {
                step: "configure_media",
                reason: "nope".to_string()
            }
            .code(),
            "SETUP_FAILED"
        );
        assert_eq!(PrintError::CompletionTimeout(30_000).code(), "COMPLETION_TIMEOUT");
    }

    #[test]
    fn test_display_includes_cause() {
        let err = PrintError::Render("draw_qr rejected".to_string());
        assert_eq!(err.to_string(), "Render failed: draw_qr rejected");
    }
}

//! Print job lifecycle types

use crate::media::MediaConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One end-to-end print request, from setup through teardown.
///
/// Created by the caller-facing service right before the session lock is
/// acquired, mutated only by the session coordinator, and dropped once the
/// terminal event has been published. Nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub id: Uuid,
    pub media: MediaConfig,
    pub copies: u32,
    pub status: PrintJobStatus,
}

impl PrintJob {
    pub fn new(media: MediaConfig, copies: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            media,
            copies,
            status: PrintJobStatus::Pending,
        }
    }
}

/// Print job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintJobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

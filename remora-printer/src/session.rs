//! Print session coordinator
//!
//! Owns the one live device and serializes every print job against it:
//!
//! 1. acquire the process-wide job lock (FIFO, blocking)
//! 2. publish `JobStarted`
//! 3. setup: initialize → configure media → clear buffer → begin transaction
//! 4. run the caller's rendering procedure, then `print` + wait for completion
//! 5. teardown: end transaction
//! 6. publish `JobCompleted`/`JobFailed` and release the lock
//!
//! The lock guard is scoped to the job body, so it is released exactly once
//! on every exit path; no job ever observes another job's partially
//! configured device state. A job cannot be cancelled once its procedure has
//! started (mid-transaction cancellation would leave the hardware buffer
//! undefined); the only ways out are completion, failure, or the completion
//! deadline.

use crate::device::{DeviceError, PrinterDevice};
use crate::error::{PrintError, PrintResult};
use crate::events::{EventBus, PrinterEvent};
use crate::job::{PrintJob, PrintJobStatus};
use crate::layout::DrawCommand;
use crate::media::MediaConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Default deadline for hardware completion confirmation
pub const DEFAULT_COMPLETION_TIMEOUT_MS: u64 = 30_000;

/// Serializes print jobs against a single shared device connection
pub struct SessionCoordinator {
    device: Arc<dyn PrinterDevice>,
    events: EventBus,
    job_lock: Mutex<()>,
    completion_timeout_ms: u64,
}

impl SessionCoordinator {
    pub fn new(device: Arc<dyn PrinterDevice>, events: EventBus) -> Self {
        Self {
            device,
            events,
            job_lock: Mutex::new(()),
            completion_timeout_ms: DEFAULT_COMPLETION_TIMEOUT_MS,
        }
    }

    pub fn with_completion_timeout(mut self, timeout_ms: u64) -> Self {
        self.completion_timeout_ms = timeout_ms;
        self
    }

    pub fn device(&self) -> &Arc<dyn PrinterDevice> {
        &self.device
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Execute a print job with the full lifecycle protocol.
    ///
    /// `proc` runs against a ready device (media configured, buffer clear,
    /// transaction open) and is where layout output gets replayed. Exactly
    /// one terminal event is published per job.
    #[instrument(skip(self, job, proc), fields(job_id = %job.id))]
    pub async fn execute_job<F, Fut, T>(&self, job: &mut PrintJob, proc: F) -> PrintResult<T>
    where
        F: FnOnce(JobContext) -> Fut,
        Fut: Future<Output = PrintResult<T>>,
    {
        let _guard = self.job_lock.lock().await;
        debug!("job acquired lock");

        job.status = PrintJobStatus::InProgress;
        self.events.publish(PrinterEvent::JobStarted {
            job_id: job.id.to_string(),
        });

        let ctx = JobContext {
            device: Arc::clone(&self.device),
            events: self.events.clone(),
            media: job.media.clone(),
            job_id: job.id,
            completion_timeout_ms: self.completion_timeout_ms,
        };

        match self.run_lifecycle(ctx, proc).await {
            Ok(value) => {
                job.status = PrintJobStatus::Completed;
                self.events.publish(PrinterEvent::JobCompleted {
                    job_id: job.id.to_string(),
                });
                info!("job completed");
                Ok(value)
            }
            Err(err) => {
                job.status = PrintJobStatus::Failed;
                self.events.publish(PrinterEvent::JobFailed {
                    job_id: job.id.to_string(),
                    error: format!("{}: {}", err.code(), err),
                });
                error!(error = %err, code = err.code(), "job failed");
                Err(err)
            }
        }
    }

    async fn run_lifecycle<F, Fut, T>(&self, ctx: JobContext, proc: F) -> PrintResult<T>
    where
        F: FnOnce(JobContext) -> Fut,
        Fut: Future<Output = PrintResult<T>>,
    {
        // A setup failure aborts before the transaction exists; nothing to
        // tear down.
        ctx.setup().await?;

        match proc(ctx.clone()).await {
            Ok(value) => {
                ctx.teardown().await?;
                Ok(value)
            }
            Err(err) => {
                // Best-effort transaction cleanup. Its own failure is logged
                // and discarded so it never masks the original error.
                if let Err(cleanup_err) = self.device.end_transaction().await {
                    warn!(error = %cleanup_err, "transaction cleanup after failed job also failed");
                }
                Err(err)
            }
        }
    }
}

/// Operations available to a job's rendering procedure.
///
/// Handed out only by [`SessionCoordinator::execute_job`], so every call runs
/// under the job lock against a fully set-up device.
#[derive(Clone)]
pub struct JobContext {
    device: Arc<dyn PrinterDevice>,
    events: EventBus,
    media: MediaConfig,
    job_id: Uuid,
    completion_timeout_ms: u64,
}

impl JobContext {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn media(&self) -> &MediaConfig {
        &self.media
    }

    /// Configured media width in dots
    pub fn media_width(&self) -> i32 {
        self.media.width_dots
    }

    /// Setup: initialize, configure media, clear buffer, begin transaction.
    /// Each step must succeed before the next runs.
    async fn setup(&self) -> PrintResult<()> {
        self.device
            .initialize()
            .await
            .map_err(|e| setup_err("initialize_printer", e))?;
        self.device
            .configure_media(&self.media)
            .await
            .map_err(|e| setup_err("configure_media", e))?;
        self.device
            .clear_buffer()
            .await
            .map_err(|e| setup_err("clear_buffer", e))?;
        self.device
            .begin_transaction()
            .await
            .map_err(|e| setup_err("begin_transaction", e))?;
        debug!(job_id = %self.job_id, "session setup complete");
        Ok(())
    }

    /// Teardown: end the transaction
    async fn teardown(&self) -> PrintResult<()> {
        self.device
            .end_transaction()
            .await
            .map_err(|e| PrintError::Teardown(e.to_string()))
    }

    /// Draw text at an absolute position
    pub async fn draw_text(
        &self,
        text: &str,
        x: i32,
        y: i32,
        font_dots: i32,
        bold: bool,
    ) -> PrintResult<()> {
        self.device
            .draw_text(text, x, y, font_dots, bold, 0)
            .await
            .map_err(render_err)
    }

    /// Draw a QR code
    pub async fn draw_qr(&self, data: &str, x: i32, y: i32, size: i32) -> PrintResult<()> {
        self.device.draw_qr(data, x, y, size).await.map_err(render_err)
    }

    /// Draw a bitmap
    pub async fn draw_bitmap(
        &self,
        image: &crate::bitmap::ImageHandle,
        x: i32,
        y: i32,
    ) -> PrintResult<()> {
        self.device.draw_bitmap(image, x, y).await.map_err(render_err)
    }

    /// Advance the paper
    pub async fn feed(&self, dots: i32) -> PrintResult<()> {
        self.device.feed(dots).await.map_err(render_err)
    }

    /// Replay a layout pass against the device, publishing progress as draws
    /// land. Aborts on the first failing draw.
    pub async fn run_commands(&self, commands: &[DrawCommand]) -> PrintResult<()> {
        let total = commands.len();
        for (index, command) in commands.iter().enumerate() {
            match command {
                DrawCommand::Text {
                    content,
                    x,
                    y,
                    font_dots,
                    bold,
                } => {
                    self.device
                        .draw_text(content, *x, *y, *font_dots, *bold, 0)
                        .await
                }
                DrawCommand::QrCode { data, x, y, size } => {
                    self.device.draw_qr(data, *x, *y, *size).await
                }
                DrawCommand::Barcode {
                    data,
                    x,
                    y,
                    symbology,
                    module_width,
                    height,
                } => {
                    self.device
                        .draw_barcode(data, *x, *y, *symbology, *module_width, *height)
                        .await
                }
                DrawCommand::Bitmap { image, x, y } => {
                    self.device.draw_bitmap(image, *x, *y).await
                }
            }
            .map_err(render_err)?;

            self.events.publish(PrinterEvent::JobProgress {
                job_id: self.job_id.to_string(),
                progress: ((index + 1) * 100 / total) as u8,
            });
        }
        Ok(())
    }

    /// Commit the buffered batch and block until the hardware confirms
    /// completion or the deadline passes.
    ///
    /// A timeout is a failure, not a "probably succeeded": the physical
    /// outcome is indeterminate and the caller must treat it that way.
    pub async fn print(&self, copies: u32) -> PrintResult<()> {
        self.device
            .print(copies)
            .await
            .map_err(|e| PrintError::Render(format!("print command: {e}")))?;

        let deadline = Duration::from_millis(self.completion_timeout_ms);
        let wait = self.device.wait_for_completion(self.completion_timeout_ms);
        match tokio::time::timeout(deadline, wait).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(DeviceError::Timeout(ms))) => Err(PrintError::CompletionTimeout(ms)),
            Ok(Err(e)) => Err(PrintError::Render(format!("wait for completion: {e}"))),
            Err(_) => Err(PrintError::CompletionTimeout(self.completion_timeout_ms)),
        }
    }
}

fn setup_err(step: &'static str, err: DeviceError) -> PrintError {
    PrintError::Setup {
        step,
        reason: err.to_string(),
    }
}

fn render_err(err: DeviceError) -> PrintError {
    PrintError::Render(err.to_string())
}

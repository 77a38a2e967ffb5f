//! End-to-end session tests against a scripted device
//!
//! Covers the coordinator's concurrency and failure guarantees: one total
//! order of device calls grouped by job, lock release on every failure path,
//! and the completion deadline.

use async_trait::async_trait;
use remora_printer::{
    BarcodeSymbology, DeviceError, DeviceResult, EventBus, ImageHandle, MediaConfig, PrintService,
    PrinterDevice, PrinterEvent, PrinterStatus, SessionCoordinator, TextOptions,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Scripted printer: records every call (draws tagged with their payload),
/// optionally fails one named step, optionally never confirms completion.
#[derive(Default)]
struct ScriptedPrinter {
    calls: Mutex<Vec<String>>,
    fail_step: Mutex<Option<String>>,
    withhold_completion: AtomicBool,
}

impl ScriptedPrinter {
    fn failing_at(step: &str) -> Self {
        let printer = Self::default();
        *printer.fail_step.lock().unwrap() = Some(step.to_string());
        printer
    }

    fn never_completing() -> Self {
        let printer = Self::default();
        printer.withhold_completion.store(true, Ordering::SeqCst);
        printer
    }

    fn record(&self, call: impl Into<String>) -> DeviceResult<()> {
        let call = call.into();
        self.calls.lock().unwrap().push(call.clone());
        let step = call.split(':').next().unwrap_or(&call).to_string();
        if self.fail_step.lock().unwrap().as_deref() == Some(step.as_str()) {
            return Err(DeviceError::Command(format!("injected failure at {step}")));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PrinterDevice for ScriptedPrinter {
    async fn connect(&self, _address: &str, _port: u16) -> DeviceResult<()> {
        self.record("connect")
    }
    async fn disconnect(&self) -> DeviceResult<()> {
        self.record("disconnect")
    }
    async fn status(&self) -> DeviceResult<PrinterStatus> {
        Ok(PrinterStatus {
            connected: true,
            has_paper: true,
            has_error: false,
            error_message: None,
        })
    }
    async fn initialize(&self) -> DeviceResult<()> {
        self.record("initialize")
    }
    async fn configure_media(&self, _media: &MediaConfig) -> DeviceResult<()> {
        self.record("configure_media")
    }
    async fn clear_buffer(&self) -> DeviceResult<()> {
        self.record("clear_buffer")
    }
    async fn begin_transaction(&self) -> DeviceResult<()> {
        self.record("begin_transaction")
    }
    async fn end_transaction(&self) -> DeviceResult<()> {
        self.record("end_transaction")
    }
    async fn draw_text(
        &self,
        text: &str,
        _x: i32,
        _y: i32,
        _font_dots: i32,
        _bold: bool,
        _alignment: u8,
    ) -> DeviceResult<()> {
        self.record(format!("draw_text:{text}"))
    }
    async fn draw_qr(&self, data: &str, _x: i32, _y: i32, _size: i32) -> DeviceResult<()> {
        self.record(format!("draw_qr:{data}"))
    }
    async fn draw_barcode(
        &self,
        data: &str,
        _x: i32,
        _y: i32,
        _symbology: BarcodeSymbology,
        _module_width: i32,
        _height: i32,
    ) -> DeviceResult<()> {
        self.record(format!("draw_barcode:{data}"))
    }
    async fn draw_bitmap(&self, _image: &ImageHandle, _x: i32, _y: i32) -> DeviceResult<()> {
        self.record("draw_bitmap")
    }
    async fn feed(&self, _dots: i32) -> DeviceResult<()> {
        self.record("feed")
    }
    async fn cut(&self) -> DeviceResult<()> {
        self.record("cut")
    }
    async fn print(&self, _copies: u32) -> DeviceResult<()> {
        self.record("print")
    }
    async fn wait_for_completion(&self, _timeout_ms: u64) -> DeviceResult<()> {
        self.record("wait_for_completion")?;
        if self.withhold_completion.load(Ordering::SeqCst) {
            // hardware never signals; the coordinator's deadline must fire
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

fn service_over(device: Arc<ScriptedPrinter>) -> (PrintService, Arc<SessionCoordinator>) {
    let coordinator = Arc::new(SessionCoordinator::new(device, EventBus::new()));
    (PrintService::new(coordinator.clone()), coordinator)
}

/// Expected device-call block for a single `print_text` job on continuous
/// media (layout output is one text draw, then a feed sized to content)
fn expected_text_job(text: &str) -> Vec<String> {
    vec![
        "initialize".to_string(),
        "configure_media".to_string(),
        "clear_buffer".to_string(),
        "begin_transaction".to_string(),
        format!("draw_text:{text}"),
        "feed".to_string(),
        "print".to_string(),
        "wait_for_completion".to_string(),
        "end_transaction".to_string(),
    ]
}

#[tokio::test]
async fn test_concurrent_jobs_never_interleave() {
    let device = Arc::new(ScriptedPrinter::default());
    let (service, _) = service_over(device.clone());
    let service = Arc::new(service);

    let first = tokio::spawn({
        let service = service.clone();
        async move { service.print_text("job-a", TextOptions::default()).await }
    });
    let second = tokio::spawn({
        let service = service.clone();
        async move { service.print_text("job-b", TextOptions::default()).await }
    });

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // one total order grouped by job: the log must be exactly two complete
    // job blocks, in whichever order the lock was granted
    let calls = device.calls();
    assert_eq!(calls.len(), 18);
    let (first_block, second_block) = calls.split_at(9);

    let ab = [expected_text_job("job-a"), expected_text_job("job-b")];
    let ba = [expected_text_job("job-b"), expected_text_job("job-a")];
    let observed = [first_block.to_vec(), second_block.to_vec()];
    assert!(
        observed == ab || observed == ba,
        "jobs interleaved: {calls:?}"
    );
}

#[tokio::test]
async fn test_second_job_setup_waits_for_first_teardown() {
    let device = Arc::new(ScriptedPrinter::default());
    let (service, _) = service_over(device.clone());
    let service = Arc::new(service);

    let jobs: Vec<_> = ["job-a", "job-b"]
        .into_iter()
        .map(|name| {
            let service = service.clone();
            tokio::spawn(async move { service.print_text(name, TextOptions::default()).await })
        })
        .collect();
    for job in jobs {
        job.await.unwrap().unwrap();
    }

    let calls = device.calls();
    let first_teardown = calls.iter().position(|c| c == "end_transaction").unwrap();
    let second_setup = calls.iter().skip(1).position(|c| c == "initialize").map(|i| i + 1).unwrap();
    assert!(
        second_setup > first_teardown,
        "second job's setup began before the first job's teardown: {calls:?}"
    );
}

#[tokio::test]
async fn test_lock_released_after_failure_at_every_step() {
    for step in [
        "initialize",
        "configure_media",
        "clear_buffer",
        "begin_transaction",
        "draw_text",
        "print",
        "wait_for_completion",
        "end_transaction",
    ] {
        let device = Arc::new(ScriptedPrinter::failing_at(step));
        let (service, _) = service_over(device.clone());

        let err = service
            .print_text("doomed", TextOptions::default())
            .await
            .expect_err("injected failure must fail the job");
        assert!(
            !err.code().is_empty(),
            "failure at {step} must carry a reason code"
        );

        // the next job must be able to acquire the lock and run to completion
        *device.fail_step.lock().unwrap() = None;
        device.calls.lock().unwrap().clear();
        service
            .print_text("recovery", TextOptions::default())
            .await
            .unwrap_or_else(|e| panic!("job after failure at {step} did not recover: {e}"));
        assert_eq!(device.calls(), expected_text_job("recovery"));
    }
}

#[tokio::test]
async fn test_setup_failure_publishes_one_job_failed_and_skips_draws() {
    let device = Arc::new(ScriptedPrinter::failing_at("configure_media"));
    let events = EventBus::new();
    let coordinator = Arc::new(SessionCoordinator::new(device.clone(), events.clone()));
    let service = PrintService::new(coordinator);
    let mut rx = events.subscribe();

    let err = service
        .print_text("never-drawn", TextOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SETUP_FAILED");

    // no draw or print call ever reached the device
    let calls = device.calls();
    assert!(
        calls.iter().all(|c| !c.starts_with("draw") && c != "print"),
        "draws reached the device after setup failed: {calls:?}"
    );

    // exactly one JobFailed event, and no JobCompleted
    let mut failed = 0;
    let mut completed = 0;
    while let Ok(event) = rx.try_recv() {
        match event {
            PrinterEvent::JobFailed { .. } => failed += 1,
            PrinterEvent::JobCompleted { .. } => completed += 1,
            _ => {}
        }
    }
    assert_eq!(failed, 1);
    assert_eq!(completed, 0);

    // lock is free afterwards
    *device.fail_step.lock().unwrap() = None;
    service
        .print_text("after", TextOptions::default())
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_completion_timeout_fails_after_deadline() {
    let device = Arc::new(ScriptedPrinter::never_completing());
    let (service, _) = service_over(device.clone());

    let started = tokio::time::Instant::now();
    let err = service
        .print_text("stuck", TextOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "COMPLETION_TIMEOUT");
    // the default 30s deadline elapsed (in virtual time), not forever
    let elapsed = started.elapsed().as_millis() as u64;
    assert!(
        (30_000..31_000).contains(&elapsed),
        "expected ~30s deadline, waited {elapsed}ms"
    );

    // the device is usable again for the next job
    device.withhold_completion.store(false, Ordering::SeqCst);
    service
        .print_text("after-timeout", TextOptions::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_label_media_does_not_feed() {
    let device = Arc::new(ScriptedPrinter::default());
    let (service, _) = service_over(device.clone());

    let opts = TextOptions {
        media: MediaConfig::label_80x50mm(),
        ..TextOptions::default()
    };
    service.print_text("label", opts).await.unwrap();

    assert!(
        !device.calls().contains(&"feed".to_string()),
        "label media must not feed by content height"
    );
}

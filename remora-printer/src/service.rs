//! High-level print service
//!
//! Composes the pure layout engine with the session coordinator: every
//! operation builds receipt lines, lays them out against the media width,
//! then executes one job that replays the draw commands and prints. The
//! convenience operations are all one-line-list special cases of the same
//! path.

use crate::bitmap::{ImageHandle, PdfRenderer};
use crate::error::{PrintError, PrintResult};
use crate::job::PrintJob;
use crate::layout::{LayoutEngine, LayoutResult};
use crate::media::MediaConfig;
use crate::receipt::{Alignment, BarcodeSymbology, FontSize, Receipt, ReceiptLine};
use crate::session::SessionCoordinator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Options for [`PrintService::print_text`] and [`PrintService::print_texts`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextOptions {
    pub font_size: FontSize,
    pub bold: bool,
    pub alignment: Alignment,
    pub media: MediaConfig,
    pub copies: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_size: FontSize::Medium,
            bold: false,
            alignment: Alignment::Left,
            media: MediaConfig::default(),
            copies: 1,
        }
    }
}

/// Options for [`PrintService::print_qr`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QrOptions {
    pub size: i32,
    pub alignment: Alignment,
    pub media: MediaConfig,
    pub copies: u32,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 5,
            alignment: Alignment::Center,
            media: MediaConfig::default(),
            copies: 1,
        }
    }
}

/// Options for [`PrintService::print_barcode`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BarcodeOptions {
    pub symbology: BarcodeSymbology,
    pub module_width: i32,
    pub height: i32,
    pub alignment: Alignment,
    pub media: MediaConfig,
    pub copies: u32,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            symbology: BarcodeSymbology::Code128,
            module_width: 2,
            height: 80,
            alignment: Alignment::Center,
            media: MediaConfig::default(),
            copies: 1,
        }
    }
}

/// Options for [`PrintService::print_key_value`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValueOptions {
    pub font_size: FontSize,
    pub bold: bool,
    pub media: MediaConfig,
    pub copies: u32,
}

impl Default for KeyValueOptions {
    fn default() -> Self {
        Self {
            font_size: FontSize::Medium,
            bold: false,
            media: MediaConfig::default(),
            copies: 1,
        }
    }
}

/// Options for image and PDF printing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageOptions {
    pub alignment: Alignment,
    pub media: MediaConfig,
    pub copies: u32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            alignment: Alignment::Center,
            media: MediaConfig::default(),
            copies: 1,
        }
    }
}

/// High-level printing operations
pub struct PrintService {
    layout: LayoutEngine,
    coordinator: Arc<SessionCoordinator>,
}

impl PrintService {
    pub fn new(coordinator: Arc<SessionCoordinator>) -> Self {
        Self {
            layout: LayoutEngine::new(),
            coordinator,
        }
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// Print a complete receipt (header + body + footer)
    #[instrument(skip(self, receipt), fields(
        header = receipt.header.len(),
        body = receipt.body.len(),
        footer = receipt.footer.len(),
    ))]
    pub async fn print_receipt(
        &self,
        receipt: &Receipt,
        media: MediaConfig,
        copies: u32,
    ) -> PrintResult<Uuid> {
        let plan = self.layout.layout_receipt(receipt, media.width_dots);
        self.run_job(media, copies, plan).await
    }

    /// Print a flat list of receipt lines
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn print_lines(
        &self,
        lines: &[ReceiptLine],
        media: MediaConfig,
        copies: u32,
    ) -> PrintResult<Uuid> {
        let plan = self.layout.layout_lines(lines, media.width_dots);
        self.run_job(media, copies, plan).await
    }

    /// Print a single text line
    pub async fn print_text(&self, text: &str, opts: TextOptions) -> PrintResult<Uuid> {
        let line = ReceiptLine::Text {
            content: text.to_string(),
            font_size: opts.font_size,
            bold: opts.bold,
            alignment: opts.alignment,
        };
        self.print_lines(&[line], opts.media, opts.copies).await
    }

    /// Print several text lines with shared styling
    pub async fn print_texts(&self, texts: &[String], opts: TextOptions) -> PrintResult<Uuid> {
        let lines: Vec<ReceiptLine> = texts
            .iter()
            .map(|text| ReceiptLine::Text {
                content: text.clone(),
                font_size: opts.font_size,
                bold: opts.bold,
                alignment: opts.alignment,
            })
            .collect();
        self.print_lines(&lines, opts.media, opts.copies).await
    }

    /// Print a single QR code
    pub async fn print_qr(&self, data: &str, opts: QrOptions) -> PrintResult<Uuid> {
        let line = ReceiptLine::QrCode {
            data: data.to_string(),
            size: opts.size,
            alignment: opts.alignment,
        };
        self.print_lines(&[line], opts.media, opts.copies).await
    }

    /// Print a single barcode
    pub async fn print_barcode(&self, data: &str, opts: BarcodeOptions) -> PrintResult<Uuid> {
        let line = ReceiptLine::Barcode {
            data: data.to_string(),
            symbology: opts.symbology,
            module_width: opts.module_width,
            height: opts.height,
            alignment: opts.alignment,
        };
        self.print_lines(&[line], opts.media, opts.copies).await
    }

    /// Print a key-value row (key left, value right-justified)
    pub async fn print_key_value(
        &self,
        key: &str,
        value: &str,
        opts: KeyValueOptions,
    ) -> PrintResult<Uuid> {
        let line = ReceiptLine::KeyValue {
            key: key.to_string(),
            value: value.to_string(),
            font_size: opts.font_size,
            bold: opts.bold,
        };
        self.print_lines(&[line], opts.media, opts.copies).await
    }

    /// Print a decoded bitmap
    pub async fn print_image(&self, image: ImageHandle, opts: ImageOptions) -> PrintResult<Uuid> {
        let line = ReceiptLine::Image {
            image,
            alignment: opts.alignment,
        };
        self.print_lines(&[line], opts.media, opts.copies).await
    }

    /// Decode a base64 image and print it
    pub async fn print_image_base64(
        &self,
        base64_data: &str,
        opts: ImageOptions,
    ) -> PrintResult<Uuid> {
        let image = ImageHandle::from_base64(base64_data)?;
        self.print_image(image, opts).await
    }

    /// Render one page of a base64 PDF via the collaborator and print it
    pub async fn print_pdf_base64(
        &self,
        renderer: &dyn PdfRenderer,
        base64_data: &str,
        page: u32,
        opts: ImageOptions,
    ) -> PrintResult<Uuid> {
        let target_width =
            opts.media.width_dots - 2 * self.layout.config().left_margin;
        let image = renderer.render_page(base64_data, page, target_width).await?;
        self.print_image(image, opts).await
    }

    /// Page count of a base64 PDF
    pub fn pdf_page_count(
        &self,
        renderer: &dyn PdfRenderer,
        base64_data: &str,
    ) -> PrintResult<u32> {
        renderer.page_count(base64_data)
    }

    /// Run one job: replay the plan, feed continuous media to the rendered
    /// height, print, all under the session lock.
    async fn run_job(
        &self,
        media: MediaConfig,
        copies: u32,
        plan: LayoutResult,
    ) -> PrintResult<Uuid> {
        if copies == 0 {
            return Err(PrintError::InvalidRequest("copies must be >= 1".to_string()));
        }

        let mut job = PrintJob::new(media, copies);
        let job_id = job.id;
        let feed = job.media.feed_height(plan.height);
        let commands = plan.commands;
        debug!(job_id = %job_id, commands = commands.len(), "starting print job");

        self.coordinator
            .execute_job(&mut job, move |ctx| async move {
                ctx.run_commands(&commands).await?;
                if let Some(dots) = feed {
                    ctx.feed(dots).await?;
                }
                ctx.print(copies).await
            })
            .await?;

        Ok(job_id)
    }
}

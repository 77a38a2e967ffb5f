//! Receipt layout engine
//!
//! Pure translation of receipt lines into absolutely positioned draw
//! commands. No I/O, no device access: the same lines and media width always
//! produce the same command sequence and final cursor position, so layout is
//! testable without hardware and can run before the session lock is taken.
//!
//! Text widths are estimated as `chars * font_dots / 2`, a monospace
//! approximation standing in for real glyph metrics, which are unavailable at
//! layout time. The formula is load-bearing: changing it silently shifts
//! every existing receipt, so keep it unless actual font metrics arrive.

use crate::bitmap::ImageHandle;
use crate::receipt::{Alignment, BarcodeSymbology, Column, Receipt, ReceiptLine};

/// Layout constants, all in dots (203 DPI)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    pub top_margin: i32,
    pub left_margin: i32,
    pub right_margin: i32,
    pub line_height: i32,
    pub line_spacing: i32,
    pub section_spacing: i32,
    pub element_spacing: i32,
    pub separator_font_dots: i32,
    /// Dots per QR size unit
    pub qr_dots_per_unit: i32,
    /// Estimated dots per barcode data character
    pub barcode_dots_per_char: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            top_margin: 50,
            left_margin: 30,
            right_margin: 30,
            line_height: 30,
            line_spacing: 8,
            section_spacing: 16,
            element_spacing: 16,
            separator_font_dots: 20,
            qr_dots_per_unit: 20,
            barcode_dots_per_char: 10,
        }
    }
}

/// One positioned draw operation, ready to replay against a device
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        content: String,
        x: i32,
        y: i32,
        font_dots: i32,
        bold: bool,
    },
    QrCode {
        data: String,
        x: i32,
        y: i32,
        size: i32,
    },
    Barcode {
        data: String,
        x: i32,
        y: i32,
        symbology: BarcodeSymbology,
        module_width: i32,
        height: i32,
    },
    Bitmap {
        image: ImageHandle,
        x: i32,
        y: i32,
    },
}

/// Output of a layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub commands: Vec<DrawCommand>,
    /// Final cursor position; doubles as the feed length on continuous media
    pub height: i32,
}

/// The layout engine
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out a full receipt: header, body, footer, with one section gap
    /// between each pair of adjacent non-empty sections
    pub fn layout_receipt(&self, receipt: &Receipt, media_width: i32) -> LayoutResult {
        let mut commands = Vec::new();
        let mut y = self.config.top_margin;
        let mut rendered_any = false;

        for section in [&receipt.header, &receipt.body, &receipt.footer] {
            if section.is_empty() {
                continue;
            }
            if rendered_any {
                y += self.config.section_spacing;
            }
            for line in section {
                y = self.render_line(line, y, media_width, &mut commands);
            }
            rendered_any = true;
        }

        LayoutResult { commands, height: y }
    }

    /// Lay out a flat list of lines starting at the top margin
    pub fn layout_lines(&self, lines: &[ReceiptLine], media_width: i32) -> LayoutResult {
        let mut commands = Vec::new();
        let mut y = self.config.top_margin;

        for line in lines {
            y = self.render_line(line, y, media_width, &mut commands);
        }

        LayoutResult { commands, height: y }
    }

    /// Render one line at cursor `y`, returning the advanced cursor
    fn render_line(
        &self,
        line: &ReceiptLine,
        y: i32,
        media_width: i32,
        out: &mut Vec<DrawCommand>,
    ) -> i32 {
        match line {
            ReceiptLine::Text {
                content,
                font_size,
                bold,
                alignment,
            } => {
                let dots = font_size.dots();
                out.push(DrawCommand::Text {
                    content: content.clone(),
                    x: self.aligned_x(*alignment, text_width(content, dots), media_width),
                    y,
                    font_dots: dots,
                    bold: *bold,
                });
                y + dots + self.config.line_spacing
            }

            ReceiptLine::KeyValue {
                key,
                value,
                font_size,
                bold,
            } => {
                let dots = font_size.dots();
                out.push(DrawCommand::Text {
                    content: key.clone(),
                    x: self.config.left_margin,
                    y,
                    font_dots: dots,
                    bold: *bold,
                });
                out.push(DrawCommand::Text {
                    content: value.clone(),
                    x: self.aligned_x(Alignment::Right, text_width(value, dots), media_width),
                    y,
                    font_dots: dots,
                    bold: *bold,
                });
                y + dots + self.config.line_spacing
            }

            ReceiptLine::QrCode {
                data,
                size,
                alignment,
            } => {
                let side = size * self.config.qr_dots_per_unit;
                out.push(DrawCommand::QrCode {
                    data: data.clone(),
                    x: self.aligned_x(*alignment, side, media_width),
                    y,
                    size: *size,
                });
                y + side + self.config.element_spacing
            }

            ReceiptLine::Barcode {
                data,
                symbology,
                module_width,
                height,
                alignment,
            } => {
                let width_est =
                    data.chars().count() as i32 * self.config.barcode_dots_per_char;
                out.push(DrawCommand::Barcode {
                    data: data.clone(),
                    x: self.aligned_x(*alignment, width_est, media_width),
                    y,
                    symbology: *symbology,
                    module_width: *module_width,
                    height: *height,
                });
                y + height + self.config.element_spacing
            }

            ReceiptLine::Separator { ch, length } => {
                out.push(DrawCommand::Text {
                    content: ch.repeat((*length).max(0) as usize),
                    x: self.config.left_margin,
                    y,
                    font_dots: self.config.separator_font_dots,
                    bold: false,
                });
                y + self.config.line_height
            }

            ReceiptLine::Space { lines } => y + lines * self.config.line_height,

            ReceiptLine::Image { image, alignment } => {
                let width = image.width();
                let height = image.height();
                out.push(DrawCommand::Bitmap {
                    image: image.clone(),
                    x: self.aligned_x(*alignment, width, media_width),
                    y,
                });
                y + height + self.config.element_spacing
            }

            ReceiptLine::Columns {
                columns,
                font_size,
                bold,
            } => self.render_columns(columns, font_size.dots(), *bold, y, media_width, out),
        }
    }

    /// Partition the printable width left-to-right by each cell's ratio.
    /// Ratios are taken as given; over- or under-commitment is the caller's
    /// responsibility.
    fn render_columns(
        &self,
        columns: &[Column],
        font_dots: i32,
        bold: bool,
        y: i32,
        media_width: i32,
        out: &mut Vec<DrawCommand>,
    ) -> i32 {
        let printable = media_width - self.config.left_margin - self.config.right_margin;
        let mut cell_x = self.config.left_margin;

        for cell in columns {
            let cell_width = (printable as f32 * cell.width_ratio) as i32;
            let width_est = text_width(&cell.text, font_dots);
            let x = match cell.alignment {
                Alignment::Left => cell_x,
                Alignment::Center => cell_x + (cell_width - width_est) / 2,
                Alignment::Right => cell_x + cell_width - width_est,
            };
            out.push(DrawCommand::Text {
                content: cell.text.clone(),
                x: x.max(self.config.left_margin),
                y,
                font_dots,
                bold,
            });
            cell_x += cell_width;
        }

        y + self.config.line_height
    }

    /// Resolve an x position for an element of estimated `width`, clamped so
    /// it never starts left of the margin
    fn aligned_x(&self, alignment: Alignment, width: i32, media_width: i32) -> i32 {
        let x = match alignment {
            Alignment::Left => self.config.left_margin,
            Alignment::Center => media_width / 2 - width / 2,
            Alignment::Right => media_width - self.config.right_margin - width,
        };
        x.max(self.config.left_margin)
    }
}

/// Estimated pixel width of `content` at the given font size
fn text_width(content: &str, font_dots: i32) -> i32 {
    content.chars().count() as i32 * font_dots / 2
}

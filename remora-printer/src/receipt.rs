//! Receipt domain types
//!
//! A [`Receipt`] is a layout structure (header/body/footer of receipt lines),
//! not a business document. Clients convert their invoices/tickets/orders to a
//! `Receipt` before printing.
//!
//! The line types form a tagged union mirroring the JSON shapes accepted at
//! the bridge boundary; absent fields take the documented defaults.

use crate::bitmap::ImageHandle;
use crate::error::{PrintError, PrintResult};
use serde::{Deserialize, Serialize};

/// Font size options, in device dots (203 DPI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    Xlarge,
}

impl FontSize {
    /// Glyph height in dots
    pub fn dots(&self) -> i32 {
        match self {
            FontSize::Small => 20,
            FontSize::Medium => 30,
            FontSize::Large => 40,
            FontSize::Xlarge => 50,
        }
    }
}

/// Horizontal alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Numeric code expected by vendor SDKs (0=left, 1=center, 2=right)
    pub fn code(&self) -> u8 {
        match self {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        }
    }
}

/// Supported barcode symbologies
///
/// Digit-length rules (e.g. EAN13 wants 13 digits) are not validated here;
/// hardware rejection of bad data surfaces as an ordinary job failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BarcodeSymbology {
    #[default]
    Code128,
    Code39,
    Code93,
    Codabar,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
}

/// One cell of a [`ReceiptLine::Columns`] row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub text: String,
    /// Fraction of the printable width this cell occupies, in (0, 1].
    /// Ratios are taken as given; the engine does not normalize them.
    #[serde(default = "default_width_ratio")]
    pub width_ratio: f32,
    #[serde(default)]
    pub alignment: Alignment,
}

/// Receipt line types (tagged union)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReceiptLine {
    /// Simple text line
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        #[serde(default)]
        font_size: FontSize,
        #[serde(default)]
        bold: bool,
        #[serde(default)]
        alignment: Alignment,
    },

    /// Key on the left, value right-justified on the same row
    #[serde(rename_all = "camelCase")]
    KeyValue {
        key: String,
        value: String,
        #[serde(default)]
        font_size: FontSize,
        #[serde(default)]
        bold: bool,
    },

    /// QR code; `size` is the module scale (1-10)
    #[serde(rename = "qr", rename_all = "camelCase")]
    QrCode {
        data: String,
        #[serde(default = "default_qr_size")]
        size: i32,
        #[serde(default = "default_center")]
        alignment: Alignment,
    },

    /// One-dimensional barcode
    #[serde(rename_all = "camelCase")]
    Barcode {
        data: String,
        #[serde(default)]
        symbology: BarcodeSymbology,
        #[serde(default = "default_module_width")]
        module_width: i32,
        #[serde(default = "default_barcode_height")]
        height: i32,
        #[serde(default = "default_center")]
        alignment: Alignment,
    },

    /// Horizontal separator line
    #[serde(rename_all = "camelCase")]
    Separator {
        #[serde(rename = "char", default = "default_separator_char")]
        ch: String,
        #[serde(default = "default_separator_length")]
        length: i32,
    },

    /// Blank vertical space
    Space {
        #[serde(default = "default_space_lines")]
        lines: i32,
    },

    /// Bitmap image (accepted as base64 at the bridge boundary)
    #[serde(rename_all = "camelCase")]
    Image {
        #[serde(rename = "base64")]
        image: ImageHandle,
        #[serde(default = "default_center")]
        alignment: Alignment,
    },

    /// Multiple columns in one row
    #[serde(rename_all = "camelCase")]
    Columns {
        columns: Vec<Column>,
        #[serde(default)]
        font_size: FontSize,
        #[serde(default)]
        bold: bool,
    },
}

fn default_width_ratio() -> f32 {
    1.0
}

fn default_qr_size() -> i32 {
    5
}

fn default_module_width() -> i32 {
    2
}

fn default_barcode_height() -> i32 {
    80
}

fn default_separator_char() -> String {
    "-".to_string()
}

fn default_separator_length() -> i32 {
    48
}

fn default_space_lines() -> i32 {
    1
}

fn default_center() -> Alignment {
    Alignment::Center
}

/// A receipt with header/body/footer sections, rendered in that order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub header: Vec<ReceiptLine>,
    #[serde(default)]
    pub body: Vec<ReceiptLine>,
    #[serde(default)]
    pub footer: Vec<ReceiptLine>,
}

impl Receipt {
    /// Fluent builder for receipt construction
    pub fn builder() -> ReceiptBuilder {
        ReceiptBuilder::default()
    }

    /// Parse a receipt description from its JSON bridge shape
    pub fn from_json(json: &str) -> PrintResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PrintError::InvalidRequest(format!("receipt description: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty() && self.footer.is_empty()
    }
}

/// Builder for fluent receipt construction
#[derive(Debug, Default)]
pub struct ReceiptBuilder {
    header: Vec<ReceiptLine>,
    body: Vec<ReceiptLine>,
    footer: Vec<ReceiptLine>,
}

impl ReceiptBuilder {
    pub fn header(mut self, line: ReceiptLine) -> Self {
        self.header.push(line);
        self
    }

    pub fn body(mut self, line: ReceiptLine) -> Self {
        self.body.push(line);
        self
    }

    pub fn footer(mut self, line: ReceiptLine) -> Self {
        self.footer.push(line);
        self
    }

    pub fn build(self) -> Receipt {
        Receipt {
            header: self.header,
            body: self.body,
            footer: self.footer,
        }
    }
}

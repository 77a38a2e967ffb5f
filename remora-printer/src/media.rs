//! Print media configuration
//!
//! All dimensions are in device dots at the 203 DPI standard for thermal
//! printers (1mm = 8 dots):
//!
//! - 58mm  = 464 dots
//! - 72mm  = 576 dots
//! - 80mm  = 640 dots (default)
//! - 104mm = 832 dots

use serde::{Deserialize, Serialize};

/// Dots per millimeter at 203 DPI
pub const DOTS_PER_MM: i32 = 8;

/// How the device locates page boundaries on the loaded stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaType {
    /// Continuous roll paper; length follows rendered content
    #[default]
    Continuous,
    /// Die-cut labels separated by a sensing gap
    LabelGap,
    /// Labels indexed by a black mark on the liner
    LabelBlackMark,
}

impl MediaType {
    /// Numeric value expected by vendor SDK media-type parameters
    pub fn sdk_value(&self) -> i32 {
        match self {
            MediaType::Continuous => 0,
            MediaType::LabelGap => 1,
            MediaType::LabelBlackMark => 2,
        }
    }
}

/// Configuration for print media (paper/label)
///
/// `height_dots` and `gap_dots` are meaningful only for label media;
/// continuous media keeps them at 0 and the feed length is derived from the
/// rendered content height instead (see [`MediaConfig::feed_height`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaConfig {
    pub width_dots: i32,
    #[serde(default)]
    pub height_dots: i32,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub gap_dots: i32,
}

impl Default for MediaConfig {
    /// 80mm continuous paper, the most common thermal printer configuration
    fn default() -> Self {
        Self::continuous_80mm()
    }
}

impl MediaConfig {
    /// Continuous paper 58mm (compact printers)
    pub fn continuous_58mm() -> Self {
        Self {
            width_dots: 464,
            height_dots: 0,
            media_type: MediaType::Continuous,
            gap_dots: 0,
        }
    }

    /// Continuous paper 80mm
    pub fn continuous_80mm() -> Self {
        Self {
            width_dots: 640,
            height_dots: 0,
            media_type: MediaType::Continuous,
            gap_dots: 0,
        }
    }

    /// Continuous paper 104mm (wide format)
    pub fn continuous_104mm() -> Self {
        Self {
            width_dots: 832,
            height_dots: 0,
            media_type: MediaType::Continuous,
            gap_dots: 0,
        }
    }

    /// Label 80mm x 50mm
    pub fn label_80x50mm() -> Self {
        Self {
            width_dots: 640,
            height_dots: 400,
            media_type: MediaType::LabelGap,
            gap_dots: 24,
        }
    }

    /// Label 100mm x 60mm
    pub fn label_100x60mm() -> Self {
        Self {
            width_dots: 800,
            height_dots: 480,
            media_type: MediaType::LabelGap,
            gap_dots: 24,
        }
    }

    /// Resolve a named preset as accepted at the bridge boundary
    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "continuous58mm" => Some(Self::continuous_58mm()),
            "continuous80mm" => Some(Self::continuous_80mm()),
            "continuous104mm" => Some(Self::continuous_104mm()),
            "label80x50mm" => Some(Self::label_80x50mm()),
            "label100x60mm" => Some(Self::label_100x60mm()),
            _ => None,
        }
    }

    /// Feed length for a job that rendered `content_height` dots of output.
    ///
    /// Continuous media feeds exactly the rendered height (the layout cursor
    /// already includes the top margin and trailing spacing); label media is
    /// sized by the hardware from `height_dots`/`gap_dots` and never feeds.
    pub fn feed_height(&self, content_height: i32) -> Option<i32> {
        match self.media_type {
            MediaType::Continuous => Some(content_height),
            MediaType::LabelGap | MediaType::LabelBlackMark => None,
        }
    }
}

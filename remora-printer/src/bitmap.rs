//! Bitmap handles and the image/PDF decoding boundary
//!
//! The layout engine only needs pixel dimensions; adapters get the decoded
//! RGBA buffer to convert into whatever their vendor SDK expects.

use crate::error::{PrintError, PrintResult};
use async_trait::async_trait;
use base64::Engine;
use image::RgbaImage;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::Cursor;

/// A decoded bitmap ready to be drawn on the media surface.
///
/// Dimensions are interpreted directly as device dots.
#[derive(Clone)]
pub struct ImageHandle {
    pixels: RgbaImage,
}

impl ImageHandle {
    /// Wrap a raw RGBA8 buffer; `None` if the buffer does not match the
    /// given dimensions
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(|pixels| Self { pixels })
    }

    /// Decode encoded image bytes (PNG, JPEG, WebP)
    pub fn from_bytes(bytes: &[u8]) -> PrintResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PrintError::InvalidRequest(format!("image decode: {e}")))?;
        Ok(Self {
            pixels: img.to_rgba8(),
        })
    }

    /// Decode a base64 string; data URIs ("data:image/png;base64,...") are
    /// accepted as well as bare payloads
    pub fn from_base64(data: &str) -> PrintResult<Self> {
        let payload = match data.find("base64,") {
            Some(idx) => &data[idx + 7..],
            None => data,
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| PrintError::InvalidRequest(format!("base64 decode: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// Width in dots
    pub fn width(&self) -> i32 {
        self.pixels.width() as i32
    }

    /// Height in dots
    pub fn height(&self) -> i32 {
        self.pixels.height() as i32
    }

    /// Decoded RGBA8 pixel data
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    fn to_base64_png(&self) -> Result<String, image::ImageError> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(self.pixels.clone())
            .write_to(&mut buf, image::ImageFormat::Png)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(buf.into_inner()))
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.pixels.dimensions() == other.pixels.dimensions()
            && self.pixels.as_raw() == other.pixels.as_raw()
    }
}

impl Serialize for ImageHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self
            .to_base64_png()
            .map_err(|e| S::Error::custom(format!("png encode: {e}")))?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for ImageHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        ImageHandle::from_base64(&encoded).map_err(D::Error::custom)
    }
}

/// PDF rasterization collaborator.
///
/// Rendering PDF pages is platform work (native PDF libraries); the SDK only
/// consumes the resulting bitmaps, so the capability stays behind a trait.
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Render one page of a base64-encoded PDF, scaled to the target width
    async fn render_page(
        &self,
        base64_data: &str,
        page: u32,
        target_width_dots: i32,
    ) -> PrintResult<ImageHandle>;

    /// Number of pages in a base64-encoded PDF
    fn page_count(&self, base64_data: &str) -> PrintResult<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> ImageHandle {
        let data: Vec<u8> = (0..width * height)
            .flat_map(|i| {
                if i % 2 == 0 {
                    [0, 0, 0, 255]
                } else {
                    [255, 255, 255, 255]
                }
            })
            .collect();
        ImageHandle::from_rgba(data, width, height).unwrap()
    }

    #[test]
    fn test_from_rgba_validates_buffer_size() {
        assert!(ImageHandle::from_rgba(vec![0; 16], 2, 2).is_some());
        assert!(ImageHandle::from_rgba(vec![0; 15], 2, 2).is_none());
    }

    #[test]
    fn test_base64_round_trip() {
        let original = checker(4, 2);
        let encoded = original.to_base64_png().unwrap();
        let decoded = ImageHandle::from_base64(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_data_uri_prefix_is_stripped() {
        let encoded = checker(2, 2).to_base64_png().unwrap();
        let uri = format!("data:image/png;base64,{encoded}");
        let decoded = ImageHandle::from_base64(&uri).unwrap();
        assert_eq!(decoded.width(), 2);
        assert_eq!(decoded.height(), 2);
    }

    #[test]
    fn test_bad_base64_is_invalid_request() {
        let err = ImageHandle::from_base64("!!not-base64!!").unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }

    #[test]
    fn test_serde_as_base64_string() {
        let handle = checker(2, 2);
        let json = serde_json::to_string(&handle).unwrap();
        let back: ImageHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(handle, back);
    }
}

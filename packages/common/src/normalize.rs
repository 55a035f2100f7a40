//! Coerces uploaded images into the shape the edit endpoint accepts:
//! a square 1024x1024 RGBA PNG.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

/// Edge length of every normalized image, in pixels.
pub const TARGET_EDGE: u32 = 1024;

/// Default upper bound on raw upload size (20 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    PayloadTooLarge { actual: usize, limit: usize },

    #[error("unprocessable image: {0}")]
    Unprocessable(String),
}

/// A PNG with an alpha channel at exactly `TARGET_EDGE` x `TARGET_EDGE`.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Format detected on the way in.
    pub source_format: ImageFormat,
    /// Whether the pixels were resampled, as opposed to only re-encoded.
    pub resized: bool,
}

#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    max_input_bytes: usize,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_BYTES)
    }
}

impl ImageNormalizer {
    pub fn new(max_input_bytes: usize) -> Self {
        Self { max_input_bytes }
    }

    /// Normalize `raw` into a 1024x1024 RGBA PNG.
    ///
    /// The format is sniffed from the content; `declared_type` (a MIME type)
    /// is only consulted when sniffing fails. Non-square or non-PNG input is
    /// scaled to cover the target box and center-cropped. The output always
    /// carries an alpha channel, even when no resampling was needed.
    pub fn normalize(&self, raw: &[u8], declared_type: &str) -> Result<NormalizedImage, ImageError> {
        if raw.len() > self.max_input_bytes {
            return Err(ImageError::PayloadTooLarge {
                actual: raw.len(),
                limit: self.max_input_bytes,
            });
        }
        if raw.is_empty() {
            return Err(ImageError::Unprocessable("image is empty".into()));
        }

        let declared = ImageFormat::from_mime_type(declared_type);
        let mut reader = ImageReader::new(Cursor::new(raw))
            .with_guessed_format()
            .map_err(|e| ImageError::Unprocessable(e.to_string()))?;
        if reader.format().is_none()
            && let Some(format) = declared
        {
            reader.set_format(format);
        }
        let source_format = reader
            .format()
            .ok_or_else(|| ImageError::Unprocessable("unrecognized image format".into()))?;
        if let Some(format) = declared
            && format != source_format
        {
            debug!(
                declared = ?format,
                detected = ?source_format,
                "Declared image type does not match content"
            );
        }

        let decoded = reader
            .decode()
            .map_err(|e| ImageError::Unprocessable(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());

        let already_shaped =
            source_format == ImageFormat::Png && width == TARGET_EDGE && height == TARGET_EDGE;
        let shaped = if already_shaped {
            decoded
        } else {
            decoded.resize_to_fill(TARGET_EDGE, TARGET_EDGE, FilterType::Lanczos3)
        };

        let rgba = DynamicImage::ImageRgba8(shaped.into_rgba8());
        let mut out = Cursor::new(Vec::new());
        rgba.write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ImageError::Unprocessable(e.to_string()))?;
        let bytes = out.into_inner();

        debug!(
            input_bytes = raw.len(),
            output_bytes = bytes.len(),
            width,
            height,
            resized = !already_shaped,
            "Normalized source image"
        );

        Ok(NormalizedImage {
            bytes,
            width: TARGET_EDGE,
            height: TARGET_EDGE,
            source_format,
            resized: !already_shaped,
        })
    }
}

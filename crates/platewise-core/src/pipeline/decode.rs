//! Image decoding with content sniffing and timeout support.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::EstimateError;

/// Image decoder with a configurable timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// A decoded image, converted to 8-bit RGB.
pub struct DecodedImage {
    /// RGB8 pixel data
    pub image: DynamicImage,
    /// Format detected from the encoded bytes
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Size of the encoded input in bytes
    pub byte_len: u64,
}

impl DecodedImage {
    /// Wrap an in-memory image (already decoded elsewhere) as RGB8.
    pub fn from_image(image: DynamicImage) -> Self {
        let image = DynamicImage::ImageRgb8(image.to_rgb8());
        let (width, height) = image.dimensions();
        Self {
            image,
            format: ImageFormat::Png,
            width,
            height,
            byte_len: 0,
        }
    }
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory buffer on the blocking pool, bounded by the
    /// decode timeout. `origin` only labels errors.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        origin: &Path,
    ) -> Result<DecodedImage, EstimateError> {
        let origin_owned = origin.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, &origin_owned))
                .await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(EstimateError::Decode {
                path: origin.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(EstimateError::Timeout {
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Read and decode a file.
    pub async fn decode_file(&self, path: &Path) -> Result<DecodedImage, EstimateError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| EstimateError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file: {}", e),
        })?;
        self.decode_from_bytes(bytes, path).await
    }

    /// Synchronous decode (runs in spawn_blocking).
    fn decode_bytes_sync(bytes: Vec<u8>, origin: &Path) -> Result<DecodedImage, EstimateError> {
        use std::io::Cursor;

        let byte_len = bytes.len() as u64;
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| EstimateError::Decode {
                path: origin.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(origin).map_err(|_| {
                EstimateError::UnsupportedFormat {
                    path: origin.to_path_buf(),
                    format: origin
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                }
            })?,
        };
        let image = reader.decode().map_err(|e| EstimateError::Decode {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;

        let image = DynamicImage::ImageRgb8(image.to_rgb8());
        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
            byte_len,
        })
    }
}

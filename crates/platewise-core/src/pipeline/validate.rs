//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::EstimateError;

const BASE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Validates uploads and files before they are decoded.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Whether a declared content type is accepted. Case-insensitive.
    pub fn is_allowed_content_type(&self, content_type: Option<&str>) -> bool {
        let Some(ct) = content_type else {
            return false;
        };
        let ct = ct.trim().to_lowercase();
        BASE_CONTENT_TYPES.contains(&ct.as_str()) || (self.limits.allow_webp && ct == "image/webp")
    }

    /// Human-readable list of accepted formats, for error messages.
    pub fn allowed_formats(&self) -> String {
        let mut formats = "jpeg, jpg, png".to_string();
        if self.limits.allow_webp {
            formats.push_str(", webp");
        }
        formats
    }

    /// Reject payloads larger than the upload limit.
    pub fn check_size(&self, num_bytes: usize) -> Result<(), EstimateError> {
        let size_mb = num_bytes as f64 / (1024.0 * 1024.0);
        if size_mb > self.limits.max_upload_mb {
            return Err(EstimateError::FileTooLarge {
                size_mb,
                max_mb: self.limits.max_upload_mb,
            });
        }
        Ok(())
    }

    /// Quick checks on a file before reading it fully.
    ///
    /// - File exists
    /// - File size is within limits
    /// - File has valid image magic bytes
    pub fn validate_file(&self, path: &Path) -> Result<(), EstimateError> {
        if !path.exists() {
            return Err(EstimateError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| EstimateError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;
        self.check_size(metadata.len() as usize)?;

        let mut file = std::fs::File::open(path).map_err(|e| EstimateError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;
        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);

        if !Self::is_valid_image_header(&header[..bytes_read]) {
            return Err(EstimateError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }

    /// Check whether leading bytes match a format the decoder accepts.
    pub fn is_valid_image_header(header: &[u8]) -> bool {
        if header.len() < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return true;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") {
            if header.len() >= 12 {
                return &header[8..12] == b"WEBP";
            }
            return true;
        }

        false
    }
}

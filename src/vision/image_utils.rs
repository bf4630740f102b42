// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sketch image parsing for inbound data URIs

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

/// Maximum decoded sketch size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Custom error types for sketch image parsing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// A validated sketch, kept as base64 so adapters can re-encode it cheaply
#[derive(Debug, Clone, PartialEq)]
pub struct SketchImage {
    format: ImageFormat,
    base64: String,
    width: u32,
    height: u32,
    size_bytes: usize,
}

impl SketchImage {
    /// Parse a `data:image/...;base64,` URI or bare base64 payload.
    ///
    /// The payload is decoded and the format is taken from the magic bytes,
    /// not from the declared MIME type.
    pub fn parse(input: &str) -> Result<Self, ImageError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ImageError::EmptyData);
        }

        let payload = if input.starts_with("data:") {
            let (header, payload) = input
                .split_once(',')
                .ok_or_else(|| ImageError::MalformedDataUri("missing ',' separator".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(ImageError::MalformedDataUri(
                    "only base64 data URIs are accepted".to_string(),
                ));
            }
            payload
        } else {
            input
        };

        if payload.is_empty() {
            return Err(ImageError::EmptyData);
        }

        let bytes = STANDARD.decode(payload)?;
        Self::from_decoded(&bytes, payload.to_string())
    }

    /// Only the image header is read; pixel data is never decoded here.
    fn from_decoded(bytes: &[u8], base64: String) -> Result<Self, ImageError> {
        if bytes.len() > MAX_IMAGE_SIZE {
            return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
        }
        if bytes.is_empty() {
            return Err(ImageError::EmptyData);
        }

        let format = detect_format(bytes)?;
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
            .into_dimensions()
            .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

        Ok(Self {
            format,
            base64,
            width,
            height,
            size_bytes: bytes.len(),
        })
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn mime_type(&self) -> &'static str {
        format_to_mime(self.format)
    }

    /// Base64 payload without any data-URI prefix
    pub fn base64_payload(&self) -> &str {
        &self.base64
    }

    /// Full `data:` URI using the detected MIME type
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.base64)
    }
}

/// Detect image format from magic bytes. Only formats a browser canvas can export.
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

pub fn format_to_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        _ => "application/octet-stream",
    }
}

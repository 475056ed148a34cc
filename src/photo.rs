use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageReader, Limits};
use thiserror::Error;

pub const MAX_SOURCE_BYTES: usize = 20 * 1024 * 1024;
pub const MAX_SOURCE_DIMENSION: u32 = 8192;
pub const MAX_UPLOAD_DIMENSION: u32 = 2048;
pub const JPEG_QUALITY: u8 = 80;

const MAX_DECODE_ALLOC_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("empty image data")]
    EmptyInput,

    #[error("image too large: {size} bytes exceeds maximum of {max}")]
    InputTooLarge { size: usize, max: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("decode failed: {source}")]
    Decode {
        #[from]
        source: image::ImageError,
    },

    #[error("encode failed: {reason}")]
    Encode { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedFormat {
    Jpeg,
    Png,
    WebP,
}

impl SniffedFormat {
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() >= 3 && data[0] == 0xFF && data[1] == 0xD8 && data[2] == 0xFF {
            return Some(SniffedFormat::Jpeg);
        }
        if data.len() >= 8 && data[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Some(SniffedFormat::Png);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(SniffedFormat::WebP);
        }
        None
    }
}

/// A picker image re-encoded for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPhoto {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Normalizes a picked image for submission: decodes within allocation
/// limits, downscales anything larger than [`MAX_UPLOAD_DIMENSION`] on its
/// longest side, and re-encodes as JPEG. Output is always `image/jpeg`
/// regardless of the source format.
pub fn prepare_upload_image(raw: &[u8]) -> Result<ProcessedPhoto, PhotoError> {
    if raw.is_empty() {
        return Err(PhotoError::EmptyInput);
    }

    if raw.len() > MAX_SOURCE_BYTES {
        return Err(PhotoError::InputTooLarge {
            size: raw.len(),
            max: MAX_SOURCE_BYTES,
        });
    }

    if SniffedFormat::from_magic_bytes(raw).is_none() {
        return Err(PhotoError::UnsupportedFormat);
    }

    let image = decode_within_limits(raw)?;

    let (width, height) = image.dimensions();
    let image = if width > MAX_UPLOAD_DIMENSION || height > MAX_UPLOAD_DIMENSION {
        image.resize(
            MAX_UPLOAD_DIMENSION,
            MAX_UPLOAD_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        )
    } else {
        image
    };

    encode_jpeg(&image, JPEG_QUALITY)
}

fn decode_within_limits(raw: &[u8]) -> Result<DynamicImage, PhotoError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_SOURCE_DIMENSION);
    limits.max_image_height = Some(MAX_SOURCE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC_BYTES);

    let mut reader = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| PhotoError::Decode { source: e.into() })?;

    if reader.format().is_none() {
        return Err(PhotoError::UnsupportedFormat);
    }

    reader.limits(limits);
    Ok(reader.decode()?)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<ProcessedPhoto, PhotoError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    if width == 0 || height == 0 {
        return Err(PhotoError::Encode {
            reason: "zero dimension".into(),
        });
    }

    let mut buffer = Vec::with_capacity((width * height) as usize / 4);
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| PhotoError::Encode {
            reason: e.to_string(),
        })?;

    Ok(ProcessedPhoto {
        data: buffer,
        width,
        height,
    })
}

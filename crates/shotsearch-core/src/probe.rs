//! Image header probing for size and format.

use crate::config::IndexConfig;
use crate::{Result, ShotSearchError};
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// Dimensions and declared format of an image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProbe {
    pub width: u32,
    pub height: u32,
    /// Lowercased format name, e.g. `png`, `jpeg`, `webp`.
    pub format: Option<String>,
}

impl ImageProbe {
    /// `"<width>x<height>"`.
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// The format name, or `"unknown"` when none was detected.
    pub fn format_name(&self) -> &str {
        self.format.as_deref().unwrap_or(IndexConfig::UNKNOWN_FORMAT)
    }
}

fn format_name(format: ImageFormat) -> String {
    format!("{:?}", format).to_lowercase()
}

/// Read width, height and format from the file header without decoding pixels.
///
/// The format is detected from content, falling back to the extension.
pub fn probe_image(path: &Path) -> Result<ImageProbe> {
    let reader = ImageReader::open(path)
        .map_err(|e| ShotSearchError::io_with_path(e, path))?
        .with_guessed_format()
        .map_err(|e| ShotSearchError::io_with_path(e, path))?;

    let format = reader.format().map(format_name);
    let (width, height) = reader.into_dimensions()?;

    Ok(ImageProbe {
        width,
        height,
        format,
    })
}

/// MIME type for serving an image, derived from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

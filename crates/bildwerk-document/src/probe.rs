// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image metadata probe: format, pixel size and resolution of a source file.

use std::io::Cursor;
use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ImageDescriptor, SourceFormat};
use image::{ImageError, ImageFormat, ImageReader};
use tracing::{debug, info, instrument};

use crate::resolution;

/// A probed source file: its metadata plus the bytes read from disk, so the
/// file is only read once per conversion.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub descriptor: ImageDescriptor,
    pub bytes: Vec<u8>,
}

/// Map an `image` format onto the set of accepted source formats.
pub fn source_format(format: ImageFormat) -> Option<SourceFormat> {
    match format {
        ImageFormat::Png => Some(SourceFormat::Png),
        ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
        ImageFormat::Gif => Some(SourceFormat::Gif),
        ImageFormat::WebP => Some(SourceFormat::Webp),
        ImageFormat::Avif => Some(SourceFormat::Avif),
        _ => None,
    }
}

/// The `image` format used to decode a source format.
pub fn image_format(format: SourceFormat) -> ImageFormat {
    match format {
        SourceFormat::Png => ImageFormat::Png,
        SourceFormat::Jpeg => ImageFormat::Jpeg,
        SourceFormat::Gif => ImageFormat::Gif,
        SourceFormat::Webp => ImageFormat::WebP,
        SourceFormat::Avif => ImageFormat::Avif,
    }
}

/// Read and probe an image file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn probe_file(path: impl AsRef<Path>, default_dpi: f32) -> Result<SourceImage> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| BildwerkError::UnreadableFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let descriptor = probe_bytes(path, &bytes, default_dpi)?;

    info!(
        mime = %descriptor.mime_type,
        width = descriptor.width,
        height = descriptor.height,
        h_dpi = descriptor.horizontal_dpi,
        v_dpi = descriptor.vertical_dpi,
        "Image probed"
    );

    Ok(SourceImage { descriptor, bytes })
}

/// Probe already-loaded image bytes. `path` is only used in error messages.
///
/// Files without resolution metadata get `default_dpi` on both axes.
pub fn probe_bytes(path: &Path, bytes: &[u8], default_dpi: f32) -> Result<ImageDescriptor> {
    let unreadable = |reason: String| BildwerkError::UnreadableFile {
        path: path.to_path_buf(),
        reason,
    };

    let detected = image::guess_format(bytes).map_err(|err| unreadable(err.to_string()))?;
    let format = source_format(detected)
        .ok_or_else(|| BildwerkError::UnsupportedFormat(detected.to_mime_type().to_owned()))?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), detected)
        .into_dimensions()
        .map_err(|err| match err {
            ImageError::Unsupported(_) => {
                BildwerkError::DecodeUnsupported(format.mime_type().to_owned())
            }
            other => unreadable(other.to_string()),
        })?;

    if width == 0 || height == 0 {
        return Err(BildwerkError::CorruptImage(format!(
            "{} has zero size ({width}x{height})",
            path.display()
        )));
    }

    let dpi = match resolution::read_resolution(format, bytes) {
        Some(res) => (res.horizontal, res.vertical),
        None => {
            debug!(default_dpi, "No resolution metadata, using default");
            (default_dpi, default_dpi)
        }
    };

    Ok(ImageDescriptor::new(width, height, format, dpi))
}

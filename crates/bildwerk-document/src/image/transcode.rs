// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transcoder: decode formats the PDF writer cannot embed directly (WEBP,
// AVIF) and re-encode them as PNG in memory, using the `image` crate.

use std::borrow::Cow;

use bildwerk_core::SourceFormat;
use bildwerk_core::error::{BildwerkError, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder};
use tracing::{debug, info, instrument};

use crate::probe::image_format;

/// A decoded bitmap owned by a single transcode call.
///
/// The pixel buffer is released when the value is dropped, which happens on
/// every exit path of the call that created it.
pub struct DecodedBitmap {
    /// The decoded pixels.
    image: DynamicImage,
}

impl DecodedBitmap {
    // -- Construction ---------------------------------------------------------

    /// Decode `data` as `format`.
    ///
    /// Fails with `DecodeUnsupported` before touching the data when this build
    /// of `image` has no decoder for the format, and with `CorruptImage` when
    /// decoding fails or produces an empty bitmap.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8], format: SourceFormat) -> Result<Self> {
        if !decoder_available(format) {
            return Err(BildwerkError::DecodeUnsupported(
                format.mime_type().to_owned(),
            ));
        }

        let img = image::load_from_memory_with_format(data, image_format(format)).map_err(|err| {
            BildwerkError::CorruptImage(format!(
                "failed to decode {}: {}",
                format.mime_type(),
                err
            ))
        })?;

        if img.width() == 0 || img.height() == 0 {
            return Err(BildwerkError::CorruptImage(format!(
                "{} decoded to an empty bitmap",
                format.mime_type()
            )));
        }

        debug!(
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the bitmap as a non-interlaced PNG.
    ///
    /// The `image` PNG encoder never writes Adam7 interlacing, so the result
    /// always takes the writer's plain PNG path.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive);

        // PNG stores 8 or 16 bits per channel; float buffers are narrowed first.
        let image: Cow<'_, DynamicImage> = match &self.image {
            DynamicImage::ImageRgb32F(_) => {
                Cow::Owned(DynamicImage::ImageRgb16(self.image.to_rgb16()))
            }
            DynamicImage::ImageRgba32F(_) => {
                Cow::Owned(DynamicImage::ImageRgba16(self.image.to_rgba16()))
            }
            other => Cow::Borrowed(other),
        };

        encoder
            .write_image(
                image.as_bytes(),
                image.width(),
                image.height(),
                image.color().into(),
            )
            .map_err(|err| BildwerkError::CorruptImage(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Whether this build has a decoder for `format`.
///
/// AVIF decoding hangs on the `avif-decode` feature (dav1d). The `image`
/// crate's own `reading_enabled` reports its AVIF encoder feature instead.
fn decoder_available(format: SourceFormat) -> bool {
    match format {
        SourceFormat::Avif => cfg!(feature = "avif-decode"),
        other => image_format(other).reading_enabled(),
    }
}

/// Decode `data` as `format` and re-encode it as PNG bytes.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn transcode_to_png(data: &[u8], format: SourceFormat) -> Result<Vec<u8>> {
    let bitmap = DecodedBitmap::decode(data, format)?;
    let png = bitmap.to_png_bytes()?;
    info!(
        from = format.mime_type(),
        width = bitmap.width(),
        height = bitmap.height(),
        png_len = png.len(),
        "Transcoded to PNG"
    );
    Ok(png)
}

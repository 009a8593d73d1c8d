// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-format preparation of source bytes for embedding.
//
// The PDF writer embeds PNG, JPEG and GIF data. Every accepted source format
// maps to a `PrepareFn` that turns the file bytes into one of those: the
// embeddable formats pass through untouched, WEBP and AVIF are transcoded.

use std::borrow::Cow;
use std::collections::BTreeMap;

use bildwerk_core::SourceFormat;
use bildwerk_core::error::{BildwerkError, Result};
use image::ImageFormat;
use tracing::debug;

use super::transcode::transcode_to_png;
use crate::probe::image_format;

/// Image bytes in a format the PDF writer can embed.
#[derive(Debug, Clone)]
pub struct EmbedSource<'a> {
    pub format: ImageFormat,
    pub bytes: Cow<'a, [u8]>,
}

impl EmbedSource<'_> {
    /// Whether the bytes were produced by a transcoder rather than read as-is.
    pub fn is_transcoded(&self) -> bool {
        matches!(self.bytes, Cow::Owned(_))
    }
}

/// Turns source bytes of the given format into an `EmbedSource`.
pub type PrepareFn = for<'a> fn(&'a [u8], SourceFormat) -> Result<EmbedSource<'a>>;

/// Hand the original bytes to the writer.
pub fn passthrough(bytes: &[u8], format: SourceFormat) -> Result<EmbedSource<'_>> {
    Ok(EmbedSource {
        format: image_format(format),
        bytes: Cow::Borrowed(bytes),
    })
}

/// Decode and re-encode as PNG, then take the PNG path.
pub fn reencode_as_png(bytes: &[u8], format: SourceFormat) -> Result<EmbedSource<'_>> {
    Ok(EmbedSource {
        format: ImageFormat::Png,
        bytes: Cow::Owned(transcode_to_png(bytes, format)?),
    })
}

/// Map from source format to its preparation step.
#[derive(Debug, Clone)]
pub struct EmbedPreparers {
    by_format: BTreeMap<SourceFormat, PrepareFn>,
}

impl Default for EmbedPreparers {
    fn default() -> Self {
        let mut preparers = Self::empty();
        for format in SourceFormat::ALL {
            let prepare: PrepareFn = if format.needs_transcode() {
                reencode_as_png
            } else {
                passthrough
            };
            preparers.register(format, prepare);
        }
        preparers
    }
}

impl EmbedPreparers {
    /// A map with no entries; every format is unsupported until registered.
    pub fn empty() -> Self {
        Self {
            by_format: BTreeMap::new(),
        }
    }

    /// Set the preparation step for `format`, replacing any previous one.
    pub fn register(&mut self, format: SourceFormat, prepare: PrepareFn) {
        self.by_format.insert(format, prepare);
    }

    /// Run the preparation step registered for `format`.
    pub fn prepare<'a>(&self, bytes: &'a [u8], format: SourceFormat) -> Result<EmbedSource<'a>> {
        let prepare = self
            .by_format
            .get(&format)
            .ok_or_else(|| BildwerkError::UnsupportedFormat(format.mime_type().to_owned()))?;
        let source = prepare(bytes, format)?;
        debug!(
            from = format.mime_type(),
            embed = ?source.format,
            transcoded = source.is_transcoded(),
            "Prepared image for embedding"
        );
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn embeddable_formats_pass_through_borrowed() {
        let preparers = EmbedPreparers::default();
        let bytes = b"\x89PNG\r\n\x1a\nwhatever";

        let source = preparers.prepare(bytes, SourceFormat::Png).unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert!(!source.is_transcoded());
        assert_eq!(source.bytes.as_ref(), bytes);
    }

    #[test]
    fn webp_is_reencoded_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let webp = std::fs::read(fixtures::write_webp(dir.path(), "a.webp", 6, 4)).unwrap();

        let source = EmbedPreparers::default()
            .prepare(&webp, SourceFormat::Webp)
            .unwrap();
        assert_eq!(source.format, ImageFormat::Png);
        assert!(source.is_transcoded());
        assert_eq!(image::guess_format(&source.bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn default_map_covers_every_source_format() {
        let preparers = EmbedPreparers::default();
        let formats: Vec<_> = preparers.by_format.keys().copied().collect();
        assert_eq!(formats, SourceFormat::ALL.to_vec());
    }

    #[test]
    fn unregistered_format_is_unsupported() {
        let err = EmbedPreparers::empty()
            .prepare(b"", SourceFormat::Gif)
            .unwrap_err();
        assert!(matches!(err, BildwerkError::UnsupportedFormat(m) if m == "image/gif"));
    }

    #[test]
    fn register_replaces_entry() {
        fn reject(_: &[u8], format: SourceFormat) -> Result<EmbedSource<'_>> {
            Err(BildwerkError::DecodeUnsupported(format.mime_type().into()))
        }

        let mut preparers = EmbedPreparers::default();
        preparers.register(SourceFormat::Png, reject);
        assert!(matches!(
            preparers.prepare(b"", SourceFormat::Png),
            Err(BildwerkError::DecodeUnsupported(_))
        ));
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Bildwerk conversion service.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Target MIME type of every conversion.
pub const PDF_MIME: &str = "application/pdf";

/// Source MIME types a conversion service is registered for. `image/jpg` is
/// not a registered IANA type but hosts hand it out, so it gets its own entry.
pub const REGISTERED_SOURCE_MIMES: [&str; 6] = [
    "image/png",
    "image/jpg",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/avif",
];

/// Conversion parameters as handed over by the host (a JSON object).
pub type ConversionParams = serde_json::Map<String, serde_json::Value>;

/// Raster formats accepted as conversion input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Avif,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Png,
        SourceFormat::Jpeg,
        SourceFormat::Gif,
        SourceFormat::Webp,
        SourceFormat::Avif,
    ];

    /// Canonical MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
        }
    }

    /// Parse a MIME type, accepting the `image/jpg` alias.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            "image/avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            "avif" => Some(Self::Avif),
            _ => None,
        }
    }

    /// Whether the PDF writer cannot take this format as-is and it has to be
    /// re-encoded as PNG first.
    pub fn needs_transcode(&self) -> bool {
        matches!(self, Self::Webp | Self::Avif)
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Metadata of a source image, probed once per conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
    pub mime_type: String,
    pub horizontal_dpi: f32,
    pub vertical_dpi: f32,
}

impl ImageDescriptor {
    pub fn new(width: u32, height: u32, format: SourceFormat, dpi: (f32, f32)) -> Self {
        Self {
            width,
            height,
            format,
            mime_type: format.mime_type().to_owned(),
            horizontal_dpi: dpi.0,
            vertical_dpi: dpi.1,
        }
    }

    /// Landscape only when strictly wider than tall.
    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Natural size in points at the probed resolution (width, height).
    pub fn size_pt(&self) -> (f32, f32) {
        (
            self.width as f32 * 72.0 / self.horizontal_dpi,
            self.height as f32 * 72.0 / self.vertical_dpi,
        )
    }

    /// Resolution/size label, e.g. `72x72dpi 100x200px`.
    pub fn subject(&self) -> String {
        format!(
            "{}x{}dpi {}x{}px",
            self.horizontal_dpi, self.vertical_dpi, self.width, self.height
        )
    }
}

/// One conversion call, after parameter parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    /// Margin on every side in points, never negative.
    pub margin_pt: f32,
    pub mime_from: String,
    pub mime_to: String,
}

impl ConversionRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        target: Option<&Path>,
        margin_pt: f32,
        mime_from: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.map(Path::to_path_buf),
            margin_pt: margin_pt.max(0.0),
            mime_from: mime_from.into(),
            mime_to: PDF_MIME.to_owned(),
        }
    }
}

/// Result of a conversion: either a written file or the PDF bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutput {
    Written(PathBuf),
    Bytes(Vec<u8>),
}

impl ConversionOutput {
    /// The PDF bytes, if they were returned rather than written.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Written(_) => None,
        }
    }
}

/// Type of an additional conversion parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Number,
}

/// Describes one parameter a service accepts on top of source and target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamKind,
    pub description: String,
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bildwerk-document: image to PDF conversion for the Bildwerk service.
//
// Provides the image metadata probe (format, size, resolution), the WEBP/AVIF
// to PNG transcoder, the single-page PDF writer, and the conversion service
// facade that hosts register.

pub mod convert;
pub mod image;
pub mod pdf;
pub mod probe;
pub mod registry;
pub mod resolution;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export the primary structs so callers can use `bildwerk_document::PdfWriter` etc.
pub use convert::{ConversionLogger, ConversionService, ImageToPdfService, TracingLogger};
pub use crate::image::prepare::{EmbedPreparers, EmbedSource};
pub use crate::image::transcode::DecodedBitmap;
pub use pdf::writer::{AssembledPdf, DocumentInfo, PageLayout, PdfWriter};
pub use probe::SourceImage;
pub use registry::{ConversionRegistry, HostContext, conversion_services};

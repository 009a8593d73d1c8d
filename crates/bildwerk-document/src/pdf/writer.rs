// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: build a single-page PDF around one image using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. The page is sized to the image at its own resolution,
// so placing the image over the printable area keeps its aspect ratio.

use std::path::Path;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{ConversionOutput, ConvertConfig, ImageDescriptor, Orientation};
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, RawImage,
    RawImageData, RawImageFormat, TextItem, XObjectTransform,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::image::prepare::EmbedSource;

/// Title stored in the document information dictionary.
pub const DOCUMENT_TITLE: &str = "Converted by Bildwerk conversion service convert_image";
/// Creator stored in the document information dictionary.
pub const DOCUMENT_CREATOR: &str = "Bildwerk";

const DEBUG_FONT_SIZE_PT: f32 = 12.0;
/// Baseline of the debug label, measured from the top-left corner.
const DEBUG_LABEL_OFFSET_PT: (f32, f32) = (10.0, 20.0);

/// Page geometry in points. Image coordinates are measured from the top-left
/// corner of the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageLayout {
    pub orientation: Orientation,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_pt: f32,
    pub image_x_pt: f32,
    pub image_y_pt: f32,
    pub image_width_pt: f32,
    pub image_height_pt: f32,
}

impl PageLayout {
    /// Page sized to the image at its resolution plus `margin_pt` on every
    /// side, with the image filling everything inside the margins.
    pub fn for_image(descriptor: &ImageDescriptor, margin_pt: f32) -> Self {
        let margin = margin_pt.max(0.0);
        let (width_pt, height_pt) = descriptor.size_pt();
        let page_width_pt = width_pt + 2.0 * margin;
        let page_height_pt = height_pt + 2.0 * margin;

        Self {
            orientation: descriptor.orientation(),
            page_width_pt,
            page_height_pt,
            margin_pt: margin,
            image_x_pt: margin,
            image_y_pt: margin,
            image_width_pt: page_width_pt - 2.0 * margin,
            image_height_pt: page_height_pt - 2.0 * margin,
        }
    }
}

/// Values written to the PDF /Info dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub title: String,
    pub creator: String,
    pub subject: String,
}

/// A finished document together with the layout it was built from.
#[derive(Debug, Clone)]
pub struct AssembledPdf {
    pub layout: PageLayout,
    pub info: DocumentInfo,
    pub bytes: Vec<u8>,
}

/// Creates single-page PDF documents from images.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
    /// Creator metadata embedded in the PDF /Info dictionary.
    creator: String,
    /// Draw the resolution/size label near the top-left corner.
    debug_overlay: bool,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self {
            title: DOCUMENT_TITLE.to_owned(),
            creator: DOCUMENT_CREATOR.to_owned(),
            debug_overlay: false,
        }
    }
}

impl PdfWriter {
    /// Create a writer honouring the extension configuration.
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            debug_overlay: config.debug_overlay,
            ..Self::default()
        }
    }

    // -- Image to PDF ---------------------------------------------------------

    /// Create a single-page PDF containing the given image.
    ///
    /// The page is `descriptor`'s natural size in points plus `margin_pt` on
    /// every side; the image is stretched over the area inside the margins.
    #[instrument(skip(self, descriptor, embed), fields(
        mime = %descriptor.mime_type,
        embed = ?embed.format,
        bytes_len = embed.bytes.len(),
    ))]
    pub fn create_from_image(
        &self,
        descriptor: &ImageDescriptor,
        embed: &EmbedSource<'_>,
        margin_pt: f32,
    ) -> Result<AssembledPdf> {
        let layout = PageLayout::for_image(descriptor, margin_pt);
        let info = DocumentInfo {
            title: self.title.clone(),
            creator: self.creator.clone(),
            subject: descriptor.subject(),
        };

        info!(
            orientation = ?layout.orientation,
            page_w_pt = layout.page_width_pt,
            page_h_pt = layout.page_height_pt,
            margin_pt = layout.margin_pt,
            "Creating image PDF"
        );

        let raw = raw_image(embed)?;
        let (px_width, px_height) = (raw.width as f32, raw.height as f32);

        let mut doc = PdfDocument::new(&info.title);
        doc.metadata.info.creator = info.creator.clone();
        doc.metadata.info.subject = info.subject.clone();
        let xobject_id = doc.add_image(&raw);

        // At 72 dpi one pixel is one point, so the scale factors map the pixel
        // grid straight onto the image box. PDF space starts bottom-left.
        let scale_x = layout.image_width_pt / px_width;
        let scale_y = layout.image_height_pt / px_height;
        let translate_y = layout.page_height_pt - layout.image_y_pt - layout.image_height_pt;

        let mut ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(layout.image_x_pt)),
                translate_y: Some(Pt(translate_y)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(72.0),
                rotate: None,
            },
        }];

        if self.debug_overlay {
            ops.extend(debug_label(&info.subject, layout.page_height_pt));
        }

        let page = PdfPage::new(
            Mm::from(Pt(layout.page_width_pt)),
            Mm::from(Pt(layout.page_height_pt)),
            ops,
        );
        doc.with_pages(vec![page]);

        debug!(scale_x, scale_y, translate_y, "Image placed on page");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "printpdf reported warnings");
        }
        if bytes.is_empty() {
            return Err(BildwerkError::Serialization(
                "PDF writer produced no output".into(),
            ));
        }

        Ok(AssembledPdf {
            layout,
            info,
            bytes,
        })
    }
}

/// Decode embeddable bytes into the pixel buffer printpdf stores.
fn raw_image(embed: &EmbedSource<'_>) -> Result<RawImage> {
    let decoded = image::load_from_memory_with_format(&embed.bytes, embed.format).map_err(|err| {
        BildwerkError::CorruptImage(format!("failed to decode image for PDF: {}", err))
    })?;

    let width = decoded.width() as usize;
    let height = decoded.height() as usize;
    if width == 0 || height == 0 {
        return Err(BildwerkError::CorruptImage("image has no pixels".into()));
    }

    let (pixels, data_format) = if decoded.color().has_alpha() {
        (decoded.to_rgba8().into_raw(), RawImageFormat::RGBA8)
    } else {
        (decoded.to_rgb8().into_raw(), RawImageFormat::RGB8)
    };

    Ok(RawImage {
        pixels: RawImageData::U8(pixels),
        width,
        height,
        data_format,
        tag: Vec::new(),
    })
}

/// Text ops drawing `label` in Helvetica near the top-left corner.
fn debug_label(label: &str, page_height_pt: f32) -> Vec<Op> {
    let (x, from_top) = DEBUG_LABEL_OFFSET_PT;
    vec![
        Op::StartTextSection,
        Op::SetTextCursor {
            pos: Point {
                x: Pt(x),
                y: Pt(page_height_pt - from_top),
            },
        },
        Op::SetFontSizeBuiltinFont {
            size: Pt(DEBUG_FONT_SIZE_PT),
            font: BuiltinFont::Helvetica,
        },
        Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(label.to_owned())],
            font: BuiltinFont::Helvetica,
        },
        Op::EndTextSection,
    ]
}

// -- Output ----------------------------------------------------------------

/// Write `bytes` to `target`, or hand them back when there is no target.
pub fn write_output(bytes: Vec<u8>, target: Option<&Path>) -> Result<ConversionOutput> {
    match target {
        Some(path) => {
            std::fs::write(path, &bytes).map_err(|err| {
                BildwerkError::Serialization(format!(
                    "cannot write {}: {}",
                    path.display(),
                    err
                ))
            })?;
            info!(bytes = bytes.len(), "Wrote image PDF to {}", path.display());
            Ok(ConversionOutput::Written(path.to_path_buf()))
        }
        None => Ok(ConversionOutput::Bytes(bytes)),
    }
}

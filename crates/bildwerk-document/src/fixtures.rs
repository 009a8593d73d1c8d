// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: small images written into temporary directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

/// Deterministic gradient so decoded pixels are not all the same.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    DynamicImage::ImageRgb8(gradient(width, height))
        .save_with_format(&path, format)
        .expect("write fixture");
    path
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_image(dir, name, width, height, ImageFormat::Png)
}

pub fn write_webp(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_image(dir, name, width, height, ImageFormat::WebP)
}

pub fn write_transparent_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 128]))
        .save_with_format(&path, ImageFormat::Png)
        .expect("write fixture");
    path
}

/// JPEG carrying a JFIF density in dots per inch.
pub fn write_jpeg_with_dpi(dir: &Path, name: &str, width: u32, height: u32, dpi: (u16, u16)) -> PathBuf {
    let path = dir.join(name);
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, 90);
    encoder.set_pixel_density(PixelDensity {
        density: dpi,
        unit: PixelDensityUnit::Inches,
    });
    gradient(width, height)
        .write_with_encoder(encoder)
        .expect("encode jpeg fixture");
    std::fs::write(&path, buffer).expect("write fixture");
    path
}

pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// Header of a Windows bitmap; enough for format sniffing.
pub fn bmp_header() -> Vec<u8> {
    let mut bytes = b"BM".to_vec();
    bytes.resize(64, 0);
    bytes
}

/// Lossy AVIF of the gradient; carries no resolution metadata.
pub fn write_avif(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    write_image(dir, name, width, height, ImageFormat::Avif)
}

/// RGB PNG of the gradient with an optional `pHYs` chunk.
pub fn png_bytes(width: u32, height: u32, pixel_dims: Option<png::PixelDimensions>) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut encoder = png::Encoder::new(&mut buffer, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(pixel_dims);
    let mut writer = encoder.write_header().expect("png header");
    writer
        .write_image_data(gradient(width, height).as_raw())
        .expect("png data");
    writer.finish().expect("finish png");
    buffer
}

/// PNG whose `pHYs` chunk records `dpi` on both axes.
pub fn write_png_with_dpi(dir: &Path, name: &str, width: u32, height: u32, dpi: u32) -> PathBuf {
    let per_metre = (dpi as f32 / 0.0254).round() as u32;
    let bytes = png_bytes(
        width,
        height,
        Some(png::PixelDimensions {
            xppu: per_metre,
            yppu: per_metre,
            unit: png::Unit::Meter,
        }),
    );
    write_bytes(dir, name, &bytes)
}

/// Page `MediaBox` (width, height) of every page in a serialized PDF.
pub fn media_boxes(pdf: &[u8]) -> Vec<(f32, f32)> {
    let doc = lopdf::Document::load_mem(pdf).expect("parse generated pdf");
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).expect("page dictionary");
            // MediaBox may be inherited from the page tree node.
            let media_box = page
                .get(b"MediaBox")
                .or_else(|_| {
                    let parent = page.get(b"Parent")?.as_reference()?;
                    doc.get_dictionary(parent)?.get(b"MediaBox")
                })
                .and_then(|obj| obj.as_array())
                .expect("MediaBox");
            let value = |i: usize| media_box[i].as_float().expect("number");
            (value(2) - value(0), value(3) - value(1))
        })
        .collect()
}

/// Operands of the `cm` matrix the first image on the first page is drawn with.
pub fn image_placement(pdf: &[u8]) -> Vec<f32> {
    let doc = lopdf::Document::load_mem(pdf).expect("parse generated pdf");
    let page = *doc.get_pages().values().next().expect("one page");
    let content = doc.get_page_content(page).expect("page content");
    let operations = lopdf::content::Content::decode(&content)
        .expect("decode content stream")
        .operations;

    let draw = operations
        .iter()
        .position(|op| op.operator == "Do")
        .expect("image drawn");
    let matrix = operations[..draw]
        .iter()
        .rev()
        .find(|op| op.operator == "cm")
        .expect("cm before Do");
    matrix
        .operands
        .iter()
        .map(|obj| obj.as_float().expect("number"))
        .collect()
}

/// Text entries of the trailer `/Info` dictionary.
pub fn document_info(pdf: &[u8]) -> BTreeMap<String, String> {
    let doc = lopdf::Document::load_mem(pdf).expect("parse generated pdf");
    let info = match doc.trailer.get(b"Info").expect("Info in trailer") {
        lopdf::Object::Reference(id) => doc.get_dictionary(*id).expect("Info dictionary"),
        lopdf::Object::Dictionary(dict) => dict,
        other => panic!("unexpected Info entry: {other:?}"),
    };
    info.iter()
        .filter_map(|(key, value)| {
            let text = lopdf::decode_text_string(value).ok()?;
            Some((String::from_utf8_lossy(key).into_owned(), text))
        })
        .collect()
}

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.05
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resolution metadata reader.
//
// The `image` crate reports pixel dimensions only. PNG resolution comes from
// the `pHYs` chunk as decoded by the `png` crate; the JFIF APP0 density of a
// JPEG is read with `nom`. GIF, WEBP and AVIF carry no resolution we honour.

use std::io::Cursor;

use bildwerk_core::SourceFormat;
use nom::bytes::complete::{tag, take, take_while1};
use nom::error::{Error, ErrorKind};
use nom::number::complete::{be_u8, be_u16};
use nom::IResult;
use tracing::debug;

const INCHES_PER_METRE: f32 = 0.0254;
const CM_PER_INCH: f32 = 2.54;

const SOI: &[u8] = &[0xFF, 0xD8];
const JFIF_ID: &[u8] = b"JFIF\0";
const APP0: u8 = 0xE0;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;

/// Horizontal and vertical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Resolution {
    fn from_dots(horizontal: f32, vertical: f32) -> Option<Self> {
        let horizontal = horizontal.round();
        let vertical = vertical.round();
        (horizontal >= 1.0 && vertical >= 1.0).then_some(Self {
            horizontal,
            vertical,
        })
    }
}

/// Read the resolution stored in `bytes`, or `None` when the file has none.
pub fn read_resolution(format: SourceFormat, bytes: &[u8]) -> Option<Resolution> {
    let resolution = match format {
        SourceFormat::Png => png_physical_dimensions(bytes),
        SourceFormat::Jpeg => jfif_density(bytes),
        SourceFormat::Gif | SourceFormat::Webp | SourceFormat::Avif => None,
    };
    debug!(?format, ?resolution, "Resolution metadata");
    resolution
}

// -- PNG ----------------------------------------------------------------------

fn png_physical_dimensions(bytes: &[u8]) -> Option<Resolution> {
    let reader = match png::Decoder::new(Cursor::new(bytes)).read_info() {
        Ok(reader) => reader,
        Err(err) => {
            debug!(%err, "PNG header not readable, no resolution");
            return None;
        }
    };

    let dims = reader.info().pixel_dims?;
    // An unspecified unit only states the aspect ratio.
    match dims.unit {
        png::Unit::Meter => Resolution::from_dots(
            dims.xppu as f32 * INCHES_PER_METRE,
            dims.yppu as f32 * INCHES_PER_METRE,
        ),
        png::Unit::Unspecified => None,
    }
}

// -- JPEG ---------------------------------------------------------------------

#[derive(Debug)]
struct Segment<'a> {
    marker: u8,
    data: &'a [u8],
}

#[derive(Debug)]
struct JfifDensity {
    /// 0 = aspect ratio only, 1 = dots per inch, 2 = dots per centimetre
    units: u8,
    x: u16,
    y: u16,
}

fn start_of_image(input: &[u8]) -> IResult<&[u8], &[u8]> {
    tag(SOI)(input)
}

/// Marker byte, after any number of 0xFF fill bytes.
fn marker(input: &[u8]) -> IResult<&[u8], u8> {
    let (input, _) = take_while1(|b: u8| b == 0xFF)(input)?;
    be_u8(input)
}

fn segment(input: &[u8]) -> IResult<&[u8], Segment<'_>> {
    let (input, marker) = marker(input)?;
    match marker {
        // Standalone markers carry no length field.
        0x01 | 0xD0..=0xD7 | SOS | EOI => Ok((input, Segment { marker, data: &[] })),
        _ => {
            let (rest, length) = be_u16(input)?;
            if length < 2 {
                return Err(nom::Err::Error(Error::new(input, ErrorKind::Verify)));
            }
            let (rest, data) = take(usize::from(length - 2))(rest)?;
            Ok((rest, Segment { marker, data }))
        }
    }
}

fn jfif_app0(input: &[u8]) -> IResult<&[u8], JfifDensity> {
    let (input, _) = tag(JFIF_ID)(input)?;
    let (input, _version) = be_u16(input)?;
    let (input, units) = be_u8(input)?;
    let (input, x) = be_u16(input)?;
    let (input, y) = be_u16(input)?;
    Ok((input, JfifDensity { units, x, y }))
}

/// Scan the marker segments before the first scan for a JFIF APP0 header.
fn jfif_density(bytes: &[u8]) -> Option<Resolution> {
    let (mut input, _) = start_of_image(bytes).ok()?;

    loop {
        let (rest, current) = segment(input).ok()?;
        match current.marker {
            SOS | EOI => return None,
            APP0 => {
                if let Ok((_, density)) = jfif_app0(current.data) {
                    return density.resolution();
                }
            }
            _ => {}
        }
        input = rest;
    }
}

impl JfifDensity {
    fn resolution(&self) -> Option<Resolution> {
        let (x, y) = (f32::from(self.x), f32::from(self.y));
        match self.units {
            1 => Resolution::from_dots(x, y),
            2 => Resolution::from_dots(x * CM_PER_INCH, y * CM_PER_INCH),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn jpeg_with_app0(units: u8, x: u16, y: u16) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        bytes.extend_from_slice(b"JFIF\0");
        bytes.extend_from_slice(&[1, 1, units]);
        bytes.extend_from_slice(&x.to_be_bytes());
        bytes.extend_from_slice(&y.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
        bytes
    }

    #[test]
    fn png_phys_in_metres_converts_to_dpi() {
        // 2835 px/m is the usual encoding of 72 dpi.
        let png = fixtures::png_bytes(
            4,
            4,
            Some(png::PixelDimensions {
                xppu: 2835,
                yppu: 5669,
                unit: png::Unit::Meter,
            }),
        );
        let res = read_resolution(SourceFormat::Png, &png).unwrap();
        assert_eq!(res.horizontal, 72.0);
        assert_eq!(res.vertical, 144.0);
    }

    #[test]
    fn png_phys_with_unspecified_unit_is_ignored() {
        let png = fixtures::png_bytes(
            4,
            4,
            Some(png::PixelDimensions {
                xppu: 1,
                yppu: 1,
                unit: png::Unit::Unspecified,
            }),
        );
        assert_eq!(read_resolution(SourceFormat::Png, &png), None);
    }

    #[test]
    fn png_without_phys_yields_none() {
        let png = fixtures::png_bytes(4, 4, None);
        assert_eq!(read_resolution(SourceFormat::Png, &png), None);
    }

    #[test]
    fn truncated_png_yields_none() {
        let mut png = fixtures::png_bytes(4, 4, None);
        png.truncate(14);
        assert_eq!(read_resolution(SourceFormat::Png, &png), None);
    }

    #[test]
    fn jfif_density_in_inches() {
        let jpeg = jpeg_with_app0(1, 300, 150);
        let res = read_resolution(SourceFormat::Jpeg, &jpeg).unwrap();
        assert_eq!((res.horizontal, res.vertical), (300.0, 150.0));
    }

    #[test]
    fn jfif_density_in_centimetres() {
        let jpeg = jpeg_with_app0(2, 118, 118);
        let res = read_resolution(SourceFormat::Jpeg, &jpeg).unwrap();
        assert_eq!(res.horizontal, 300.0);
    }

    #[test]
    fn jfif_aspect_ratio_only_yields_none() {
        let jpeg = jpeg_with_app0(0, 1, 1);
        assert_eq!(read_resolution(SourceFormat::Jpeg, &jpeg), None);
    }

    #[test]
    fn zero_density_yields_none() {
        let jpeg = jpeg_with_app0(1, 0, 72);
        assert_eq!(read_resolution(SourceFormat::Jpeg, &jpeg), None);
    }

    #[test]
    fn jfif_after_fill_bytes_and_other_segments() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xFF, 0xE1, 0x00, 0x04, 0xAA, 0xBB];
        jpeg.extend_from_slice(&jpeg_with_app0(1, 96, 96)[2..]);
        let res = read_resolution(SourceFormat::Jpeg, &jpeg).unwrap();
        assert_eq!((res.horizontal, res.vertical), (96.0, 96.0));
    }

    #[test]
    fn jfif_after_start_of_scan_is_ignored() {
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02];
        jpeg.extend_from_slice(&jpeg_with_app0(1, 96, 96)[2..]);
        assert_eq!(read_resolution(SourceFormat::Jpeg, &jpeg), None);
    }

    #[test]
    fn formats_without_metadata_yield_none() {
        assert_eq!(read_resolution(SourceFormat::Gif, b"GIF89a"), None);
        assert_eq!(read_resolution(SourceFormat::Webp, b"RIFF\0\0\0\0WEBP"), None);
    }
}

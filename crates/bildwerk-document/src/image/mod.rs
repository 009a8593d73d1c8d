// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: WEBP/AVIF to PNG transcoding and the per-format preparation
// of source bytes for embedding in a PDF.

pub mod prepare;
pub mod transcode;

pub use prepare::{EmbedPreparers, EmbedSource, PrepareFn};
pub use transcode::{DecodedBitmap, transcode_to_png};

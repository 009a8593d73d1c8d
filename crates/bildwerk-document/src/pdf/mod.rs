// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: single-page document assembly and output.

pub mod writer;

pub use writer::{AssembledPdf, DocumentInfo, PageLayout, PdfWriter, write_output};

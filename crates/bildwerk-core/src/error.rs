// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Bildwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Bildwerk operations.
#[derive(Debug, Error)]
pub enum BildwerkError {
    // -- Probe errors --
    /// The file is an image, but not one of png, jpeg, gif, webp or avif.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("cannot read image {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    // -- Decode errors --
    /// The `image` build has no decoder for this format.
    #[error("no decoder available for {0} in this build")]
    DecodeUnsupported(String),

    #[error("image data is corrupt: {0}")]
    CorruptImage(String),

    // -- Output errors --
    #[error("PDF output failed: {0}")]
    Serialization(String),

    // -- Service lookup / configuration --
    #[error("no conversion service from {from} to {to}")]
    UnsupportedConversion { from: String, to: String },

    #[error("invalid extension configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BildwerkError>;

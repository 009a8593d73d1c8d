// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extension configuration and the host settings it is read from.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Key under which the host stores this extension's configuration.
pub const EXTENSION_NAME: &str = "convert_image";

/// Paper size option offered by the extension manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    #[serde(alias = "letter")]
    Letter,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
        }
    }
}

/// Settings shared by every conversion service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Resolution assumed when the source image carries none. Defaults to 72;
    /// libgd-based converters assume 96 here, so set 96 to match their page
    /// sizes.
    pub default_dpi: f32,
    /// Draw the resolution/size label onto the page.
    pub debug_overlay: bool,
    /// Paper size selected in the extension settings. The page itself is
    /// always sized to the image.
    pub paper_size: Option<PaperSize>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            default_dpi: 72.0,
            debug_overlay: false,
            paper_size: None,
        }
    }
}

impl ConvertConfig {
    /// Reject values the page layout cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.default_dpi.is_finite() || self.default_dpi <= 0.0 {
            return Err(BildwerkError::InvalidConfig(format!(
                "default_dpi must be a positive number, got {}",
                self.default_dpi
            )));
        }
        Ok(())
    }
}

/// The slice of host settings handed to the extension at registration time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostSettings {
    /// Per-extension configuration blobs keyed by extension name.
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

impl HostSettings {
    /// Load host settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// This extension's configuration, or the defaults when the host has none.
    pub fn convert_config(&self) -> Result<ConvertConfig> {
        let config = match self.extensions.get(EXTENSION_NAME) {
            Some(serde_json::Value::Null) | None => ConvertConfig::default(),
            Some(value) => serde_json::from_value(value.clone())?,
        };
        config.validate()?;
        Ok(config)
    }
}

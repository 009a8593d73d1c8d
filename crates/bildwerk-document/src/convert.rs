// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion service facade.
//
// A host asks a service to convert a file from its source MIME type to PDF.
// The image to PDF service probes the file, prepares the bytes for embedding
// (transcoding WEBP/AVIF to PNG), builds the page and writes or returns it.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use bildwerk_core::config::EXTENSION_NAME;
use bildwerk_core::error::Result;
use bildwerk_core::{
    ConversionOutput, ConversionParams, ConversionRequest, ConvertConfig, PDF_MIME, ParamKind,
    ParamSpec,
};
use serde_json::Value;
use tracing::{Level, debug, error, info, instrument, trace, warn};

use crate::image::prepare::EmbedPreparers;
use crate::pdf::writer::{AssembledPdf, PdfWriter, write_output};
use crate::probe;

/// Name of the margin parameter.
pub const MARGIN_PARAM: &str = "margin";

/// Receives the service's log lines; supplied by the host.
pub trait ConversionLogger: Send + Sync {
    fn log(&self, message: &str, level: Level);
}

/// Forwards log lines to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ConversionLogger for TracingLogger {
    fn log(&self, message: &str, level: Level) {
        match level {
            Level::ERROR => error!("{message}"),
            Level::WARN => warn!("{message}"),
            Level::INFO => info!("{message}"),
            Level::DEBUG => debug!("{message}"),
            _ => trace!("{message}"),
        }
    }
}

/// A conversion offered to the host for one (source, target) MIME pair.
pub trait ConversionService: Send + Sync {
    fn mime_from(&self) -> &str;

    fn mime_to(&self) -> &str;

    /// Human-readable description of the service.
    fn describe(&self) -> &str;

    /// Parameters accepted on top of source and target.
    fn additional_params(&self) -> Vec<ParamSpec>;

    /// Convert `source`. Writes to `target` when given, otherwise returns the
    /// document bytes.
    fn convert(
        &self,
        source: &Path,
        target: Option<&Path>,
        params: &ConversionParams,
    ) -> Result<ConversionOutput>;
}

/// Margin in points from the host parameters.
///
/// Numbers and numeric strings are truncated to whole points; anything
/// missing, non-numeric, non-positive or non-finite means no margin.
pub fn margin_from_params(params: &ConversionParams) -> f32 {
    let parsed = match params.get(MARGIN_PARAM) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed.map(f64::trunc) {
        Some(margin) if margin.is_finite() && margin > 0.0 => margin as f32,
        _ => 0.0,
    }
}

/// Converts PNG, JPEG, GIF, WEBP and AVIF images to single-page PDFs.
pub struct ImageToPdfService {
    mime_from: String,
    config: Arc<ConvertConfig>,
    preparers: Arc<EmbedPreparers>,
    writer: PdfWriter,
    logger: Option<Arc<dyn ConversionLogger>>,
}

impl ImageToPdfService {
    pub fn new(
        mime_from: impl Into<String>,
        config: Arc<ConvertConfig>,
        preparers: Arc<EmbedPreparers>,
    ) -> Self {
        let writer = PdfWriter::new(&config);
        Self {
            mime_from: mime_from.into(),
            config,
            preparers,
            writer,
            logger: None,
        }
    }

    /// Attach the host's logger.
    pub fn with_logger(mut self, logger: Arc<dyn ConversionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Build the document for `source` without writing it anywhere.
    pub fn render(&self, source: &Path, params: &ConversionParams) -> Result<AssembledPdf> {
        let request = ConversionRequest::new(
            source,
            None,
            margin_from_params(params),
            self.mime_from.as_str(),
        );
        self.assemble(&request)
    }

    #[instrument(skip(self, request), fields(
        source = %request.source.display(),
        from = %request.mime_from,
        margin = request.margin_pt,
    ))]
    fn assemble(&self, request: &ConversionRequest) -> Result<AssembledPdf> {
        let start = Instant::now();

        let image = probe::probe_file(&request.source, self.config.default_dpi)?;
        let embed = self
            .preparers
            .prepare(&image.bytes, image.descriptor.format)?;
        let pdf = self
            .writer
            .create_from_image(&image.descriptor, &embed, request.margin_pt)?;

        let elapsed = start.elapsed().as_secs_f64();
        if let Some(logger) = &self.logger {
            logger.log(
                &format!(
                    "Conversion from {} to {} with {} took {} sec.",
                    request.mime_from, request.mime_to, EXTENSION_NAME, elapsed
                ),
                Level::DEBUG,
            );
        }
        Ok(pdf)
    }
}

impl ConversionService for ImageToPdfService {
    fn mime_from(&self) -> &str {
        &self.mime_from
    }

    fn mime_to(&self) -> &str {
        PDF_MIME
    }

    fn describe(&self) -> &str {
        "Convert with service provided by extension convert_image based on printpdf"
    }

    fn additional_params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec {
            name: MARGIN_PARAM.into(),
            kind: ParamKind::Number,
            description: "Margin around image".into(),
        }]
    }

    fn convert(
        &self,
        source: &Path,
        target: Option<&Path>,
        params: &ConversionParams,
    ) -> Result<ConversionOutput> {
        let request = ConversionRequest::new(
            source,
            target,
            margin_from_params(params),
            self.mime_from.as_str(),
        );
        let pdf = self.assemble(&request)?;
        write_output(pdf.bytes, request.target.as_deref())
    }
}

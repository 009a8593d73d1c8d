// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bildwerk: image to PDF conversion service
//
// Entry point. Initialises logging, registers the conversion services the way
// a host would, and runs a single conversion or lists what is registered.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use bildwerk_core::{ConversionOutput, ConversionParams, HostSettings, PDF_MIME, SourceFormat};
use bildwerk_document::convert::MARGIN_PARAM;
use bildwerk_document::{ConversionRegistry, HostContext, TracingLogger};

#[derive(Parser, Debug)]
#[command(
    name = "bildwerk",
    version,
    about = "Convert PNG, JPEG, GIF, WEBP and AVIF images into single-page PDFs",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert one image into a PDF sized to the image.
    Convert {
        /// Source image. The format is taken from the file extension.
        input: PathBuf,

        /// Output PDF path. Defaults to the input path with a .pdf extension.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Margin around the image in points.
        #[arg(long)]
        margin: Option<f64>,

        /// Host settings file (JSON).
        #[arg(long, env = "BILDWERK_SETTINGS")]
        settings: Option<PathBuf>,
    },

    /// List the registered conversion services.
    Services {
        /// Host settings file (JSON).
        #[arg(long, env = "BILDWERK_SETTINGS")]
        settings: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert {
            input,
            output,
            margin,
            settings,
        } => convert(&input, output, margin, settings.as_deref()),
        Command::Services { settings } => list_services(settings.as_deref()),
    }
}

fn convert(
    input: &Path,
    output: Option<PathBuf>,
    margin: Option<f64>,
    settings: Option<&Path>,
) -> Result<()> {
    let host = load_host(settings)?;
    let registry = ConversionRegistry::from_host(&host, Some(Arc::new(TracingLogger)))
        .context("Failed to register conversion services")?;

    let mime = source_mime(input)?;
    let service = registry.find(mime, PDF_MIME)?;
    let target = output.unwrap_or_else(|| default_output(input));

    tracing::info!(input = %input.display(), mime, "Converting");
    let written = service
        .convert(input, Some(&target), &margin_params(margin))
        .with_context(|| format!("Conversion of {} failed", input.display()))?;

    if let ConversionOutput::Written(path) = written {
        println!("{}", path.display());
    }
    Ok(())
}

fn list_services(settings: Option<&Path>) -> Result<()> {
    let host = load_host(settings)?;
    let config = host
        .settings
        .convert_config()
        .context("Invalid extension configuration")?;
    let registry =
        ConversionRegistry::from_host(&host, None).context("Failed to register conversion services")?;

    for service in registry.services() {
        println!("{} -> {}", service.mime_from(), service.mime_to());
        println!("    {}", service.describe());
        for param in service.additional_params() {
            let kind = serde_json::to_value(param.kind)?;
            println!("    --{} ({}): {}", param.name, kind.as_str().unwrap_or("?"), param.description);
        }
    }

    println!();
    println!("default dpi: {}", config.default_dpi);
    println!("debug overlay: {}", config.debug_overlay);
    match config.paper_size {
        Some(paper) => {
            let (w, h) = paper.dimensions_mm();
            println!("paper size: {paper:?} ({w} x {h} mm)");
        }
        None => println!("paper size: not set"),
    }
    Ok(())
}

fn load_host(settings: Option<&Path>) -> Result<HostContext> {
    let settings = match settings {
        Some(path) => HostSettings::from_file(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        None => HostSettings::default(),
    };
    Ok(HostContext { settings })
}

/// Source MIME type from the file extension.
fn source_mime(input: &Path) -> Result<&'static str> {
    let Some(ext) = input.extension().and_then(|e| e.to_str()) else {
        bail!("{} has no file extension", input.display());
    };
    match SourceFormat::from_extension(ext) {
        Some(format) => Ok(format.mime_type()),
        None => bail!("unsupported image type: .{ext}"),
    }
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

fn margin_params(margin: Option<f64>) -> ConversionParams {
    let mut params = ConversionParams::new();
    if let Some(margin) = margin {
        params.insert(MARGIN_PARAM.into(), json!(margin));
    }
    params
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service registration.
//
// The host hands over its settings once at start-up and receives one service
// per source MIME type. All instances share the same configuration and
// preparer map.

use std::sync::Arc;

use bildwerk_core::error::{BildwerkError, Result};
use bildwerk_core::{HostSettings, REGISTERED_SOURCE_MIMES};
use tracing::{info, instrument};

use crate::convert::{ConversionLogger, ConversionService, ImageToPdfService};
use crate::image::prepare::EmbedPreparers;

/// What the host passes to the extension at registration time.
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    pub settings: HostSettings,
}

/// One image to PDF service per registered source MIME type.
#[instrument(skip_all)]
pub fn conversion_services(
    host: &HostContext,
    logger: Option<Arc<dyn ConversionLogger>>,
) -> Result<Vec<ImageToPdfService>> {
    let config = Arc::new(host.settings.convert_config()?);
    let preparers = Arc::new(EmbedPreparers::default());

    let services: Vec<_> = REGISTERED_SOURCE_MIMES
        .iter()
        .map(|mime| {
            let service = ImageToPdfService::new(*mime, config.clone(), preparers.clone());
            match &logger {
                Some(logger) => service.with_logger(logger.clone()),
                None => service,
            }
        })
        .collect();

    info!(count = services.len(), "Registered image conversion services");
    Ok(services)
}

/// Lookup table of the services a host knows about.
#[derive(Default)]
pub struct ConversionRegistry {
    services: Vec<Box<dyn ConversionService>>,
}

impl ConversionRegistry {
    /// Registry holding this extension's services.
    pub fn from_host(
        host: &HostContext,
        logger: Option<Arc<dyn ConversionLogger>>,
    ) -> Result<Self> {
        let mut registry = Self::default();
        for service in conversion_services(host, logger)? {
            registry.register(Box::new(service));
        }
        Ok(registry)
    }

    pub fn register(&mut self, service: Box<dyn ConversionService>) {
        self.services.push(service);
    }

    pub fn services(&self) -> &[Box<dyn ConversionService>] {
        &self.services
    }

    /// Service converting `from` into `to`. MIME types compare case-insensitively.
    pub fn find(&self, from: &str, to: &str) -> Result<&dyn ConversionService> {
        self.services
            .iter()
            .find(|s| s.mime_from().eq_ignore_ascii_case(from) && s.mime_to().eq_ignore_ascii_case(to))
            .map(|s| &**s)
            .ok_or_else(|| BildwerkError::UnsupportedConversion {
                from: from.to_owned(),
                to: to.to_owned(),
            })
    }
}

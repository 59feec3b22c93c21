//! Shared application state for cmd_exporter.
//!
//! Everything here is built once at startup and read-only afterwards, so
//! overlapping scrapes share it without locking.

use std::sync::Arc;

use prometheus::Registry;

use cmd_exporter_core::error::{ExporterError, Result};

use crate::collector::CommandCollector;
use crate::config::ExporterConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    registry: Registry,
}

impl AppState {
    /// Build the descriptor registry and register the command collector.
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let collector = CommandCollector::new(&cfg)?;
        tracing::info!(
            commands = cfg.commands.len(),
            metrics = ?collector.metric_names(),
            "command collector built"
        );

        let registry = Registry::new();
        if collector.metric_names().is_empty() {
            tracing::warn!("no commands configured; /metrics will be empty");
        } else {
            registry
                .register(Box::new(collector))
                .map_err(|e| ExporterError::Metrics(format!("register collector failed: {e}")))?;
        }

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry }),
        })
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }
}

//! Collect-on-scrape Prometheus collector.
//!
//! Descriptors are derived once from the config and never change for the
//! life of the process. Every `collect()` re-runs each configured command,
//! in order of metric name, and emits one gauge per command with the labels
//! `output` and `error`.

use std::collections::{BTreeMap, HashMap};

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};

use cmd_exporter_core::error::{ExporterError, Result};
use cmd_exporter_core::exec;

use crate::config::ExporterConfig;

pub const LABEL_OUTPUT: &str = "output";
pub const LABEL_ERROR: &str = "error";

/// `prefix_key`, with characters a metric name cannot hold mapped to `_`.
pub fn metric_name(prefix: &str, key: &str) -> String {
    let key: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == ':' { c } else { '_' })
        .collect();
    format!("{prefix}_{key}")
}

/// One configured command and its fixed descriptor.
#[derive(Debug)]
pub struct CommandMetric {
    pub key: String,
    pub command: String,
    desc: Desc,
}

impl CommandMetric {
    pub fn desc(&self) -> &Desc {
        &self.desc
    }
}

/// One gauge reading produced by a scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub key: String,
    pub value: f64,
    pub output: String,
    pub error: String,
}

#[derive(Debug)]
pub struct CommandCollector {
    help: String,
    metrics: BTreeMap<String, CommandMetric>,
}

impl CommandCollector {
    pub fn new(cfg: &ExporterConfig) -> Result<Self> {
        let mut metrics: BTreeMap<String, CommandMetric> = BTreeMap::new();

        for (key, command) in &cfg.commands {
            let name = metric_name(&cfg.metrics_prefix, key);
            let desc = Desc::new(
                name.clone(),
                cfg.help_message.clone(),
                vec![LABEL_OUTPUT.to_string(), LABEL_ERROR.to_string()],
                HashMap::new(),
            )
            .map_err(|e| ExporterError::Metrics(format!("descriptor {name}: {e}")))?;

            let metric = CommandMetric {
                key: key.clone(),
                command: command.clone(),
                desc,
            };
            // Last registration wins on a name collision.
            if let Some(prev) = metrics.insert(name.clone(), metric) {
                tracing::warn!(
                    metric = %name,
                    replaced_key = %prev.key,
                    key = %key,
                    "command keys collide on metric name; keeping the later key"
                );
            }
        }

        Ok(Self {
            help: cfg.help_message.clone(),
            metrics,
        })
    }

    /// The fixed descriptor set, keyed by metric name.
    pub fn describe(&self) -> impl Iterator<Item = (&str, &CommandMetric)> {
        self.metrics.iter().map(|(name, m)| (name.as_str(), m))
    }

    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.keys().map(String::as_str).collect()
    }

    /// Run every configured command once, sequentially.
    pub fn collect_samples(&self) -> Vec<Sample> {
        self.metrics
            .iter()
            .map(|(name, m)| {
                let (resolved, outcome) = exec::run_resolved(&m.command);
                match &resolved {
                    Some(cmd) => tracing::info!(
                        key = %m.key,
                        command = %cmd,
                        output = %outcome.output,
                        value = outcome.value,
                        error = %outcome.error,
                        success = outcome.is_success(),
                        "command executed"
                    ),
                    None => tracing::warn!(
                        key = %m.key,
                        line = %m.command,
                        value = outcome.value,
                        error = %outcome.error,
                        "command line could not be tokenized"
                    ),
                }
                Sample {
                    name: name.clone(),
                    key: m.key.clone(),
                    value: outcome.gauge_value(),
                    output: outcome.output,
                    error: outcome.error,
                }
            })
            .collect()
    }

    fn encode(&self, sample: &Sample) -> Option<Vec<MetricFamily>> {
        let gauge = match GaugeVec::new(
            Opts::new(sample.name.clone(), self.help.clone()),
            &[LABEL_OUTPUT, LABEL_ERROR],
        ) {
            Ok(g) => g,
            Err(e) => {
                tracing::error!(metric = %sample.name, error = %e, "gauge encode failed");
                return None;
            }
        };
        gauge
            .with_label_values(&[sample.output.as_str(), sample.error.as_str()])
            .set(sample.value);
        Some(gauge.collect())
    }
}

impl Collector for CommandCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.metrics.values().map(CommandMetric::desc).collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.collect_samples()
            .iter()
            .filter_map(|s| self.encode(s))
            .flatten()
            .collect()
    }
}

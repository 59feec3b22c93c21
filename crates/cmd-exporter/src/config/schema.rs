use std::collections::BTreeMap;

use serde::Deserialize;

use cmd_exporter_core::error::{ExporterError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    pub port: u16,

    pub metrics_prefix: String,

    #[serde(default = "default_help_message")]
    pub help_message: String,

    /// Metric key -> command line. May be empty.
    pub commands: BTreeMap<String, String>,
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_metric_name(&self.metrics_prefix) {
            return Err(ExporterError::Config(format!(
                "metrics_prefix {:?} is not a valid metric name",
                self.metrics_prefix
            )));
        }
        if self.help_message.trim().is_empty() {
            return Err(ExporterError::Config("help_message must not be empty".into()));
        }
        // Command lines are tokenized per scrape, never here.
        Ok(())
    }

    /// `host:port`, with bare IPv6 hosts bracketed.
    pub fn bind_address(&self) -> String {
        let host = self.listen_address.as_str();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        }
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn default_listen_address() -> String {
    "0.0.0.0".into()
}
fn default_help_message() -> String {
    "Exit status of the configured command".into()
}

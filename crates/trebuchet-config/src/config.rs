//! Runtime configuration of the daemon process itself.
//!
//! This is distinct from the settings document: it only says where the
//! document lives and how log lines are emitted.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;

use crate::defaults::{DEFAULT_LOG_FILTER, DEFAULT_SETTINGS_PATH};
use crate::logging::LogFormat;

/// Command-line configuration for `trebuchetd`.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "trebuchetd", version, about = "Component bootstrapper daemon")]
pub struct DaemonConfig {
    /// Path of the settings document.
    #[arg(long = "settings", value_name = "PATH", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings_path: Utf8PathBuf,
    /// Log filter expression, e.g. `info` or `trebuchetd=debug`.
    #[arg(long, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Output format of log lines.
    #[arg(long, value_enum, default_value_t = LogFormat::Console)]
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            settings_path: crate::defaults::default_settings_path(),
            log_filter: crate::defaults::default_log_filter().to_owned(),
            log_format: crate::defaults::default_log_format(),
        }
    }
}

impl DaemonConfig {
    /// Path of the settings document.
    #[must_use]
    pub fn settings_path(&self) -> &Utf8Path {
        self.settings_path.as_path()
    }

    /// Log filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Output format of log lines.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

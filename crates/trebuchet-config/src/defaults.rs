use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Settings document read when no path is supplied.
pub const DEFAULT_SETTINGS_PATH: &str = "trebuchet.yaml";

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default settings document path.
#[must_use]
pub fn default_settings_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SETTINGS_PATH)
}

/// Default log filter expression used by the daemon.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the daemon.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Console
}

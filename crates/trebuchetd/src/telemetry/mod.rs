//! Log sink initialisation for the daemon.
//!
//! Every line goes through one mutex-guarded writer, so lines from
//! concurrent components never interleave and each thread's lines keep the
//! order they were issued in.

mod console;

use std::io::{self, IsTerminal, Write};
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use trebuchet_config::{ConsoleSettings, DaemonConfig, LogFormat};

use self::console::ConsoleFormat;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: only the first invocation installs the
/// subscriber and applies the console title; later calls return a fresh
/// [`TelemetryHandle`] and leave the installed sink untouched.
pub fn initialise(
    config: &DaemonConfig,
    console: &ConsoleSettings,
) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config, console))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(
    config: &DaemonConfig,
    console: &ConsoleSettings,
) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let ansi = io::stderr().is_terminal();

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(Mutex::new(io::stderr()))
            .with_ansi(ansi)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Console => Box::new(
            builder(filter)
                .event_format(ConsoleFormat::new(console.clone()))
                .finish(),
        ),
        LogFormat::Json => {
            let json_builder = builder(filter).json();
            let json = json_builder.flatten_event(true).finish();
            Box::new(json)
        }
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;

    if config.log_format() == LogFormat::Console && ansi {
        apply_console_title(&mut io::stderr(), &console.title);
    }
    Ok(())
}

/// Sets the terminal window title; write failures are not worth failing over.
fn apply_console_title(terminal: &mut impl Write, title: &str) {
    let sequence = title_sequence(title);
    if terminal
        .write_all(sequence.as_bytes())
        .and_then(|()| terminal.flush())
        .is_err()
    {
        tracing::debug!(title, "terminal rejected console title");
    }
}

fn title_sequence(title: &str) -> String {
    let visible: String = title.chars().filter(|c| !c.is_control()).collect();
    format!("\x1b]0;{visible}\x07")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_sequence_strips_control_characters() {
        assert_eq!(title_sequence("Edge\x1b node\n"), "\x1b]0;Edge node\x07");
    }

    #[test]
    fn title_is_written_to_the_terminal() {
        let mut terminal = Vec::new();
        apply_console_title(&mut terminal, "Trebuchet");
        assert_eq!(terminal, b"\x1b]0;Trebuchet\x07");
    }

    #[test]
    fn repeated_initialisation_is_idempotent() {
        let config = DaemonConfig::default();
        let console = ConsoleSettings::default();
        let first = initialise(&config, &console);
        let second = initialise(&config, &console);
        assert_eq!(first.is_ok(), second.is_ok());
    }
}

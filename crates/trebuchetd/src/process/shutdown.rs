use std::io::{self, Read};

use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Abstraction over shutdown notification mechanisms.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Errors reported by shutdown signal listeners.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Reading the controlling input failed before it was closed.
    #[error("failed to read standard input: {source}")]
    Input {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Shutdown listener that waits for standard input to be closed.
///
/// Anything written to standard input is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinShutdownSignal;

impl StdinShutdownSignal {
    /// Builds a new listener.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ShutdownSignal for StdinShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        info!(
            target: PROCESS_TARGET,
            "close standard input to stop the daemon"
        );
        let discarded = drain_until_closed(io::stdin().lock())?;
        info!(
            target: PROCESS_TARGET,
            discarded,
            "standard input closed"
        );
        Ok(())
    }
}

/// Reads `input` to end-of-file, returning the number of bytes discarded.
pub(crate) fn drain_until_closed(mut input: impl Read) -> Result<u64, ShutdownError> {
    io::copy(&mut input, &mut io::sink()).map_err(|source| ShutdownError::Input { source })
}

//! Daemon process supervision: bootstrap, wait for shutdown, exit.

mod shutdown;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use trebuchet_config::DaemonConfig;

use crate::bootstrap::{BootstrapError, FileSettingsLoader, SettingsLoader, bootstrap_with};
use crate::component::ComponentCatalog;
use crate::health::{HealthReporter, StructuredHealthReporter};

pub use shutdown::{ShutdownError, ShutdownSignal, StdinShutdownSignal};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors surfaced while launching or supervising the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

/// Collaborators required to run the daemon.
pub struct LaunchPlan<'a> {
    /// Source of the settings document.
    pub loader: &'a dyn SettingsLoader,
    /// Sink for lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
    /// Components to discover and construct.
    pub catalog: &'a ComponentCatalog,
    /// Blocks until the daemon should stop.
    pub shutdown: &'a dyn ShutdownSignal,
}

/// Runs the daemon using the production collaborators.
pub fn run_daemon(config: &DaemonConfig) -> Result<(), LaunchError> {
    let loader = FileSettingsLoader::from_config(config);
    let catalog = ComponentCatalog::builtin();
    let plan = LaunchPlan {
        loader: &loader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        catalog: &catalog,
        shutdown: &StdinShutdownSignal::new(),
    };
    run_daemon_with(config, plan)
}

/// Runs the daemon with injected collaborators.
pub fn run_daemon_with(config: &DaemonConfig, plan: LaunchPlan<'_>) -> Result<(), LaunchError> {
    let LaunchPlan {
        loader,
        reporter,
        catalog,
        shutdown,
    } = plan;

    let daemon = bootstrap_with(config, loader, reporter, catalog)?;
    info!(
        target: PROCESS_TARGET,
        settings = daemon.settings().origin(),
        components = daemon.summary().registered(),
        "daemon running"
    );
    shutdown.wait()?;
    drop(daemon);
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}

//! Bootstrap orchestration: settings, log sink, then every component.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use trebuchet_config::{
    ComponentIdentity, ConsoleSettings, DaemonConfig, LOG_NAMESPACE, SettingsError, SettingsStore,
};

use crate::component::{ComponentCatalog, ComponentKind};
use crate::health::HealthReporter;
use crate::registry::{ComponentRegistry, DiscoverySummary, RegistryError};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting settings loading for testability.
pub trait SettingsLoader: Send + Sync {
    /// Loads the settings document, resolving block types against `known`.
    fn load(&self, known: &[ComponentIdentity]) -> Result<SettingsStore, SettingsError>;
}

/// Loader that reads the settings document from disk.
#[derive(Debug, Clone)]
pub struct FileSettingsLoader {
    path: Utf8PathBuf,
}

impl FileSettingsLoader {
    /// Builds a loader for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loader for the document named by the daemon configuration.
    #[must_use]
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::new(config.settings_path())
    }
}

impl SettingsLoader for FileSettingsLoader {
    fn load(&self, known: &[ComponentIdentity]) -> Result<SettingsStore, SettingsError> {
        SettingsStore::load(&self.path, known)
    }
}

/// Loader that parses an in-memory settings document.
#[derive(Debug, Clone)]
pub struct StaticSettingsLoader {
    origin: String,
    document: String,
}

impl StaticSettingsLoader {
    /// Builds a loader for `document`, labelled `origin` in diagnostics.
    #[must_use]
    pub fn new(origin: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            document: document.into(),
        }
    }
}

impl SettingsLoader for StaticSettingsLoader {
    fn load(&self, known: &[ComponentIdentity]) -> Result<SettingsStore, SettingsError> {
        SettingsStore::parse(&self.origin, &self.document, known)
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The settings document failed to load.
    #[error("failed to load settings: {source}")]
    Settings {
        /// Underlying loader error.
        #[source]
        source: SettingsError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The component registry became unusable.
    #[error("component registry failed: {source}")]
    Registry {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Process context produced by a successful bootstrap.
///
/// Owns the settings and the populated registry for the lifetime of the
/// process; components are reached through [`Daemon::lookup`].
#[derive(Debug)]
pub struct Daemon {
    config: DaemonConfig,
    settings: Arc<SettingsStore>,
    registry: Arc<ComponentRegistry>,
    console: ConsoleSettings,
    summary: DiscoverySummary,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the daemon configuration.
    #[must_use]
    pub const fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Accessor for the loaded settings.
    #[must_use]
    pub const fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Accessor for the populated component registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Console settings the log sink was configured with.
    #[must_use]
    pub const fn console(&self) -> &ConsoleSettings {
        &self.console
    }

    /// Outcome of component discovery.
    #[must_use]
    pub const fn summary(&self) -> &DiscoverySummary {
        &self.summary
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Looks up a constructed component by its kind.
    pub fn lookup<T: ComponentKind>(&self) -> Result<Arc<T>, RegistryError> {
        self.registry.lookup::<T>()
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// Only a settings failure or a telemetry failure stops the bootstrap;
/// component failures are reported and discovery continues.
pub fn bootstrap_with(
    config: &DaemonConfig,
    loader: &dyn SettingsLoader,
    reporter: Arc<dyn HealthReporter>,
    catalog: &ComponentCatalog,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let settings = match loader.load(&catalog.identities()) {
        Ok(store) => Arc::new(store),
        Err(source) => {
            // Install the default sink so the failure still reaches the console.
            let fallback = ConsoleSettings::default();
            if let Err(telemetry_error) = telemetry::initialise(config, &fallback) {
                reporter.bootstrap_failed(&BootstrapError::Telemetry {
                    source: telemetry_error,
                });
            }
            let error = BootstrapError::Settings { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    // Console issues are held back until the sink that reports them exists.
    let (console, console_issues) = settings
        .fragment_for_namespace(LOG_NAMESPACE)
        .map(|fragment| ConsoleSettings::resolve(&fragment))
        .unwrap_or_default();
    let telemetry = match telemetry::initialise(config, &console) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.settings_loaded(&settings);
    for block in settings.rejected() {
        reporter.settings_block_rejected(block);
    }
    for issue in &console_issues {
        reporter.console_setting_degraded(issue);
    }
    reporter.console_configured(&console);

    let registry = Arc::new(ComponentRegistry::new());
    let summary = match registry.discover_and_construct_all(catalog, &settings, &*reporter) {
        Ok(summary) => summary,
        Err(source) => {
            let error = BootstrapError::Registry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };
    reporter.bootstrap_succeeded(&summary);

    Ok(Daemon {
        config: config.clone(),
        settings,
        registry,
        console,
        summary,
        telemetry,
    })
}

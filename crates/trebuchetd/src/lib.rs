//! Component bootstrapper for the Trebuchet daemon.
//!
//! At start-up the daemon loads the settings document described in
//! [`trebuchet_config`], installs the log sink configured by its `Log`
//! namespace, and then walks the [`ComponentCatalog`]. Each component is
//! instantiated, admitted to the [`ComponentRegistry`] under its identity,
//! and constructed from its configuration fragment. A component that fails
//! to construct is reported through the [`HealthReporter`] and stays
//! registered; only a missing or malformed settings document stops the
//! process.
//!
//! The resulting [`Daemon`] is the process context: it owns the settings and
//! the registry, and hands out components through [`Daemon::lookup`].
//!
//! The only component shipped today is [`NetworkListener`], which opens a
//! non-blocking listening TCP socket from its `Binding` and `Listening`
//! settings.

mod bootstrap;
mod component;
mod components;
mod health;
mod process;
mod registry;
mod telemetry;

pub use bootstrap::{
    BootstrapError, Daemon, FileSettingsLoader, SettingsLoader, StaticSettingsLoader,
    bootstrap_with,
};
pub use component::{
    Component, ComponentCatalog, ComponentDescriptor, ComponentError, ComponentKind, IntoAnyArc,
};
pub use components::{LISTENER_IDENTITY, ListenerSettings, NetworkListener};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, LaunchPlan, ShutdownError, ShutdownSignal, StdinShutdownSignal, run_daemon,
    run_daemon_with,
};
pub use registry::{Admission, ComponentRegistry, DiscoverySummary, RegistryError};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod tests;

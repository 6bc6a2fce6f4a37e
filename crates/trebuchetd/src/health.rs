//! Structured health reporting for bootstrap lifecycle events.

use std::sync::Arc;

use trebuchet_config::{
    ComponentIdentity, ConsoleSettingIssue, ConsoleSettings, RejectedBlock, SettingsStore,
};

use crate::bootstrap::BootstrapError;
use crate::component::ComponentError;
use crate::registry::DiscoverySummary;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before the settings document is loaded.
    fn bootstrap_starting(&self);

    /// Invoked once the settings document has been indexed.
    fn settings_loaded(&self, settings: &SettingsStore);

    /// Invoked for each settings block that could not be indexed.
    fn settings_block_rejected(&self, block: &RejectedBlock);

    /// Invoked for each log setting that degraded while resolving the
    /// console settings; reported once the log sink is installed.
    fn console_setting_degraded(&self, issue: &ConsoleSettingIssue);

    /// Invoked after the log sink applied the console settings.
    fn console_configured(&self, console: &ConsoleSettings);

    /// Invoked when a component has no configuration fragment.
    fn component_unconfigured(&self, identity: ComponentIdentity);

    /// Invoked after a component constructed successfully.
    fn component_constructed(&self, identity: ComponentIdentity);

    /// Invoked when a component failed to construct.
    fn component_failed(&self, identity: ComponentIdentity, error: &ComponentError);

    /// Invoked when a component was refused because its identity was taken.
    fn component_rejected(&self, identity: ComponentIdentity);

    /// Invoked after every component has been discovered.
    fn bootstrap_succeeded(&self, summary: &DiscoverySummary);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn settings_loaded(&self, settings: &SettingsStore) {
        (**self).settings_loaded(settings);
    }

    fn settings_block_rejected(&self, block: &RejectedBlock) {
        (**self).settings_block_rejected(block);
    }

    fn console_setting_degraded(&self, issue: &ConsoleSettingIssue) {
        (**self).console_setting_degraded(issue);
    }

    fn console_configured(&self, console: &ConsoleSettings) {
        (**self).console_configured(console);
    }

    fn component_unconfigured(&self, identity: ComponentIdentity) {
        (**self).component_unconfigured(identity);
    }

    fn component_constructed(&self, identity: ComponentIdentity) {
        (**self).component_constructed(identity);
    }

    fn component_failed(&self, identity: ComponentIdentity, error: &ComponentError) {
        (**self).component_failed(identity, error);
    }

    fn component_rejected(&self, identity: ComponentIdentity) {
        (**self).component_rejected(identity);
    }

    fn bootstrap_succeeded(&self, summary: &DiscoverySummary) {
        (**self).bootstrap_succeeded(summary);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting component bootstrap"
        );
    }

    fn settings_loaded(&self, settings: &SettingsStore) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "settings_loaded",
            origin = settings.origin(),
            components = settings.configured_identities().len(),
            namespaces = settings.namespace_count(),
            rejected = settings.rejected().len(),
            "settings document loaded"
        );
    }

    fn settings_block_rejected(&self, block: &RejectedBlock) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "settings_block_rejected",
            index = block.index,
            reason = %block.reason,
            "skipping settings block"
        );
    }

    fn console_setting_degraded(&self, issue: &ConsoleSettingIssue) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "console_setting_degraded",
            error = %issue,
            "log setting could not be applied as written"
        );
    }

    fn console_configured(&self, console: &ConsoleSettings) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "console_configured",
            title = %console.title,
            header_color = %console.header_color,
            body_color = %console.body_color,
            "console title changed to '{}'",
            console.title
        );
    }

    fn component_unconfigured(&self, identity: ComponentIdentity) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "component_unconfigured",
            component = %identity,
            "component has no configuration; constructing with defaults"
        );
    }

    fn component_constructed(&self, identity: ComponentIdentity) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "component_constructed",
            component = %identity,
            "component constructed"
        );
    }

    fn component_failed(&self, identity: ComponentIdentity, error: &ComponentError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "component_failed",
            component = %identity,
            error = %error,
            "component failed to construct"
        );
    }

    fn component_rejected(&self, identity: ComponentIdentity) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "component_rejected",
            component = %identity,
            "component identity already registered; instance discarded"
        );
    }

    fn bootstrap_succeeded(&self, summary: &DiscoverySummary) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            constructed = summary.constructed.len(),
            failed = summary.failed.len(),
            rejected = summary.rejected.len(),
            unconfigured = summary.unconfigured.len(),
            "component bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "component bootstrap failed"
        );
    }
}

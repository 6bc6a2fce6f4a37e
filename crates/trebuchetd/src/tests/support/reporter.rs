//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use trebuchet_config::{
    ComponentIdentity, ConsoleSettingIssue, ConsoleSettings, RejectedBlock, SettingsStore,
};

use crate::bootstrap::BootstrapError;
use crate::component::ComponentError;
use crate::health::HealthReporter;
use crate::registry::DiscoverySummary;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Settings were loaded from the named origin.
    SettingsLoaded(String),
    /// A settings block was skipped.
    SettingsBlockRejected(RejectedBlock),
    /// A log setting degraded to its fallback.
    ConsoleSettingDegraded(ConsoleSettingIssue),
    /// The console title was applied.
    ConsoleConfigured(String),
    /// A component had no configuration.
    ComponentUnconfigured(ComponentIdentity),
    /// A component constructed successfully.
    ComponentConstructed(ComponentIdentity),
    /// A component failed to construct.
    ComponentFailed {
        identity: ComponentIdentity,
        message: String,
    },
    /// A component was refused because its identity was taken.
    ComponentRejected(ComponentIdentity),
    /// Bootstrap completed successfully.
    BootstrapSucceeded(DiscoverySummary),
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn settings_loaded(&self, settings: &SettingsStore) {
        self.record(HealthEvent::SettingsLoaded(settings.origin().to_owned()));
    }

    fn settings_block_rejected(&self, block: &RejectedBlock) {
        self.record(HealthEvent::SettingsBlockRejected(block.clone()));
    }

    fn console_setting_degraded(&self, issue: &ConsoleSettingIssue) {
        self.record(HealthEvent::ConsoleSettingDegraded(issue.clone()));
    }

    fn console_configured(&self, console: &ConsoleSettings) {
        self.record(HealthEvent::ConsoleConfigured(console.title.clone()));
    }

    fn component_unconfigured(&self, identity: ComponentIdentity) {
        self.record(HealthEvent::ComponentUnconfigured(identity));
    }

    fn component_constructed(&self, identity: ComponentIdentity) {
        self.record(HealthEvent::ComponentConstructed(identity));
    }

    fn component_failed(&self, identity: ComponentIdentity, error: &ComponentError) {
        self.record(HealthEvent::ComponentFailed {
            identity,
            message: error.to_string(),
        });
    }

    fn component_rejected(&self, identity: ComponentIdentity) {
        self.record(HealthEvent::ComponentRejected(identity));
    }

    fn bootstrap_succeeded(&self, summary: &DiscoverySummary) {
        self.record(HealthEvent::BootstrapSucceeded(summary.clone()));
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }
}

//! BDD test world: settings document, catalog, reporter, and bootstrap outcome.

use std::cell::RefCell;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use camino::Utf8PathBuf;
use tempfile::TempDir;
use trebuchet_config::DaemonConfig;

use crate::bootstrap::{BootstrapError, Daemon, FileSettingsLoader, bootstrap_with};
use crate::component::{ComponentCatalog, ComponentDescriptor, ComponentKind};

use super::components::RecordingComponent;
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    pub reporter: Arc<RecordingHealthReporter>,
    pub counter: Arc<AtomicUsize>,
    pub listener_port: Option<u16>,
    blocks: Vec<String>,
    write_document: bool,
    catalog: ComponentCatalog,
    directory: TempDir,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with an empty document and the built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reporter: Arc::new(RecordingHealthReporter::default()),
            counter: Arc::new(AtomicUsize::new(0)),
            listener_port: None,
            blocks: Vec::new(),
            write_document: true,
            catalog: ComponentCatalog::builtin(),
            directory: TempDir::new().expect("failed to create settings directory"),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Appends a raw block to the `components` sequence.
    pub fn push_block(&mut self, block: String) {
        self.blocks.push(block);
    }

    /// Leaves the settings file out so loading fails.
    pub fn remove_document(&mut self) {
        self.write_document = false;
    }

    /// Adds a recording component that counts its constructions.
    pub fn add_recording_component(&mut self) {
        let counter = Arc::clone(&self.counter);
        let catalog = std::mem::take(&mut self.catalog);
        self.catalog = catalog.with(ComponentDescriptor::new(
            RecordingComponent::IDENTITY,
            move || Box::new(RecordingComponent::with_counter("scenario", Arc::clone(&counter))),
        ));
    }

    /// Runs the bootstrap sequence once against the settings file.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        let path = Utf8PathBuf::from_path_buf(self.directory.path().join("trebuchet.yaml"))
            .expect("temporary path was not valid UTF-8");
        if self.write_document {
            fs::write(&path, self.document()).expect("failed to write settings document");
        }
        let config = DaemonConfig {
            settings_path: path,
            ..DaemonConfig::default()
        };
        let loader = FileSettingsLoader::from_config(&config);
        match bootstrap_with(&config, &loader, self.reporter.clone(), &self.catalog) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    fn document(&self) -> String {
        if self.blocks.is_empty() {
            return "components: []\n".to_owned();
        }
        let mut document = String::from("components:\n");
        for block in &self.blocks {
            document.push_str(block);
        }
        document
    }

    /// Returns the bootstrap error, if any.
    #[must_use]
    pub const fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the bootstrapped daemon, if any.
    #[must_use]
    pub const fn daemon(&self) -> Option<&Daemon> {
        self.daemon.as_ref()
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}

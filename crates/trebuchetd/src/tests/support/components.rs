//! Test components that record how they were constructed.

use std::net::{Ipv4Addr, TcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use trebuchet_config::{ComponentIdentity, ConfigurationFragment};

use crate::component::{Component, ComponentError, ComponentKind};

/// Component that keeps every fragment it was constructed with.
#[derive(Debug)]
pub struct RecordingComponent {
    tag: String,
    counter: Arc<AtomicUsize>,
    constructions: Vec<ConfigurationFragment>,
}

impl RecordingComponent {
    /// Builds a component and returns the counter its constructions bump.
    pub fn tagged(tag: &str) -> (Self, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        (Self::with_counter(tag, Arc::clone(&counter)), counter)
    }

    /// Builds a component sharing an existing construction counter.
    pub fn with_counter(tag: &str, counter: Arc<AtomicUsize>) -> Self {
        Self {
            tag: tag.to_owned(),
            counter,
            constructions: Vec::new(),
        }
    }

    pub const fn tag(&self) -> &str {
        self.tag.as_str()
    }

    pub fn constructions(&self) -> Vec<ConfigurationFragment> {
        self.constructions.clone()
    }
}

impl Component for RecordingComponent {
    fn construct(&mut self, fragment: &ConfigurationFragment) -> Result<(), ComponentError> {
        self.counter.fetch_add(1, Ordering::SeqCst);
        self.constructions.push(fragment.clone());
        Ok(())
    }
}

impl ComponentKind for RecordingComponent {
    const IDENTITY: ComponentIdentity = ComponentIdentity::new("Test.Recording");

    fn create() -> Self {
        Self::tagged("default").0
    }
}

/// Component whose construction always fails.
#[derive(Debug, Default)]
pub struct FailingComponent;

impl Component for FailingComponent {
    fn construct(&mut self, _fragment: &ConfigurationFragment) -> Result<(), ComponentError> {
        Err(ComponentError::failed(Self::IDENTITY, "deliberate failure"))
    }
}

impl ComponentKind for FailingComponent {
    const IDENTITY: ComponentIdentity = ComponentIdentity::new("Test.Failing");

    fn create() -> Self {
        Self
    }
}

/// Finds a TCP port that is free on every interface right now.
pub fn free_port() -> u16 {
    let scratch = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0)).expect("bind scratch port");
    scratch.local_addr().expect("scratch port address").port()
}

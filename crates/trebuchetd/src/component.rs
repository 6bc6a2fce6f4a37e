//! Component contract and the static catalog of component kinds.
//!
//! Components are discovered from an explicit [`ComponentCatalog`] rather
//! than by scanning the program at runtime. The catalog order is the
//! discovery order.

use std::any::Any;
use std::fmt;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use trebuchet_config::{ComponentIdentity, ConfigurationFragment, FragmentError};

use crate::components::NetworkListener;

/// Conversion of a shared component into a downcastable handle.
///
/// Implemented for every sized component; callers never implement it.
pub trait IntoAnyArc: Any + Send + Sync {
    /// Erases the component type so it can be downcast.
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> IntoAnyArc for T {
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Unit of process functionality configured from a fragment.
pub trait Component: IntoAnyArc {
    /// Configures the component from its fragment.
    ///
    /// Called exactly once, after the component has been admitted to the
    /// registry. Components without configuration receive an empty fragment.
    fn construct(&mut self, fragment: &ConfigurationFragment) -> Result<(), ComponentError>;
}

/// Static description of a component kind.
pub trait ComponentKind: Component + Sized {
    /// Identity the kind is registered and configured under.
    const IDENTITY: ComponentIdentity;

    /// Builds an unconfigured instance.
    fn create() -> Self;
}

/// Errors raised by a component while constructing itself.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The fragment lacks settings the component requires.
    #[error("invalid configuration for {identity}: {source}")]
    InvalidConfiguration {
        /// Component that rejected its fragment.
        identity: ComponentIdentity,
        /// Structural problem found in the fragment.
        #[source]
        source: FragmentError,
    },
    /// An operating system call failed.
    #[error("{identity} failed to {action}: {source}")]
    Io {
        /// Component whose call failed.
        identity: ComponentIdentity,
        /// Operation that was attempted.
        action: &'static str,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Construction was requested a second time.
    #[error("{identity} has already been constructed")]
    AlreadyConstructed {
        /// Component constructed twice.
        identity: ComponentIdentity,
    },
    /// Any other construction failure.
    #[error("{identity} failed to construct: {message}")]
    Failed {
        /// Component that failed.
        identity: ComponentIdentity,
        /// Human-readable failure description.
        message: String,
    },
}

impl ComponentError {
    /// Builds a failure without a more specific category.
    #[must_use]
    pub fn failed(identity: ComponentIdentity, message: impl Into<String>) -> Self {
        Self::Failed {
            identity,
            message: message.into(),
        }
    }

    /// Identity of the component that raised the error.
    #[must_use]
    pub const fn identity(&self) -> ComponentIdentity {
        match self {
            Self::InvalidConfiguration { identity, .. }
            | Self::Io { identity, .. }
            | Self::AlreadyConstructed { identity }
            | Self::Failed { identity, .. } => *identity,
        }
    }
}

type Factory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Catalog entry pairing an identity with a no-argument factory.
#[derive(Clone)]
pub struct ComponentDescriptor {
    identity: ComponentIdentity,
    factory: Factory,
}

impl ComponentDescriptor {
    /// Describes a component kind using its own identity and constructor.
    #[must_use]
    pub fn of<T: ComponentKind>() -> Self {
        Self::new(T::IDENTITY, || Box::new(T::create()))
    }

    /// Describes a component from an explicit identity and factory.
    #[must_use]
    pub fn new<F>(identity: ComponentIdentity, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        Self {
            identity,
            factory: Arc::new(factory),
        }
    }

    /// Identity the component is registered under.
    #[must_use]
    pub const fn identity(&self) -> ComponentIdentity {
        self.identity
    }

    /// Builds a fresh, unconfigured instance.
    #[must_use]
    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ComponentDescriptor")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Ordered list of every component kind the process boots.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentCatalog {
    /// Builds a catalog from descriptors in discovery order.
    #[must_use]
    pub const fn new(descriptors: Vec<ComponentDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Catalog of the components shipped with the daemon.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![ComponentDescriptor::of::<NetworkListener>()])
    }

    /// Appends a descriptor to the end of the discovery order.
    #[must_use]
    pub fn with(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Descriptors in discovery order.
    #[must_use]
    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    /// Identities settings blocks may resolve to, without repeats.
    #[must_use]
    pub fn identities(&self) -> Vec<ComponentIdentity> {
        let mut identities: Vec<ComponentIdentity> = Vec::with_capacity(self.descriptors.len());
        for descriptor in &self.descriptors {
            if !identities.contains(&descriptor.identity) {
                identities.push(descriptor.identity);
            }
        }
        identities
    }

    /// Number of descriptors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when the catalog lists no components.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

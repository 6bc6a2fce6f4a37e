//! Process-wide registry of constructed components.
//!
//! Entries are written once per identity during bootstrap and only read
//! afterwards. The registry owns its lock; callers never synchronise.

use std::any::type_name;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use trebuchet_config::{ComponentIdentity, ConfigurationFragment, FragmentScope, SettingsStore};

use crate::component::{Component, ComponentCatalog, ComponentError, ComponentKind};
use crate::health::HealthReporter;

/// Errors raised by registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No component is registered under the identity.
    #[error("no component registered as {identity}")]
    NotFound {
        /// Identity that was looked up.
        identity: ComponentIdentity,
    },
    /// The registered component is not of the requested type.
    #[error("component {identity} is not a {expected}")]
    TypeMismatch {
        /// Identity that was looked up.
        identity: ComponentIdentity,
        /// Requested Rust type.
        expected: &'static str,
    },
    /// A thread panicked while holding the registry lock.
    #[error("component registry lock poisoned")]
    Poisoned,
}

/// Outcome of offering an instance to the registry.
#[derive(Debug)]
pub enum Admission {
    /// Admitted and constructed successfully.
    Constructed,
    /// Admitted, but construction failed; the instance stays registered.
    Failed(ComponentError),
    /// Refused because the identity was already taken; never constructed.
    Rejected,
}

/// What happened to each catalog entry during discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverySummary {
    /// Components constructed successfully.
    pub constructed: Vec<ComponentIdentity>,
    /// Components registered although construction failed.
    pub failed: Vec<ComponentIdentity>,
    /// Catalog entries refused because their identity was taken.
    pub rejected: Vec<ComponentIdentity>,
    /// Components that had no configuration fragment.
    pub unconfigured: Vec<ComponentIdentity>,
}

impl DiscoverySummary {
    /// Number of components that ended up in the registry.
    #[must_use]
    pub const fn registered(&self) -> usize {
        self.constructed.len() + self.failed.len()
    }
}

/// Write-once-per-identity map of component instances.
#[derive(Default)]
pub struct ComponentRegistry {
    entries: RwLock<HashMap<ComponentIdentity, Arc<dyn Component>>>,
}

impl ComponentRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `instance` under `identity` and constructs it from `fragment`.
    ///
    /// The identity check, construction, and insertion happen under one write
    /// lock, so concurrent offers for the same identity admit exactly one
    /// instance and a refused instance is never constructed.
    pub fn admit(
        &self,
        identity: ComponentIdentity,
        mut instance: Box<dyn Component>,
        fragment: &ConfigurationFragment,
    ) -> Result<Admission, RegistryError> {
        let mut entries = self.entries.write().map_err(|_| RegistryError::Poisoned)?;
        let Entry::Vacant(slot) = entries.entry(identity) else {
            return Ok(Admission::Rejected);
        };
        let outcome = instance.construct(fragment);
        slot.insert(Arc::from(instance));
        Ok(outcome.map_or_else(Admission::Failed, |()| Admission::Constructed))
    }

    /// Instantiates and constructs every catalog entry in order.
    ///
    /// Failures are isolated to the offending component and reported through
    /// `reporter`; discovery always continues with the next entry.
    pub fn discover_and_construct_all(
        &self,
        catalog: &ComponentCatalog,
        settings: &SettingsStore,
        reporter: &dyn HealthReporter,
    ) -> Result<DiscoverySummary, RegistryError> {
        let mut summary = DiscoverySummary::default();
        for descriptor in catalog.descriptors() {
            let identity = descriptor.identity();
            let fragment = settings.fragment_for(identity).unwrap_or_else(|| {
                reporter.component_unconfigured(identity);
                summary.unconfigured.push(identity);
                Arc::new(ConfigurationFragment::empty(FragmentScope::Component(
                    identity,
                )))
            });

            match self.admit(identity, descriptor.instantiate(), &fragment)? {
                Admission::Constructed => {
                    reporter.component_constructed(identity);
                    summary.constructed.push(identity);
                }
                Admission::Failed(error) => {
                    reporter.component_failed(identity, &error);
                    summary.failed.push(identity);
                }
                Admission::Rejected => {
                    reporter.component_rejected(identity);
                    summary.rejected.push(identity);
                }
            }
        }
        Ok(summary)
    }

    /// Returns the component registered under `T`'s identity.
    ///
    /// An entry of a different type under the same identity is a
    /// programming error and is reported as [`RegistryError::TypeMismatch`].
    pub fn lookup<T: ComponentKind>(&self) -> Result<Arc<T>, RegistryError> {
        let component = self.get(T::IDENTITY)?.ok_or(RegistryError::NotFound {
            identity: T::IDENTITY,
        })?;
        component
            .into_any_arc()
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                identity: T::IDENTITY,
                expected: type_name::<T>(),
            })
    }

    /// Returns the type-erased component registered under `identity`.
    pub fn get(
        &self,
        identity: ComponentIdentity,
    ) -> Result<Option<Arc<dyn Component>>, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(entries.get(&identity).cloned())
    }

    /// Returns `true` when `identity` is registered.
    pub fn contains(&self, identity: ComponentIdentity) -> Result<bool, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(entries.contains_key(&identity))
    }

    /// Registered identities, sorted by name.
    pub fn identities(&self) -> Result<Vec<ComponentIdentity>, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        let mut identities: Vec<_> = entries.keys().copied().collect();
        identities.sort_unstable();
        Ok(identities)
    }

    /// Number of registered components.
    pub fn len(&self) -> Result<usize, RegistryError> {
        let entries = self.entries.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(entries.len())
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        self.len().map(|len| len == 0)
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let identities = self.identities().unwrap_or_default();
        formatter
            .debug_struct("ComponentRegistry")
            .field("identities", &identities)
            .finish()
    }
}

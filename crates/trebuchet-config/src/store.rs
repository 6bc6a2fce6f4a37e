//! Settings store: the parsed settings document indexed into fragments.
//!
//! The store is loaded once at start-up and is read-only afterwards. Blocks
//! of the `components` sequence are indexed either by static namespace or by
//! resolved component identity. Blocks that cannot be indexed are skipped and
//! recorded in [`SettingsStore::rejected`]; the store itself never logs, so
//! the caller decides how rejections are reported.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::document::{ComponentBlock, SettingsDocument};
use crate::fragment::{ConfigurationFragment, FragmentScope};
use crate::identity::ComponentIdentity;

/// Fatal errors raised while loading the settings document.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings source could not be read.
    #[error("failed to read settings from '{path}': {source}")]
    Read {
        /// Path of the settings document.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The settings source is not a valid settings document.
    #[error("malformed settings document '{origin}': {message}")]
    Parse {
        /// Path or label of the settings document.
        origin: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Reason a component block was left out of the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// A dynamic block had no `type`.
    #[error("component block has no 'type'")]
    MissingIdentity,
    /// A static block had no `namespace`.
    #[error("static block has no 'namespace'")]
    MissingNamespace,
    /// The `type` does not name a known component.
    #[error("'{name}' does not name a known component")]
    UnresolvedIdentity {
        /// Identity text found in the document.
        name: String,
    },
    /// A previous block already configured the identity.
    #[error("component '{identity}' is configured more than once")]
    DuplicateIdentity {
        /// Repeated identity.
        identity: ComponentIdentity,
    },
    /// A previous static block already used the namespace.
    #[error("namespace '{namespace}' is configured more than once")]
    DuplicateNamespace {
        /// Repeated namespace.
        namespace: String,
    },
}

/// Component block skipped while indexing the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedBlock {
    /// Zero-based position of the block in the `components` sequence.
    pub index: usize,
    /// Why the block was skipped.
    pub reason: RejectionReason,
}

impl fmt::Display for RejectedBlock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "component block #{}: {}", self.index, self.reason)
    }
}

/// Read-only view of the settings document.
#[derive(Debug, Default)]
pub struct SettingsStore {
    origin: String,
    dynamic: HashMap<ComponentIdentity, Arc<ConfigurationFragment>>,
    statics: HashMap<String, Arc<ConfigurationFragment>>,
    rejected: Vec<RejectedBlock>,
}

impl SettingsStore {
    /// Reads and indexes the settings document at `path`.
    ///
    /// `known` lists the identities dynamic blocks may resolve to.
    pub fn load(path: &Utf8Path, known: &[ComponentIdentity]) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path.as_str(), &text, known)
    }

    /// Parses and indexes an in-memory settings document.
    pub fn parse(
        origin: &str,
        text: &str,
        known: &[ComponentIdentity],
    ) -> Result<Self, SettingsError> {
        let document: SettingsDocument =
            serde_saphyr::from_str(text).map_err(|error| SettingsError::Parse {
                origin: origin.to_owned(),
                message: error.to_string(),
            })?;
        Ok(Self::index(origin, document, known))
    }

    fn index(origin: &str, document: SettingsDocument, known: &[ComponentIdentity]) -> Self {
        let mut store = Self {
            origin: origin.to_owned(),
            ..Self::default()
        };
        for (index, block) in document.components.into_iter().enumerate() {
            if let Err(reason) = store.insert_block(block, known) {
                store.rejected.push(RejectedBlock { index, reason });
            }
        }
        store
    }

    fn insert_block(
        &mut self,
        block: ComponentBlock,
        known: &[ComponentIdentity],
    ) -> Result<(), RejectionReason> {
        if block.is_static() {
            let namespace = block
                .namespace()
                .ok_or(RejectionReason::MissingNamespace)?
                .to_owned();
            if self.statics.contains_key(&namespace) {
                return Err(RejectionReason::DuplicateNamespace { namespace });
            }
            let scope = FragmentScope::Namespace(namespace.clone());
            let fragment = ConfigurationFragment::new(scope, block.into_elements());
            self.statics.insert(namespace, Arc::new(fragment));
            return Ok(());
        }

        let name = block.identity().ok_or(RejectionReason::MissingIdentity)?;
        let identity = ComponentIdentity::resolve(name, known).ok_or_else(|| {
            RejectionReason::UnresolvedIdentity {
                name: name.to_owned(),
            }
        })?;
        if self.dynamic.contains_key(&identity) {
            return Err(RejectionReason::DuplicateIdentity { identity });
        }
        let fragment =
            ConfigurationFragment::new(FragmentScope::Component(identity), block.into_elements());
        self.dynamic.insert(identity, Arc::new(fragment));
        Ok(())
    }

    /// Path or label the document was loaded from.
    #[must_use]
    pub const fn origin(&self) -> &str {
        self.origin.as_str()
    }

    /// Fragment configured for a component identity, if any.
    ///
    /// `None` means the component has no configuration; it is not an error.
    #[must_use]
    pub fn fragment_for(&self, identity: ComponentIdentity) -> Option<Arc<ConfigurationFragment>> {
        self.dynamic.get(&identity).cloned()
    }

    /// Fragment registered under a static namespace, if any.
    #[must_use]
    pub fn fragment_for_namespace(&self, namespace: &str) -> Option<Arc<ConfigurationFragment>> {
        self.statics.get(namespace).cloned()
    }

    /// Identities with a configured fragment.
    #[must_use]
    pub fn configured_identities(&self) -> Vec<ComponentIdentity> {
        let mut identities: Vec<_> = self.dynamic.keys().copied().collect();
        identities.sort_unstable();
        identities
    }

    /// Number of static namespaces.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.statics.len()
    }

    /// Blocks skipped while indexing, in document order.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedBlock] {
        &self.rejected
    }
}

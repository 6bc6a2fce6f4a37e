//! Configuration fragments handed to components at construction time.

use std::fmt;

use thiserror::Error;
use tracing::error;

use crate::coerce::{AttributeValue, COERCE_TARGET, CoercionError};
use crate::identity::ComponentIdentity;

/// Owner of a configuration fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FragmentScope {
    /// Fragment resolved for a dynamic component identity.
    Component(ComponentIdentity),
    /// Fragment registered under a static namespace.
    Namespace(String),
}

impl fmt::Display for FragmentScope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Component(identity) => write!(formatter, "component '{identity}'"),
            Self::Namespace(namespace) => write!(formatter, "namespace '{namespace}'"),
        }
    }
}

/// Named attribute carrying raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    raw: String,
}

impl Attribute {
    /// Builds an attribute from its name and raw text.
    #[must_use]
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
        }
    }

    /// Attribute name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Raw attribute text as written in the settings document.
    #[must_use]
    pub const fn raw(&self) -> &str {
        self.raw.as_str()
    }

    /// Converts the attribute, reporting the failure to the caller.
    pub fn try_coerce<T: AttributeValue>(&self) -> Result<T, CoercionError> {
        T::parse_attribute(&self.raw)
    }

    /// Converts the attribute, degrading to the type's fallback on failure.
    ///
    /// Failures are logged as critical and never propagate.
    #[must_use]
    pub fn coerce<T: AttributeValue>(&self) -> T {
        self.try_coerce().unwrap_or_else(|failure| {
            error!(
                target: COERCE_TARGET,
                attribute = %self.name,
                error = %failure,
                "failed to convert attribute"
            );
            T::fallback()
        })
    }
}

/// Named settings element holding a set of attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
}

impl Element {
    /// Builds an element from its name and `(attribute, value)` pairs.
    #[must_use]
    pub fn new<I, K, V>(name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| Attribute::new(key, value))
                .collect(),
        }
    }

    /// Element name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
    }

    /// Looks up an attribute that the caller cannot do without.
    pub fn require(&self, name: &str) -> Result<&Attribute, FragmentError> {
        self.attribute(name)
            .ok_or_else(|| FragmentError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_owned(),
            })
    }

    /// Converts the named attribute, degrading to the fallback when the
    /// attribute is absent or malformed.
    #[must_use]
    pub fn coerce<T: AttributeValue>(&self, name: &str) -> T {
        if let Some(attribute) = self.attribute(name) {
            return attribute.coerce();
        }
        error!(
            target: COERCE_TARGET,
            element = %self.name,
            attribute = name,
            "failed to convert attribute: attribute is missing"
        );
        T::fallback()
    }
}

/// Ordered settings elements scoped to one component or namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationFragment {
    scope: FragmentScope,
    elements: Vec<Element>,
}

impl ConfigurationFragment {
    /// Builds a fragment from its scope and elements.
    #[must_use]
    pub const fn new(scope: FragmentScope, elements: Vec<Element>) -> Self {
        Self { scope, elements }
    }

    /// Fragment without any settings, used when none were configured.
    #[must_use]
    pub const fn empty(scope: FragmentScope) -> Self {
        Self::new(scope, Vec::new())
    }

    /// Scope owning this fragment.
    #[must_use]
    pub const fn scope(&self) -> &FragmentScope {
        &self.scope
    }

    /// Elements in document order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns `true` when the fragment carries no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.elements.len()
    }

    /// Iterates over the elements carrying `name`.
    pub fn elements_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
        self.elements
            .iter()
            .filter(move |element| element.name == name)
    }

    /// Returns the only element named `name`.
    ///
    /// Zero or several matches are both configuration errors.
    pub fn single(&self, name: &str) -> Result<&Element, FragmentError> {
        let mut matches = self.elements.iter().filter(|element| element.name == name);
        let Some(first) = matches.next() else {
            return Err(FragmentError::MissingElement {
                scope: self.scope.to_string(),
                element: name.to_owned(),
            });
        };
        let extra = matches.count();
        if extra > 0 {
            return Err(FragmentError::DuplicateElement {
                scope: self.scope.to_string(),
                element: name.to_owned(),
                count: extra + 1,
            });
        }
        Ok(first)
    }
}

/// Structural problems found while reading a fragment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FragmentError {
    /// A required element was absent.
    #[error("{scope} has no '{element}' element")]
    MissingElement {
        /// Scope that was searched.
        scope: String,
        /// Name of the missing element.
        element: String,
    },
    /// An element expected once appeared several times.
    #[error("{scope} declares '{element}' {count} times; expected exactly one")]
    DuplicateElement {
        /// Scope that was searched.
        scope: String,
        /// Name of the repeated element.
        element: String,
        /// Number of occurrences.
        count: usize,
    },
    /// A required attribute was absent.
    #[error("element '{element}' has no '{attribute}' attribute")]
    MissingAttribute {
        /// Element that was searched.
        element: String,
        /// Name of the missing attribute.
        attribute: String,
    },
}

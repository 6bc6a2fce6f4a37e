use std::fmt;

/// Stable identifier of a component kind.
///
/// Identities are qualified names such as `Net.Listener`. They key both the
/// dynamic configuration map and the component registry, so two component
/// kinds must never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentIdentity(&'static str);

impl ComponentIdentity {
    /// Builds an identity from its qualified name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the qualified name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Resolves a name read from a settings document against the known
    /// identities. Matching is exact and case-sensitive.
    #[must_use]
    pub fn resolve(name: &str, known: &[Self]) -> Option<Self> {
        known.iter().copied().find(|identity| identity.0 == name)
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.0)
    }
}

//! Console presentation settings for the log sink.
//!
//! The log sink is a globally scoped subsystem, so its settings live in the
//! static `Log` namespace rather than under a component identity:
//!
//! ```yaml
//! - type: Static
//!   namespace: Log
//!   settings:
//!     - Console: { Title: "Trebuchet" }
//!     - Header: { Color: DarkCyan, Designer: "[@time] @type" }
//!     - Body: { Color: Gray }
//! ```

use strum::{Display, EnumString};
use thiserror::Error;
use tracing::error;

use crate::coerce::{AttributeValue, COERCE_TARGET, CoercionError};
use crate::fragment::{ConfigurationFragment, Element, FragmentError};

/// Static namespace holding the log sink settings.
pub const LOG_NAMESPACE: &str = "Log";

/// Placeholder replaced by the event timestamp in header templates.
pub const TIME_PLACEHOLDER: &str = "@time";

/// Placeholder replaced by the originating component in header templates.
pub const TYPE_PLACEHOLDER: &str = "@type";

const DEFAULT_TITLE: &str = "Trebuchet";
const DEFAULT_HEADER_TEMPLATE: &str = "[@time] @type";

/// Sixteen-colour console palette accepted by the `Color` attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ConsoleColor {
    /// Black.
    Black,
    /// Dark blue.
    DarkBlue,
    /// Dark green.
    DarkGreen,
    /// Dark cyan.
    DarkCyan,
    /// Dark red.
    DarkRed,
    /// Dark magenta.
    DarkMagenta,
    /// Dark yellow.
    DarkYellow,
    /// Gray.
    #[default]
    Gray,
    /// Dark gray.
    DarkGray,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Cyan.
    Cyan,
    /// Red.
    Red,
    /// Magenta.
    Magenta,
    /// Yellow.
    Yellow,
    /// White.
    White,
}

/// Resolved presentation of console log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Title applied to the hosting terminal window.
    pub title: String,
    /// Colour of the line header.
    pub header_color: ConsoleColor,
    /// Header template; see [`TIME_PLACEHOLDER`] and [`TYPE_PLACEHOLDER`].
    pub header_template: String,
    /// Colour of informational line bodies.
    pub body_color: ConsoleColor,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            header_color: ConsoleColor::DarkCyan,
            header_template: DEFAULT_HEADER_TEMPLATE.to_owned(),
            body_color: ConsoleColor::Gray,
        }
    }
}

/// Log setting that could not be applied as written.
///
/// Console settings are resolved before the log sink exists, so problems are
/// collected and reported once the sink is installed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsoleSettingIssue {
    /// An attribute value did not convert; the fallback was applied.
    #[error("log setting '{element}.{attribute}' degraded to its fallback: {source}")]
    Degraded {
        /// Element carrying the attribute.
        element: String,
        /// Attribute that failed to convert.
        attribute: String,
        /// Conversion failure.
        #[source]
        source: CoercionError,
    },
    /// An element appeared more than once and was ignored.
    #[error("ignoring ambiguous log settings element: {source}")]
    Ambiguous {
        /// Structural problem found in the fragment.
        #[source]
        source: FragmentError,
    },
}

impl ConsoleSettingIssue {
    /// Logs the issue as a critical line.
    pub fn report(&self) {
        match self {
            Self::Degraded {
                element,
                attribute,
                source,
            } => error!(
                target: COERCE_TARGET,
                element = %element,
                attribute = %attribute,
                error = %source,
                "failed to convert attribute"
            ),
            Self::Ambiguous { source } => error!(
                target: COERCE_TARGET,
                error = %source,
                "ignoring ambiguous log settings element"
            ),
        }
    }
}

impl ConsoleSettings {
    /// Resolves console settings from the `Log` namespace fragment.
    ///
    /// Elements missing from the fragment keep their defaults; malformed
    /// attribute values degrade to their fallbacks and are logged as
    /// critical.
    #[must_use]
    pub fn from_fragment(fragment: &ConfigurationFragment) -> Self {
        let (settings, issues) = Self::resolve(fragment);
        for issue in &issues {
            issue.report();
        }
        settings
    }

    /// Resolves console settings without logging.
    ///
    /// Returns the settings alongside every problem found, in document order,
    /// so the caller can report them once a log sink is available.
    #[must_use]
    pub fn resolve(fragment: &ConfigurationFragment) -> (Self, Vec<ConsoleSettingIssue>) {
        let mut settings = Self::default();
        let mut issues = Vec::new();

        if let Some(console) = optional_element(fragment, "Console", &mut issues) {
            apply(console, "Title", &mut settings.title, &mut issues);
        }

        if let Some(header) = optional_element(fragment, "Header", &mut issues) {
            apply(header, "Color", &mut settings.header_color, &mut issues);
            apply(header, "Designer", &mut settings.header_template, &mut issues);
        }

        if let Some(body) = optional_element(fragment, "Body", &mut issues) {
            apply(body, "Color", &mut settings.body_color, &mut issues);
        }

        (settings, issues)
    }

    /// Renders the header for an event raised at `time` by `origin`.
    #[must_use]
    pub fn render_header(&self, time: &str, origin: &str) -> String {
        self.header_template
            .replace(TIME_PLACEHOLDER, time)
            .replace(TYPE_PLACEHOLDER, origin)
    }
}

fn optional_element<'a>(
    fragment: &'a ConfigurationFragment,
    name: &str,
    issues: &mut Vec<ConsoleSettingIssue>,
) -> Option<&'a Element> {
    match fragment.single(name) {
        Ok(element) => Some(element),
        Err(FragmentError::MissingElement { .. }) => None,
        Err(source) => {
            issues.push(ConsoleSettingIssue::Ambiguous { source });
            None
        }
    }
}

/// Overwrites `slot` when `element` carries `name`; absent attributes keep
/// the current value.
fn apply<T: AttributeValue>(
    element: &Element,
    name: &str,
    slot: &mut T,
    issues: &mut Vec<ConsoleSettingIssue>,
) {
    let Some(attribute) = element.attribute(name) else {
        return;
    };
    *slot = attribute.try_coerce().unwrap_or_else(|source| {
        issues.push(ConsoleSettingIssue::Degraded {
            element: element.name().to_owned(),
            attribute: name.to_owned(),
            source,
        });
        T::fallback()
    });
}

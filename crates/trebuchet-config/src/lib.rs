//! Settings model and loader shared by the Trebuchet daemon.
//!
//! The settings document is read once at start-up into a [`SettingsStore`].
//! Components receive [`ConfigurationFragment`]s scoped to their
//! [`ComponentIdentity`]; globally scoped subsystems such as the log sink read
//! fragments registered under a static namespace. Attribute values are raw
//! text until a consumer asks for a typed value through [`AttributeValue`].

mod coerce;
mod config;
mod console;
mod defaults;
mod document;
mod fragment;
mod identity;
mod logging;
mod store;
#[cfg(test)]
mod test_support;

pub use coerce::{AttributeValue, CoercionError};
pub use config::DaemonConfig;
pub use console::{
    ConsoleColor, ConsoleSettingIssue, ConsoleSettings, LOG_NAMESPACE, TIME_PLACEHOLDER,
    TYPE_PLACEHOLDER,
};
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_SETTINGS_PATH, default_log_filter, default_log_format,
    default_settings_path,
};
pub use fragment::{Attribute, ConfigurationFragment, Element, FragmentError, FragmentScope};
pub use identity::ComponentIdentity;
pub use logging::{LogFormat, LogFormatParseError};
pub use store::{RejectedBlock, RejectionReason, SettingsError, SettingsStore};

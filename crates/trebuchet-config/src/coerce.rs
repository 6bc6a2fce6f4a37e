//! Typed conversion of raw attribute text.
//!
//! Settings documents carry every attribute as text. Components ask for the
//! semantic type they need and receive either the converted value or, when the
//! text does not fit, the type's fallback value. Conversion failures are
//! critical log lines, never panics: a bad value degrades one setting rather
//! than the whole process.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use thiserror::Error;

use crate::console::ConsoleColor;

pub(crate) const COERCE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::coerce");

/// Error describing why raw attribute text could not be converted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert '{value}' to {expected}: {reason}")]
pub struct CoercionError {
    value: String,
    expected: &'static str,
    reason: String,
}

impl CoercionError {
    /// Builds an error for `value` that failed to convert to `expected`.
    #[must_use]
    pub fn new(value: impl Into<String>, expected: &'static str, reason: impl fmt::Display) -> Self {
        Self {
            value: value.into(),
            expected,
            reason: reason.to_string(),
        }
    }

    /// Raw text that failed to convert.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.value.as_str()
    }

    /// Name of the requested target type.
    #[must_use]
    pub const fn expected(&self) -> &'static str {
        self.expected
    }
}

/// Types that can be produced from raw attribute text.
pub trait AttributeValue: Sized {
    /// Human-readable name of the type, used in diagnostics.
    const KIND: &'static str;

    /// Converts raw attribute text into the value.
    fn parse_attribute(raw: &str) -> Result<Self, CoercionError>;

    /// Value substituted when conversion fails.
    fn fallback() -> Self;
}

fn parse_trimmed<T>(raw: &str, kind: &'static str) -> Result<T, CoercionError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| CoercionError::new(raw, kind, error))
}

macro_rules! integer_attribute {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl AttributeValue for $ty {
                const KIND: &'static str = $kind;

                fn parse_attribute(raw: &str) -> Result<Self, CoercionError> {
                    parse_trimmed(raw, Self::KIND)
                }

                fn fallback() -> Self {
                    0
                }
            }
        )+
    };
}

integer_attribute! {
    i32 => "integer",
    i64 => "integer",
    u16 => "unsigned 16-bit integer",
    u32 => "unsigned integer",
    usize => "unsigned integer",
}

impl AttributeValue for bool {
    const KIND: &'static str = "boolean";

    fn parse_attribute(raw: &str) -> Result<Self, CoercionError> {
        parse_trimmed(raw.to_ascii_lowercase().as_str(), Self::KIND)
            .map_err(|_| CoercionError::new(raw, Self::KIND, "expected 'true' or 'false'"))
    }

    fn fallback() -> Self {
        false
    }
}

impl AttributeValue for IpAddr {
    const KIND: &'static str = "IP address";

    fn parse_attribute(raw: &str) -> Result<Self, CoercionError> {
        parse_trimmed(raw, Self::KIND)
    }

    fn fallback() -> Self {
        Self::V4(Ipv4Addr::UNSPECIFIED)
    }
}

impl AttributeValue for ConsoleColor {
    const KIND: &'static str = "console colour";

    fn parse_attribute(raw: &str) -> Result<Self, CoercionError> {
        parse_trimmed(raw, Self::KIND)
    }

    fn fallback() -> Self {
        Self::Gray
    }
}

impl AttributeValue for String {
    const KIND: &'static str = "string";

    fn parse_attribute(raw: &str) -> Result<Self, CoercionError> {
        Ok(raw.to_owned())
    }

    fn fallback() -> Self {
        Self::new()
    }
}

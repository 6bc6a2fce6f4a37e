//! Serde model of the settings document.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};

use crate::fragment::Element;

/// Marker placed in a block's `type` to select the static namespace map.
pub(crate) const STATIC_MARKER: &str = "Static";

#[derive(Debug, Deserialize)]
pub(crate) struct SettingsDocument {
    pub(crate) components: Vec<ComponentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ComponentBlock {
    #[serde(rename = "type", default)]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) namespace: Option<String>,
    #[serde(default)]
    pub(crate) settings: Vec<RawElement>,
}

impl ComponentBlock {
    pub(crate) fn is_static(&self) -> bool {
        self.kind.as_deref() == Some(STATIC_MARKER)
    }

    /// Identity text of a dynamic block, ignoring blank values.
    pub(crate) fn identity(&self) -> Option<&str> {
        self.kind
            .as_deref()
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
    }

    pub(crate) fn namespace(&self) -> Option<&str> {
        self.namespace
            .as_deref()
            .map(str::trim)
            .filter(|namespace| !namespace.is_empty())
    }

    pub(crate) fn into_elements(self) -> Vec<Element> {
        self.settings.into_iter().map(|raw| raw.0).collect()
    }
}

/// A settings entry written as a single-key map: `Name: { Attr: value }`.
#[derive(Debug)]
pub(crate) struct RawElement(Element);

impl<'de> Deserialize<'de> for RawElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ElementVisitor)
    }
}

struct ElementVisitor;

impl<'de> Visitor<'de> for ElementVisitor {
    type Value = RawElement;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map naming exactly one settings element")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Some(name) = map.next_key::<String>()? else {
            return Err(de::Error::custom("settings entry is empty"));
        };
        let attributes = map.next_value::<Option<AttributeList>>()?;

        let mut extra = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            map.next_value::<IgnoredAny>()?;
            extra.push(key);
        }
        if !extra.is_empty() {
            return Err(de::Error::custom(format!(
                "settings entries must name exactly one element; '{name}' is followed by {}",
                extra.join(", ")
            )));
        }

        let pairs = attributes.map(|list| list.0).unwrap_or_default();
        Ok(RawElement(Element::new(name, pairs)))
    }
}

/// Attribute map of one element, in document order.
struct AttributeList(Vec<(String, String)>);

impl<'de> Deserialize<'de> for AttributeList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(AttributeListVisitor)
    }
}

struct AttributeListVisitor;

impl<'de> Visitor<'de> for AttributeListVisitor {
    type Value = AttributeList;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of attribute names to scalar values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or_default());
        while let Some((key, value)) = map.next_entry::<String, AttributeText>()? {
            pairs.push((key, value.0));
        }
        Ok(AttributeList(pairs))
    }
}

/// Scalar attribute value kept as written; null and empty values are `""`.
struct AttributeText(String);

impl<'de> Deserialize<'de> for AttributeText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(|text| Self(text.unwrap_or_default()))
    }
}

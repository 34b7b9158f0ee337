//! Section schema model.
//!
//! Schemas are served by the backend as JSON-Schema documents; every editable
//! field carries a `ui` kind plus display metadata under well-known keys.
//! A schema is immutable once fetched and is never invalidated by session
//! changes.

use crate::error::Result;
use crate::value::FieldValue;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The widget kind a field declares.
///
/// `Unknown` absorbs kinds this client does not understand; renderers skip
/// such fields instead of failing the whole section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Checkbox,
    Integer,
    Number,
    Text,
    List,
    Unknown,
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "checkbox" => Self::Checkbox,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "text" => Self::Text,
            "list" => Self::List,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Checkbox => "checkbox",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Text => "text",
            Self::List => "list",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// One field's descriptor inside a section schema.
///
/// Properties without a `ui` kind exist on the wire (server-computed
/// aggregates) but are not editable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Widget kind, under the wire name `ui`.
    #[serde(rename = "ui", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,

    /// Human-readable label; falls back to the field name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Declared default, kept raw: non-scalar defaults exist on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Hint text shown in an empty input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Choices for `list` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Rendering group within the section (e.g. "filter", "cleaning").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Display unit (e.g. "Hz", "sec").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl FieldSchema {
    /// Whether this field maps to a widget this client can render.
    pub fn is_editable(&self) -> bool {
        matches!(self.kind, Some(kind) if kind != FieldKind::Unknown)
    }

    /// The declared default as a scalar field value, if there is one.
    pub fn default_value(&self) -> Option<FieldValue> {
        self.default
            .as_ref()
            .and_then(FieldValue::from_json)
            .filter(|v| !v.is_null())
    }

    /// Label shown above the widget.
    pub fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(name)
    }

    /// Placeholder, suppressed when the field carries a declared default:
    /// an input pre-filled with a default never shows hint text.
    pub fn effective_placeholder(&self) -> Option<&str> {
        if self.default_value().is_some() {
            return None;
        }
        self.placeholder.as_deref()
    }
}

/// A section's full schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub properties: HashMap<String, FieldSchema>,
}

impl SectionSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.properties.get(name)
    }

    /// Editable fields, in stable name order.
    pub fn editable_fields(&self) -> Vec<(&str, &FieldSchema)> {
        let mut fields: Vec<_> = self
            .properties
            .iter()
            .filter(|(_, f)| f.is_editable())
            .map(|(n, f)| (n.as_str(), f))
            .collect();
        fields.sort_by_key(|(name, _)| *name);
        fields
    }

    /// Editable fields belonging to any of the given groups, in stable
    /// (group, name) order.
    pub fn fields_in_groups(&self, groups: &[&str]) -> Vec<(&str, &FieldSchema)> {
        let mut fields: Vec<_> = self
            .properties
            .iter()
            .filter(|(_, f)| f.is_editable())
            .filter(|(_, f)| {
                f.group
                    .as_deref()
                    .is_some_and(|g| groups.contains(&g))
            })
            .map(|(n, f)| (n.as_str(), f))
            .collect();
        fields.sort_by(|a, b| (a.1.group.as_deref(), a.0).cmp(&(b.1.group.as_deref(), b.0)));
        fields
    }
}

/// Supplies section schemas to the form engine.
///
/// Implementations are expected to memoize: one remote fetch per distinct
/// section name per process lifetime.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Fetches the schema for a named section.
    ///
    /// # Errors
    ///
    /// Returns `SchemaUnavailable` when the document cannot be fetched or
    /// decoded. Callers must treat that as "do not render this section yet",
    /// never as an empty schema.
    async fn fetch(&self, section: &str) -> Result<SectionSchema>;
}

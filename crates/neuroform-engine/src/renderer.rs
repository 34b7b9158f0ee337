//! The renderer boundary: schema fields resolved into concrete widget
//! bindings.
//!
//! This module owns the field-kind contract only. Each editable field maps
//! to exactly one widget variant; a binding initializes its displayed value
//! cache-first (falling back to the declared default) and pushes every
//! user-visible change back through `FieldValueCache::set_field`. Drawing
//! and layout live elsewhere.

use neuroform_core::cache::FieldValueCache;
use neuroform_core::error::{NeuroformError, Result};
use neuroform_core::schema::{FieldKind, FieldSchema, SectionSchema};
use neuroform_core::value::{FieldValue, parse_field_value};

/// Concrete input widget for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWidget {
    Checkbox {
        checked: bool,
    },
    IntegerInput {
        value: Option<i64>,
        placeholder: Option<String>,
    },
    NumberInput {
        value: Option<f64>,
        placeholder: Option<String>,
    },
    TextInput {
        value: String,
        placeholder: Option<String>,
    },
    Select {
        options: Vec<String>,
        selected: Option<String>,
    },
}

/// One field wired between its schema descriptor and the edit cache.
#[derive(Debug, Clone)]
pub struct FieldBinding {
    pub name: String,
    pub label: String,
    pub unit: Option<String>,
    pub kind: FieldKind,
    pub widget: FieldWidget,
}

impl FieldBinding {
    /// Resolves a field into its widget, cache value first, schema default
    /// second. Fields without a renderable kind yield `None`.
    pub fn bind(name: &str, field: &FieldSchema, cache: &FieldValueCache) -> Option<Self> {
        let kind = field.kind.filter(|k| *k != FieldKind::Unknown)?;
        let current = cache.get(name).or_else(|| field.default_value());
        let placeholder = field.effective_placeholder().map(str::to_string);

        let widget = match kind {
            FieldKind::Checkbox => FieldWidget::Checkbox {
                checked: current
                    .as_ref()
                    .and_then(FieldValue::as_bool)
                    .unwrap_or(false),
            },
            FieldKind::Integer => FieldWidget::IntegerInput {
                value: current.as_ref().and_then(FieldValue::as_i64),
                placeholder,
            },
            FieldKind::Number => FieldWidget::NumberInput {
                value: current.as_ref().and_then(FieldValue::as_f64),
                placeholder,
            },
            FieldKind::Text => FieldWidget::TextInput {
                value: current
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
                placeholder,
            },
            FieldKind::List => FieldWidget::Select {
                options: field.options.clone().unwrap_or_default(),
                selected: current.and_then(|v| match v {
                    FieldValue::Text(s) => Some(s),
                    _ => None,
                }),
            },
            FieldKind::Unknown => unreachable!("filtered above"),
        };

        Some(Self {
            name: name.to_string(),
            label: field.label(name).to_string(),
            unit: field.unit.clone(),
            kind,
            widget,
        })
    }

    /// Pushes raw widget input into the cache, parsed per the field's kind.
    /// The empty string clears the field.
    ///
    /// # Errors
    ///
    /// `InvalidValue` when the input cannot be parsed for the kind, or a
    /// select receives something outside its options.
    pub fn push(&self, cache: &FieldValueCache, raw: &str) -> Result<()> {
        if let FieldWidget::Select { options, .. } = &self.widget
            && !raw.is_empty()
            && !options.is_empty()
            && !options.iter().any(|option| option == raw)
        {
            return Err(NeuroformError::invalid_value(
                &self.name,
                format!("'{}' is not one of the declared options", raw),
            ));
        }

        let value = parse_field_value(self.kind, &self.name, raw)?;
        cache.set_field(&self.name, value);
        Ok(())
    }
}

/// Bindings for every editable field of the given groups.
///
/// Empty until the cache's hydration attempt has resolved: rendering stale
/// defaults that snap to hydrated values a moment later is worse than
/// rendering nothing.
pub fn section_bindings(
    schema: &SectionSchema,
    groups: &[&str],
    cache: &FieldValueCache,
) -> Vec<FieldBinding> {
    if !cache.is_hydrated() {
        return Vec::new();
    }

    schema
        .fields_in_groups(groups)
        .into_iter()
        .filter_map(|(name, field)| FieldBinding::bind(name, field, cache))
        .collect()
}

//! Entity classifier
//!
//! Pure derivation of default customize attributes from one entity record:
//! a hidden flag per supporting integration and a friendly name.

use std::collections::HashSet;

use ha_core::{EntityRecord, ATTR_FRIENDLY_NAME, ATTR_HIDDEN};
use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value};

/// A downstream system that exposes a subset of domains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    name: String,
    hidden_attribute: String,
    domains: HashSet<String>,
}

impl Integration {
    /// Create an integration whose hidden flag is stored as `<name>_hidden`
    pub fn new<I, S>(name: impl Into<String>, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        Self {
            hidden_attribute: format!("{}_hidden", name),
            domains: domains.into_iter().map(Into::into).collect(),
            name,
        }
    }

    /// Whether entities of `domain` are exposed to this integration
    pub fn supports_domain(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }
}

/// Derives default attributes for entities
///
/// Integrations are kept in priority order. An integration's hidden flag
/// falls back to the integration before it, and the first integration
/// falls back to the global `hidden` attribute and then `default_hidden`.
#[derive(Debug, Clone)]
pub struct Classifier {
    default_hidden: bool,
    integrations: Vec<Integration>,
}

impl Classifier {
    pub fn new(default_hidden: bool, integrations: Vec<Integration>) -> Self {
        Self {
            default_hidden,
            integrations,
        }
    }

    /// Whether the entity's domain is in the named integration's allow-list
    pub fn supports_integration(&self, entity: &EntityRecord, integration: &str) -> bool {
        self.integrations
            .iter()
            .any(|i| i.name == integration && i.supports_domain(entity.domain()))
    }

    /// Resolve the hidden flag for the named integration
    ///
    /// An unknown integration name resolves to the global tier.
    pub fn visibility_flag(&self, entity: &EntityRecord, integration: &str) -> bool {
        match self.integrations.iter().position(|i| i.name == integration) {
            Some(index) => self.visibility_at(entity, index),
            None => self.global_visibility(entity),
        }
    }

    fn visibility_at(&self, entity: &EntityRecord, index: usize) -> bool {
        let attribute = &self.integrations[index].hidden_attribute;
        match entity.attribute(attribute) {
            Some(value) => coerce_flag(value),
            None if index == 0 => self.global_visibility(entity),
            None => self.visibility_at(entity, index - 1),
        }
    }

    fn global_visibility(&self, entity: &EntityRecord) -> bool {
        entity
            .attribute(ATTR_HIDDEN)
            .map(coerce_flag)
            .unwrap_or(self.default_hidden)
    }

    /// Build the default attribute map for one entity
    pub fn derive_defaults(&self, entity: &EntityRecord) -> Mapping {
        let mut defaults = Mapping::new();

        for (index, integration) in self.integrations.iter().enumerate() {
            if integration.supports_domain(entity.domain()) {
                defaults.insert(
                    Value::String(integration.hidden_attribute.clone()),
                    Value::Bool(self.visibility_at(entity, index)),
                );
            }
        }

        if let Some(name) = friendly_name(entity) {
            defaults.insert(
                Value::String(ATTR_FRIENDLY_NAME.to_string()),
                Value::String(name),
            );
        }

        defaults
    }
}

/// Coerce a stored hidden override to a boolean
///
/// `false`, `null`, `0`, `""` and the strings `"no"`, `"false"` and `"0"`
/// mean shown. Anything else present means hidden.
pub fn coerce_flag(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !matches!(s.as_str(), "" | "no" | "false" | "0"),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Derive a display name for an entity
///
/// Uses the `friendly_name` attribute, or the object name when absent.
/// Machine-looking names (all lowercase with `_` or `.`) are split on
/// those separators and title-cased. A non-string `friendly_name` or an
/// empty result gives `None`.
pub fn friendly_name(entity: &EntityRecord) -> Option<String> {
    let candidate = match entity.attribute(ATTR_FRIENDLY_NAME) {
        None => entity.object_name().to_string(),
        Some(JsonValue::String(name)) => name.clone(),
        Some(_) => return None,
    };

    let is_separator = |c: char| c == '_' || c == '.';
    let name = if candidate.contains(is_separator) && candidate.to_lowercase() == candidate {
        title_case(&candidate.replace(is_separator, " "))
    } else {
        candidate
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Title-case each whitespace-delimited word
///
/// Leading non-word characters of a word are kept as-is; the first ASCII
/// word character is uppercased and the rest of the word lowercased.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if c.is_ascii_alphanumeric() || c == '_' {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}
